//! XHTML synthesis shared by the HTML and EPUB exporters.
//!
//! Produces the document shell, the cover, the in-document table of
//! contents and the figure/table/box lists. Body blocks come from the
//! assembler already rendered.

use std::fmt::Write;

use crate::model::{Layout, RegistryEntry, TocEntry};
use crate::util::escape_xml;

use super::Report;

/// How the stylesheet is attached to a document.
#[derive(Debug, Clone, Copy)]
pub(super) enum StyleRef<'a> {
    Inline(&'a str),
    Link(&'a str),
}

/// Wrap `body` in a complete XHTML5 document.
pub(super) fn xhtml_document(title: &str, style: Option<StyleRef<'_>>, body: &str) -> String {
    let mut doc = String::with_capacity(body.len() + 1024);
    doc.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="en" xml:lang="en">
<head>
  <meta charset="utf-8"/>
  <title>"#,
    );
    doc.push_str(&escape_xml(title));
    doc.push_str("</title>\n");

    match style {
        Some(StyleRef::Inline(css)) if !css.trim().is_empty() => {
            // CDATA keeps child combinators and quotes well formed.
            let _ = writeln!(
                doc,
                "  <style>/*<![CDATA[*/\n{}\n/*]]>*/</style>",
                css.replace("]]>", "]]]]><![CDATA[>")
            );
        }
        Some(StyleRef::Link(href)) => {
            let _ = writeln!(
                doc,
                "  <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"/>",
                escape_xml(href)
            );
        }
        _ => {}
    }

    doc.push_str("</head>\n<body>\n");
    doc.push_str(body);
    doc.push_str("</body>\n</html>\n");
    doc
}

/// Cover block: title, subtitle, date and summary. Empty fields are omitted.
pub(super) fn cover(report: &Report) -> String {
    let meta = &report.metadata;
    let mut out = String::from("<section id=\"cover\" class=\"cover\">\n");
    let _ = writeln!(
        out,
        "<h1 class=\"report-title\">{}</h1>",
        escape_xml(report.title())
    );
    for (class, text) in [("report-subtitle", &meta.subtitle), ("report-date", &meta.date)] {
        if !text.trim().is_empty() {
            let _ = writeln!(out, "<p class=\"{class}\">{}</p>", escape_xml(text.trim()));
        }
    }
    if !meta.summary.trim().is_empty() {
        let _ = writeln!(
            out,
            "<div class=\"report-summary\"><p>{}</p></div>",
            escape_xml(meta.summary.trim())
        );
    }
    out.push_str("</section>\n");
    out
}

/// In-document table of contents, or `None` when there are no entries.
pub(super) fn contents(toc: &[TocEntry], href_prefix: &str) -> Option<String> {
    if toc.is_empty() {
        return None;
    }
    let mut out = String::from("<nav id=\"contents\" class=\"toc\">\n<h2>Contents</h2>\n<ol>\n");
    for entry in toc {
        let class = if entry.layout == Layout::Chapter {
            "toc-chapter"
        } else {
            "toc-entry"
        };
        let _ = writeln!(
            out,
            "<li class=\"{class}\"><a href=\"{}#{}\">{}</a></li>",
            escape_xml(href_prefix),
            escape_xml(&entry.anchor),
            escape_xml(&entry.label())
        );
    }
    out.push_str("</ol>\n</nav>\n");
    Some(out)
}

/// One registry list (`List of Figures`, ...), or `None` when empty.
pub(super) fn registry_list(
    id: &str,
    heading: &str,
    entries: &[RegistryEntry],
    href_prefix: &str,
) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let mut out =
        format!("<section id=\"{id}\" class=\"registry-list\">\n<h2>{heading}</h2>\n<ol>\n");
    for entry in entries {
        let _ = writeln!(
            out,
            "<li><a href=\"{}#{}\">{}</a></li>",
            escape_xml(href_prefix),
            escape_xml(&entry.anchor),
            escape_xml(&entry.label)
        );
    }
    out.push_str("</ol>\n</section>\n");
    Some(out)
}

/// The three registry lists, in figure, table, box order.
pub(super) fn registry_lists(report: &Report, href_prefix: &str) -> String {
    let doc = &report.document;
    [
        registry_list("list-of-figures", "List of Figures", &doc.figures, href_prefix),
        registry_list("list-of-tables", "List of Tables", &doc.tables, href_prefix),
        registry_list("list-of-boxes", "List of Boxes", &doc.boxes, href_prefix),
    ]
    .into_iter()
    .flatten()
    .collect()
}
