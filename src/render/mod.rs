//! Per-layout section templates.
//!
//! Each [`Section`] variant has one template, selected by an exhaustive
//! match in [`render_section`]. Templates receive markup that is already
//! converted and numbered; they only place it. User text is escaped, and
//! the output is well-formed XHTML so the same blocks serve the HTML and
//! EPUB backends.

pub mod html;

use crate::model::{PreludeKind, Section};
use crate::util::escape_xml;

use html::{div, heading, open_section, ornament};

/// A numbered figure ready for placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    pub anchor: String,
    pub label: String,
    pub content: FigureContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigureContent {
    /// Inline SVG markup.
    Chart(String),
    Image { src: String, alt: String },
}

/// Everything a template needs to render one section.
#[derive(Debug, Clone, Copy)]
pub struct SectionView<'a> {
    pub anchor: &'a str,
    pub section: &'a Section,
    /// Converted main text with tables already captioned.
    pub main: &'a str,
    pub side: &'a str,
    pub chart: Option<&'a Figure>,
    pub image: Option<&'a Figure>,
    /// Roman numeral, for chapter sections.
    pub numeral: Option<&'a str>,
    /// Box header text, for box sections.
    pub box_label: Option<&'a str>,
}

/// Render one section to its body block.
pub fn render_section(view: &SectionView<'_>) -> String {
    let mut out = String::with_capacity(view.main.len() + view.side.len() + 256);
    match view.section {
        Section::Chapter { title } => chapter(&mut out, view, title),
        Section::Prelude { kind, title, .. } => prelude(&mut out, view, *kind, title),
        Section::References { title, .. } => references(&mut out, view, title),
        Section::Annex { title, .. } => annex(&mut out, view, title),
        Section::Split { title, .. } => split(&mut out, view, title),
        Section::Sidebar { .. } => sidebar(&mut out, view),
        Section::Hero { .. } => hero(&mut out, view),
        Section::Box { title, .. } => boxed(&mut out, view, title),
        Section::Standard { pull_quote, .. } => standard(&mut out, view, pull_quote.as_deref()),
    }
    out
}

fn chart(out: &mut String, view: &SectionView<'_>) {
    if let Some(figure) = view.chart {
        html::figure(out, figure);
    }
}

fn image(out: &mut String, view: &SectionView<'_>) {
    if let Some(figure) = view.image {
        html::figure(out, figure);
    }
}

fn chapter(out: &mut String, view: &SectionView<'_>, title: &str) {
    open_section(out, view.anchor, "layout-chapter");
    out.push_str("<div class=\"chapter-cover\">\n");
    if let Some(numeral) = view.numeral {
        out.push_str(&format!(
            "<p class=\"chapter-number\">Chapter {}</p>\n",
            escape_xml(numeral)
        ));
    }
    heading(out, 1, Some("chapter-title"), title);
    out.push_str(ornament());
    out.push_str("</div>\n</section>\n");
}

fn prelude(out: &mut String, view: &SectionView<'_>, kind: PreludeKind, title: &str) {
    let class = match kind {
        PreludeKind::FrontMatter => "layout-front-matter",
        PreludeKind::ExecutiveSummary => "layout-executive-summary",
        PreludeKind::Abbreviations => "layout-abbreviations",
        PreludeKind::Acknowledgements => "layout-acknowledgements",
    };
    open_section(out, view.anchor, class);
    heading(out, 1, None, title);
    out.push_str(ornament());
    div(out, "prelude-body", view.main);
    out.push_str("</section>\n");
}

fn references(out: &mut String, view: &SectionView<'_>, title: &str) {
    open_section(out, view.anchor, "layout-references");
    heading(out, 1, None, title);
    div(out, "citation-list", view.main);
    out.push_str("</section>\n");
}

fn annex(out: &mut String, view: &SectionView<'_>, title: &str) {
    open_section(out, view.anchor, "layout-annex");
    out.push_str(&format!(
        "<h1><span class=\"annex-label\">Annex:</span> {}</h1>\n",
        escape_xml(title)
    ));
    div(out, "annex-body", view.main);
    chart(out, view);
    out.push_str("</section>\n");
}

fn split(out: &mut String, view: &SectionView<'_>, title: &str) {
    open_section(out, view.anchor, "layout-split");
    out.push_str("<div class=\"split-left\">\n");
    heading(out, 1, None, title);
    out.push_str(ornament());
    out.push_str(view.main);
    out.push_str("</div>\n<div class=\"split-right\">\n");
    chart(out, view);
    if !view.side.is_empty() {
        div(out, "side-text", view.side);
    }
    out.push_str("</div>\n</section>\n");
}

fn sidebar(out: &mut String, view: &SectionView<'_>) {
    open_section(out, view.anchor, "layout-sidebar");
    out.push_str("<aside class=\"sidebar-col\">\n");
    heading(out, 4, None, "Key insights");
    out.push_str(ornament());
    out.push_str(view.side);
    out.push_str("</aside>\n<div class=\"main-col\">\n");
    out.push_str(view.main);
    chart(out, view);
    out.push_str("</div>\n</section>\n");
}

fn hero(out: &mut String, view: &SectionView<'_>) {
    open_section(out, view.anchor, "layout-hero");
    out.push_str("<div class=\"hero-container\">\n");
    out.push_str(view.main);
    chart(out, view);
    out.push_str("</div>\n</section>\n");
}

fn boxed(out: &mut String, view: &SectionView<'_>, title: &str) {
    open_section(out, view.anchor, "layout-box");
    out.push_str(&format!(
        "<div class=\"box-header\">{}</div>\n",
        escape_xml(view.box_label.unwrap_or(title))
    ));
    out.push_str("<div class=\"box-content\">\n");
    image(out, view);
    out.push_str(view.main);
    chart(out, view);
    out.push_str("</div>\n</section>\n");
}

fn standard(out: &mut String, view: &SectionView<'_>, pull_quote: Option<&str>) {
    open_section(out, view.anchor, "layout-standard");
    if let Some(quote) = pull_quote {
        out.push_str(&format!(
            "<blockquote class=\"pull-quote\"><p>{}</p></blockquote>\n",
            escape_xml(quote.trim())
        ));
    }
    image(out, view);
    chart(out, view);
    out.push_str(view.main);
    out.push_str("</section>\n");
}
