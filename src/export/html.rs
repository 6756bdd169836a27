//! Single-file HTML exporter.

use std::io::{self, Seek, Write};

use super::html_synth::{self, StyleRef};
use super::{Exporter, Report};

/// Configuration for HTML export.
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Emit the table of contents after the cover.
    pub contents: bool,
    /// Emit the lists of figures, tables and boxes.
    pub registry_lists: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            contents: true,
            registry_lists: true,
        }
    }
}

/// HTML format exporter.
///
/// Writes one self-contained XHTML document: cover, table of contents,
/// registry lists, then the body blocks, with the stylesheet inlined.
/// Images are only self-contained when the document was assembled with
/// [`ImageLinking::Embed`](crate::assemble::ImageLinking::Embed).
pub struct HtmlExporter {
    config: HtmlConfig,
}

impl HtmlExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self {
            config: HtmlConfig::default(),
        }
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: HtmlConfig) -> Self {
        self.config = config;
        self
    }

    /// Render the full document to a string.
    pub fn render(&self, report: &Report) -> String {
        let mut body = html_synth::cover(report);
        if self.config.contents
            && let Some(toc) = html_synth::contents(&report.document.toc, "")
        {
            body.push_str(&toc);
        }
        if self.config.registry_lists {
            body.push_str(&html_synth::registry_lists(report, ""));
        }
        body.push_str("<main class=\"report-body\">\n");
        body.push_str(&report.document.body_html());
        body.push_str("</main>\n");

        html_synth::xhtml_document(
            report.title(),
            Some(StyleRef::Inline(&report.stylesheet)),
            &body,
        )
    }
}

impl Default for HtmlExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for HtmlExporter {
    fn export<W: Write + Seek>(&self, report: &Report, writer: &mut W) -> io::Result<()> {
        if !report.document.assets.is_empty() {
            tracing::warn!(
                assets = report.document.assets.len(),
                "HTML output references bundled images by relative path"
            );
        }
        let html = self.render(report);
        writer.write_all(html.as_bytes())?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssembledDocument, Block, Layout, Metadata};

    fn report() -> Report {
        let document = AssembledDocument {
            body: vec![Block {
                anchor: "section-0".into(),
                layout: Layout::Standard,
                html: "<section id=\"section-0\"><p>Body</p></section>\n".into(),
            }],
            ..AssembledDocument::default()
        };
        Report::new(Metadata::new("Quarterly"), document).with_stylesheet("p { margin: 0 }")
    }

    #[test]
    fn test_render_orders_cover_before_body() {
        let html = HtmlExporter::new().render(&report());
        let cover = html.find("id=\"cover\"").unwrap();
        let body = html.find("<p>Body</p>").unwrap();
        assert!(cover < body);
        assert!(html.contains("p { margin: 0 }"));
        // Nothing to list.
        assert!(!html.contains("id=\"contents\""));
        assert!(!html.contains("registry-list"));
    }

    #[test]
    fn test_export_writes_bytes() {
        let mut out = io::Cursor::new(Vec::new());
        HtmlExporter::new().export(&report(), &mut out).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.starts_with("<?xml"));
    }
}
