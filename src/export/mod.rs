//! Export module for writing assembled reports to output formats.
//!
//! Provides the `Exporter` trait and format-specific implementations.
//!
//! # Architecture
//!
//! The `Exporter` trait uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` writes to any `Write + Seek` destination
//!
//! # Example
//!
//! ```no_run
//! use dossier::assemble::Assembler;
//! use dossier::export::{EpubExporter, Exporter, Report};
//! use dossier::model::ReportPlan;
//! use std::fs::File;
//!
//! let plan = ReportPlan::from_json(&std::fs::read_to_string("plan.json")?)?;
//! let document = Assembler::new().assemble(&plan.sections)?;
//! let report = Report::new(plan.meta, document);
//!
//! let mut file = File::create("report.epub")?;
//! EpubExporter::new().export(&report, &mut file)?;
//! # Ok::<(), dossier::Error>(())
//! ```

use std::io::{self, Seek, Write};

use crate::model::{AssembledDocument, Metadata};

mod epub;
mod html;
mod html_synth;

pub use epub::{EpubConfig, EpubExporter};
pub use html::{HtmlConfig, HtmlExporter};

/// Output formats supported by the bundled exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Epub,
}

impl Format {
    /// Detect the format from a file extension.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Option<Format> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "html" | "htm" | "xhtml" => Some(Format::Html),
            "epub" => Some(Format::Epub),
            _ => None,
        }
    }
}

/// An assembled document together with its cover metadata and stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub metadata: Metadata,
    pub document: AssembledDocument,
    pub stylesheet: String,
}

impl Report {
    /// Stylesheet covering every layout template.
    pub const DEFAULT_STYLESHEET: &'static str = include_str!("../../assets/style.css");

    pub fn new(metadata: Metadata, document: AssembledDocument) -> Self {
        Self {
            metadata,
            document,
            stylesheet: Self::DEFAULT_STYLESHEET.to_string(),
        }
    }

    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheet = css.into();
        self
    }

    /// Title used for the document head and package metadata.
    pub fn title(&self) -> &str {
        if self.metadata.title.trim().is_empty() {
            "Untitled Report"
        } else {
            &self.metadata.title
        }
    }
}

/// Trait for exporting reports to specific formats.
///
/// Exporters use a builder pattern where configuration is held in the struct,
/// and the `export` method writes to any `Write + Seek` destination.
pub trait Exporter {
    /// Export the report to the provided writer.
    ///
    /// The writer can be:
    /// - `std::fs::File` for disk output
    /// - `std::io::Cursor<Vec<u8>>` for seekable in-memory output
    /// - Any other type implementing `Write + Seek`
    fn export<W: Write + Seek>(&self, report: &Report, writer: &mut W) -> io::Result<()>;
}

/// Convert zip error to io error.
fn io_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::other(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path("out/report.EPUB"), Some(Format::Epub));
        assert_eq!(Format::from_path("report.html"), Some(Format::Html));
        assert_eq!(Format::from_path("report.pdf"), None);
        assert_eq!(Format::from_path("report"), None);
    }

    #[test]
    fn test_default_stylesheet_covers_layouts() {
        for layout in crate::model::Layout::ALL {
            let class = format!(".layout-{}", layout.as_str().replace('_', "-"));
            assert!(
                Report::DEFAULT_STYLESHEET.contains(&class),
                "missing {class}"
            );
        }
    }

    #[test]
    fn test_title_fallback() {
        let report = Report::new(Metadata::default(), AssembledDocument::default());
        assert_eq!(report.title(), "Untitled Report");
    }
}
