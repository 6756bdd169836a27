//! # dossier
//!
//! Assemble planned report sections into a chapter-numbered,
//! cross-referenced document and export it as HTML or EPUB.
//!
//! ## Features
//!
//! - Twelve layout templates, from chapter dividers to split and sidebar pages
//! - Chapter-relative figure, table and box numbering (`Figure II.3`)
//! - Table of contents and lists of figures, tables and boxes
//! - Markdown bodies with tables and footnotes
//! - Inline SVG charts: bar, line, scatter, horizontal and stacked bars
//!
//! ## Quick Start
//!
//! ```no_run
//! use dossier::{Format, ReportPlan, generate};
//!
//! let plan = ReportPlan::from_json(&std::fs::read_to_string("plan.json")?)?;
//! let epub = generate(&plan, Format::Epub)?;
//! std::fs::write("report.epub", epub)?;
//! # Ok::<(), dossier::Error>(())
//! ```
//!
//! ## Assembling Documents
//!
//! The [`Assembler`] turns [`SectionRecord`]s into an [`AssembledDocument`]:
//! the rendered body plus the table of contents and the three registries.
//!
//! ```
//! use dossier::{Assembler, SectionRecord};
//!
//! let sections = vec![
//!     SectionRecord::new("executive_summary").with_main_text("Short version."),
//!     SectionRecord::new("chapter").with_title("Context"),
//!     SectionRecord::new("standard").with_main_text("| Year | Share |\n|---|---|\n| 2024 | 12% |"),
//! ];
//!
//! let doc = Assembler::new().assemble(&sections)?;
//! assert_eq!(doc.toc.len(), 2);
//! assert_eq!(doc.tables[0].label, "Table I.1");
//! # Ok::<(), dossier::Error>(())
//! ```

pub mod assemble;
pub mod chart;
pub mod error;
pub mod export;
pub mod markdown;
pub mod model;
pub mod render;
pub(crate) mod util;

use std::io::Cursor;

pub use assemble::{AssemblyConfig, Assembler, ImageLinking};
pub use error::{Error, Result};
pub use export::{Exporter, Format, Report};
pub use model::{AssembledDocument, Metadata, ReportPlan, SectionRecord};

/// Assemble `plan` and export it in `format` with default settings.
///
/// EPUB output bundles images into the package; HTML output embeds them.
/// Relative image paths resolve against the working directory.
pub fn generate(plan: &ReportPlan, format: Format) -> Result<Vec<u8>> {
    let linking = match format {
        Format::Html => ImageLinking::Embed,
        Format::Epub => ImageLinking::Bundle,
    };
    let config = AssemblyConfig::default().with_image_linking(linking);
    let document = Assembler::new().with_config(config).assemble(&plan.sections)?;
    let report = Report::new(plan.meta.clone(), document);
    export_report(&report, format)
}

/// Export an assembled report to an in-memory buffer.
pub fn export_report(report: &Report, format: Format) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    let result = match format {
        Format::Html => export::HtmlExporter::new().export(report, &mut out),
        Format::Epub => export::EpubExporter::new().export(report, &mut out),
    };
    result.map_err(Error::Export)?;
    Ok(out.into_inner())
}
