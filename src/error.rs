//! Error types for report assembly and export.

use std::path::PathBuf;

use thiserror::Error;

use crate::assemble::NumeralPolicy;
use crate::chart::ChartError;

/// Errors that abort a report generation request.
///
/// Malformed optional content (empty text, unknown layouts, charts without
/// data, images that do not resolve) is never reported here; it is recovered
/// locally during assembly. Every section-scoped variant names the 0-based
/// index of the section that triggered it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid report plan: {0}")]
    Plan(#[from] serde_json::Error),

    #[error("section {section}: chart could not be rendered: {source}")]
    Chart {
        section: usize,
        #[source]
        source: ChartError,
    },

    #[error("section {section}: image {} could not be read: {source}", path.display())]
    Asset {
        section: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("section {section}: chapter {chapter} has no Roman numeral under the {policy} policy")]
    ChapterNumeral {
        section: usize,
        chapter: usize,
        policy: NumeralPolicy,
    },

    #[error("export failed: {0}")]
    Export(#[source] std::io::Error),
}

impl Error {
    /// The section index that triggered this error, if it is section-scoped.
    pub fn section(&self) -> Option<usize> {
        match self {
            Error::Chart { section, .. }
            | Error::Asset { section, .. }
            | Error::ChapterNumeral { section, .. } => Some(*section),
            Error::Io(_) | Error::Plan(_) | Error::Export(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
