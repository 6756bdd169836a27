//! The report plan handed in by the planner, and the assembled document
//! handed on to the export backends.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::section::{Layout, SectionRecord};

/// Document-level metadata shown on the cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub summary: String,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// Everything the content planner returns for one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPlan {
    pub meta: Metadata,
    pub sections: Vec<SectionRecord>,
}

impl ReportPlan {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// A table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub anchor: String,
    pub layout: Layout,
    /// Roman numeral, for chapter entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeral: Option<String>,
}

impl TocEntry {
    /// Display text, e.g. `II. Methods` for a chapter.
    pub fn label(&self) -> String {
        match &self.numeral {
            Some(numeral) => format!("{numeral}. {}", self.title),
            None => self.title.clone(),
        }
    }
}

/// One numbered item of the figure, table or box registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Display number (`I.2`, `3`), empty for unnumbered boxes.
    pub number: String,
    /// Caption text without the number prefix.
    pub caption: String,
    /// Full display text, identical to the caption rendered in the body.
    pub label: String,
    /// Anchor of the element in the body.
    pub anchor: String,
    /// Index of the originating section.
    pub section: usize,
}

/// The rendered markup of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub anchor: String,
    pub layout: Layout,
    pub html: String,
}

/// An image file the body links to by relative href.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Path used in the body's `src` attribute.
    pub href: String,
    /// Location of the file on disk.
    pub path: PathBuf,
    pub media_type: String,
}

/// The fully indexed document: body blocks plus every index built over them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssembledDocument {
    pub toc: Vec<TocEntry>,
    pub figures: Vec<RegistryEntry>,
    pub tables: Vec<RegistryEntry>,
    pub boxes: Vec<RegistryEntry>,
    pub body: Vec<Block>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<Asset>,
}

impl AssembledDocument {
    /// The body blocks concatenated in order.
    pub fn body_html(&self) -> String {
        self.body.iter().map(|block| block.html.as_str()).collect()
    }

    /// All registry entries: figures, then tables, then boxes.
    pub fn registry_entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.figures
            .iter()
            .chain(self.tables.iter())
            .chain(self.boxes.iter())
    }
}
