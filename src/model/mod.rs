//! Core data model for report assembly.
//!
//! This module contains:
//! - Section records as produced by the content planner
//! - Typed sections, one variant per layout
//! - Chart specifications
//! - The assembled document (TOC, registries, body blocks)

mod chart;
mod document;
mod section;

pub use chart::{ChartData, ChartKind, ChartSpec, Series};
pub(crate) use chart::format_number;

pub use document::{
    AssembledDocument, Asset, Block, Metadata, RegistryEntry, ReportPlan, TocEntry,
};

pub use section::{Body, ImageRef, Layout, PreludeKind, Section, SectionRecord, TableCaption};
