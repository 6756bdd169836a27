//! Markdown conversion for section bodies.
//!
//! - [`normalize`]: line-ending and indentation cleanup ahead of parsing
//! - [`convert`]: the [`MarkupConverter`] seam and its CommonMark implementation
//!
//! ## Design Notes
//!
//! The assembly engine needs to number and caption every table in a body.
//! Rather than pattern-matching `<table>` in finished markup, the converter
//! reports where each table landed: [`Converted::tables`] holds the byte span
//! of every table in the generated HTML, in document order.

mod convert;
mod normalize;

pub use convert::{CommonMarkConverter, Converted, MarkupConverter};
pub use normalize::normalize_source;
