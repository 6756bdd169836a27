//! Chart rendering.
//!
//! Charts are rasterized to inline SVG during the preparation phase of
//! assembly, before any numbering happens. A chart with no data renders to
//! nothing and is skipped without consuming a figure number.

mod scale;
mod svg;

use thiserror::Error;

use crate::model::ChartSpec;

pub use scale::Scale;
pub use svg::SvgChartRasterizer;

/// Fatal chart problems. Missing data is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("series {series} has {labels} labels but {values} values")]
    LengthMismatch {
        series: String,
        labels: usize,
        values: usize,
    },

    #[error("series {series} contains a non-finite value")]
    NonFinite { series: String },

    #[error("chart {title:?} spans a value range too wide to plot")]
    OutOfRange { title: String },

    #[error("failed to write chart markup")]
    Format(#[from] std::fmt::Error),
}

/// Turns a chart specification into embeddable markup.
pub trait ChartRasterizer: Send + Sync {
    /// Render `spec`, or return `Ok(None)` when it has no data to plot.
    fn render(&self, spec: &ChartSpec) -> Result<Option<String>, ChartError>;
}

impl<T: ChartRasterizer + ?Sized> ChartRasterizer for &T {
    fn render(&self, spec: &ChartSpec) -> Result<Option<String>, ChartError> {
        (**self).render(spec)
    }
}
