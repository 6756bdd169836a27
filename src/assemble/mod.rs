//! Report assembly: numbering, cross-referencing and rendering.
//!
//! Assembly runs in two phases:
//!
//! 1. **Prepare.** Every section is classified by layout, its text is
//!    converted to markup and its chart rasterized. This work is independent
//!    per section and runs on the rayon pool when
//!    [`AssemblyConfig::parallel`] is set.
//! 2. **Number.** A single sequential fold walks the prepared sections in
//!    input order, tracking the chapter numeral and the per-chapter figure,
//!    table and box counters, appending to the registries and rendering each
//!    section's body block.
//!
//! Counters only advance for items that are actually placed in the body:
//! charts without data and images that do not resolve are skipped before
//! numbering, so every registry anchor appears exactly once in the body.
//!
//! # Example
//!
//! ```
//! use dossier::assemble::Assembler;
//! use dossier::model::{ChartKind, ChartSpec, SectionRecord};
//!
//! let sections = vec![
//!     SectionRecord::new("chapter").with_title("Findings"),
//!     SectionRecord::new("hero").with_chart(
//!         ChartSpec::new(ChartKind::Bar, "Scores").with_mapping([("A", 1.0), ("B", 2.0)]),
//!     ),
//! ];
//!
//! let doc = Assembler::new().assemble(&sections)?;
//! assert_eq!(doc.toc[0].label(), "I. Findings");
//! assert_eq!(doc.figures[0].label, "Figure I.1: Scores");
//! # Ok::<(), dossier::Error>(())
//! ```

mod config;
mod numbering;
mod prepare;
mod registry;
mod state;

use crate::chart::{ChartRasterizer, SvgChartRasterizer};
use crate::error::Result;
use crate::markdown::{CommonMarkConverter, MarkupConverter};
use crate::model::{AssembledDocument, Section, SectionRecord};

pub use config::{AssemblyConfig, BoxNumbering, ImageLinking, NumeralPolicy};
pub use numbering::roman;

use state::AssemblyState;

/// Assembles section records into an indexed document.
///
/// The converter and rasterizer are pluggable; the defaults are
/// [`CommonMarkConverter`] and [`SvgChartRasterizer`]. An assembler holds no
/// per-run state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Assembler<M = CommonMarkConverter, C = SvgChartRasterizer> {
    converter: M,
    rasterizer: C,
    config: AssemblyConfig,
}

impl Assembler {
    /// Create an assembler with the default converter, rasterizer and
    /// configuration.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M, C> Assembler<M, C> {
    /// Configure the assembler with custom settings.
    pub fn with_config(mut self, config: AssemblyConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the markup converter.
    pub fn with_converter<M2>(self, converter: M2) -> Assembler<M2, C> {
        Assembler {
            converter,
            rasterizer: self.rasterizer,
            config: self.config,
        }
    }

    /// Replace the chart rasterizer.
    pub fn with_rasterizer<C2>(self, rasterizer: C2) -> Assembler<M, C2> {
        Assembler {
            converter: self.converter,
            rasterizer,
            config: self.config,
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }
}

impl<M, C> Assembler<M, C>
where
    M: MarkupConverter,
    C: ChartRasterizer,
{
    /// Assemble `sections`, in order, into a fully indexed document.
    ///
    /// Fails only on unrecoverable problems: a chart whose data is
    /// inconsistent, an image that resolves but cannot be read, or a chapter
    /// beyond the configured numeral range. The error names the section.
    pub fn assemble(&self, sections: &[SectionRecord]) -> Result<AssembledDocument> {
        tracing::debug!(sections = sections.len(), parallel = self.config.parallel, "assembling");

        let classified: Vec<Section> = sections.iter().cloned().map(Section::classify).collect();
        let prepared =
            prepare::prepare_all(classified, &self.converter, &self.rasterizer, &self.config)?;

        let mut state = AssemblyState::new(&self.config);
        for section in prepared {
            state.place(section)?;
        }
        Ok(state.finish())
    }
}
