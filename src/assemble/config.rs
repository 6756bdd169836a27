//! Assembly configuration.

use std::fmt;
use std::path::PathBuf;

/// How box sections are numbered in the box registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoxNumbering {
    /// Box entries carry an empty number and are labelled by title alone.
    #[default]
    Unnumbered,
    /// Boxes get their own chapter-relative counter, like figures and tables.
    ChapterRelative,
}

/// Which chapter ordinals have a Roman numeral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumeralPolicy {
    /// Subtractive Roman numerals, chapters 1 to 3999.
    #[default]
    Extended,
    /// The fixed I..X table; an eleventh chapter is an error.
    Classic,
}

impl NumeralPolicy {
    /// Highest chapter ordinal the policy can number.
    pub fn max_chapter(self) -> usize {
        match self {
            NumeralPolicy::Extended => 3999,
            NumeralPolicy::Classic => 10,
        }
    }
}

impl fmt::Display for NumeralPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumeralPolicy::Extended => "extended",
            NumeralPolicy::Classic => "classic",
        })
    }
}

/// How resolved images are referenced from the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageLinking {
    /// Inline the image bytes as a base64 `data:` URI.
    #[default]
    Embed,
    /// Reference `images/<n>-<file>` and list the file in the document's assets.
    Bundle,
}

/// Configuration for [`Assembler`](super::Assembler).
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    pub box_numbering: BoxNumbering,
    pub numerals: NumeralPolicy,
    /// Directory relative image paths are resolved against. Defaults to the
    /// working directory.
    pub asset_root: Option<PathBuf>,
    pub image_linking: ImageLinking,
    /// Convert markup and rasterize charts on the rayon pool.
    pub parallel: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            box_numbering: BoxNumbering::default(),
            numerals: NumeralPolicy::default(),
            asset_root: None,
            image_linking: ImageLinking::default(),
            parallel: true,
        }
    }
}

impl AssemblyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box_numbering(mut self, numbering: BoxNumbering) -> Self {
        self.box_numbering = numbering;
        self
    }

    pub fn with_numerals(mut self, policy: NumeralPolicy) -> Self {
        self.numerals = policy;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    pub fn with_image_linking(mut self, linking: ImageLinking) -> Self {
        self.image_linking = linking;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
