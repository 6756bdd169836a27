//! Section records and their typed layouts.
//!
//! The planner hands over loosely structured [`SectionRecord`]s where every
//! field is optional and the layout is a free-form string. Before assembly
//! each record is classified into a [`Section`], whose variants carry only
//! the fields their layout actually renders.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::chart::ChartSpec;

// ============================================================================
// Wire records
// ============================================================================

/// One unit of document content, as produced by the content planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionRecord {
    /// Layout tag. Unknown or absent tags render as [`Layout::Standard`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_quote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    /// Captions for the tables found in `main_text`, matched by position.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<TableCaption>,
}

impl SectionRecord {
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            layout: Some(layout.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_main_text(mut self, text: impl Into<String>) -> Self {
        self.main_text = Some(text.into());
        self
    }

    pub fn with_side_text(mut self, text: impl Into<String>) -> Self {
        self.side_text = Some(text.into());
        self
    }

    pub fn with_pull_quote(mut self, quote: impl Into<String>) -> Self {
        self.pull_quote = Some(quote.into());
        self
    }

    pub fn with_chart(mut self, chart: ChartSpec) -> Self {
        self.chart = Some(chart);
        self
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_table_caption(mut self, caption: impl Into<String>) -> Self {
        self.tables.push(TableCaption {
            caption: caption.into(),
        });
        self
    }
}

/// Reference to a pre-existing raster asset.
///
/// Planning-time fields such as `generate` or `prompt` are ignored; a
/// reference without a `path` never resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// Caption supplied for one table of a section's main text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableCaption {
    pub caption: String,
}

// ============================================================================
// Layouts
// ============================================================================

/// The closed set of rendering templates a section can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Chapter,
    FrontMatter,
    ExecutiveSummary,
    Abbreviations,
    Acknowledgements,
    Split,
    Sidebar,
    Standard,
    Hero,
    Box,
    References,
    Annex,
}

impl Layout {
    pub const ALL: [Layout; 12] = [
        Layout::Chapter,
        Layout::FrontMatter,
        Layout::ExecutiveSummary,
        Layout::Abbreviations,
        Layout::Acknowledgements,
        Layout::Split,
        Layout::Sidebar,
        Layout::Standard,
        Layout::Hero,
        Layout::Box,
        Layout::References,
        Layout::Annex,
    ];

    /// Parse a layout tag, falling back to [`Layout::Standard`].
    ///
    /// Matching ignores case and surrounding whitespace, and accepts `-`
    /// in place of `_`.
    pub fn parse(tag: Option<&str>) -> Layout {
        let Some(tag) = tag else {
            return Layout::Standard;
        };
        let tag = tag.trim().to_ascii_lowercase().replace('-', "_");
        Layout::ALL
            .into_iter()
            .find(|layout| layout.as_str() == tag)
            .unwrap_or(Layout::Standard)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Chapter => "chapter",
            Layout::FrontMatter => "front_matter",
            Layout::ExecutiveSummary => "executive_summary",
            Layout::Abbreviations => "abbreviations",
            Layout::Acknowledgements => "acknowledgements",
            Layout::Split => "split",
            Layout::Sidebar => "sidebar",
            Layout::Standard => "standard",
            Layout::Hero => "hero",
            Layout::Box => "box",
            Layout::References => "references",
            Layout::Annex => "annex",
        }
    }

    /// Whether sections of this layout earn a table-of-contents entry.
    pub fn is_structural(self) -> bool {
        match self {
            Layout::Chapter
            | Layout::FrontMatter
            | Layout::Split
            | Layout::ExecutiveSummary
            | Layout::Abbreviations
            | Layout::Acknowledgements
            | Layout::Annex
            | Layout::References => true,
            Layout::Standard | Layout::Sidebar | Layout::Hero | Layout::Box => false,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Typed sections
// ============================================================================

/// Marked-up text plus the captions for the tables it contains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub text: String,
    pub table_captions: Vec<String>,
}

impl Body {
    fn from_record(text: Option<String>, tables: Vec<TableCaption>) -> Self {
        Self {
            text: text.unwrap_or_default(),
            table_captions: tables.into_iter().map(|t| t.caption).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Front-matter flavours sharing the title + body template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreludeKind {
    FrontMatter,
    ExecutiveSummary,
    Abbreviations,
    Acknowledgements,
}

impl PreludeKind {
    pub fn layout(self) -> Layout {
        match self {
            PreludeKind::FrontMatter => Layout::FrontMatter,
            PreludeKind::ExecutiveSummary => Layout::ExecutiveSummary,
            PreludeKind::Abbreviations => Layout::Abbreviations,
            PreludeKind::Acknowledgements => Layout::Acknowledgements,
        }
    }
}

/// A section classified by layout. Each variant holds only what its
/// template renders.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Chapter {
        title: String,
    },
    Prelude {
        kind: PreludeKind,
        title: String,
        body: Body,
    },
    References {
        title: String,
        body: Body,
    },
    Annex {
        title: String,
        body: Body,
        chart: Option<ChartSpec>,
    },
    Split {
        title: String,
        body: Body,
        side: String,
        chart: Option<ChartSpec>,
    },
    Sidebar {
        body: Body,
        side: String,
        chart: Option<ChartSpec>,
    },
    Hero {
        body: Body,
        chart: Option<ChartSpec>,
    },
    Box {
        title: String,
        body: Body,
        chart: Option<ChartSpec>,
        image: Option<ImageRef>,
    },
    Standard {
        pull_quote: Option<String>,
        body: Body,
        chart: Option<ChartSpec>,
        image: Option<ImageRef>,
    },
}

impl Section {
    /// Classify a planner record.
    ///
    /// Fields the selected layout does not render are dropped here, so that
    /// a chart or image is only numbered when it will appear in the body.
    pub fn classify(record: SectionRecord) -> Section {
        let layout = Layout::parse(record.layout.as_deref());
        report_dropped_fields(layout, &record);

        let SectionRecord {
            title,
            main_text,
            side_text,
            pull_quote,
            chart,
            image,
            tables,
            ..
        } = record;

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| default_title(layout).to_string());
        let body = Body::from_record(main_text, tables);
        let side = side_text.unwrap_or_default();
        let pull_quote = pull_quote.filter(|q| !q.trim().is_empty());

        match layout {
            Layout::Chapter => Section::Chapter { title },
            Layout::FrontMatter => prelude(PreludeKind::FrontMatter, title, body),
            Layout::ExecutiveSummary => prelude(PreludeKind::ExecutiveSummary, title, body),
            Layout::Abbreviations => prelude(PreludeKind::Abbreviations, title, body),
            Layout::Acknowledgements => prelude(PreludeKind::Acknowledgements, title, body),
            Layout::References => Section::References { title, body },
            Layout::Annex => Section::Annex { title, body, chart },
            Layout::Split => Section::Split {
                title,
                body,
                side,
                chart,
            },
            Layout::Sidebar => Section::Sidebar { body, side, chart },
            Layout::Hero => Section::Hero { body, chart },
            Layout::Box => Section::Box {
                title,
                body,
                chart,
                image,
            },
            Layout::Standard => Section::Standard {
                pull_quote,
                body,
                chart,
                image,
            },
        }
    }

    pub fn layout(&self) -> Layout {
        match self {
            Section::Chapter { .. } => Layout::Chapter,
            Section::Prelude { kind, .. } => kind.layout(),
            Section::References { .. } => Layout::References,
            Section::Annex { .. } => Layout::Annex,
            Section::Split { .. } => Layout::Split,
            Section::Sidebar { .. } => Layout::Sidebar,
            Section::Hero { .. } => Layout::Hero,
            Section::Box { .. } => Layout::Box,
            Section::Standard { .. } => Layout::Standard,
        }
    }

    /// Display title, for layouts that render one.
    pub fn title(&self) -> Option<&str> {
        match self {
            Section::Chapter { title }
            | Section::Prelude { title, .. }
            | Section::References { title, .. }
            | Section::Annex { title, .. }
            | Section::Split { title, .. }
            | Section::Box { title, .. } => Some(title),
            Section::Sidebar { .. } | Section::Hero { .. } | Section::Standard { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&Body> {
        match self {
            Section::Chapter { .. } => None,
            Section::Prelude { body, .. }
            | Section::References { body, .. }
            | Section::Annex { body, .. }
            | Section::Split { body, .. }
            | Section::Sidebar { body, .. }
            | Section::Hero { body, .. }
            | Section::Box { body, .. }
            | Section::Standard { body, .. } => Some(body),
        }
    }

    pub fn side(&self) -> Option<&str> {
        match self {
            Section::Split { side, .. } | Section::Sidebar { side, .. } => Some(side),
            _ => None,
        }
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            Section::Annex { chart, .. }
            | Section::Split { chart, .. }
            | Section::Sidebar { chart, .. }
            | Section::Hero { chart, .. }
            | Section::Box { chart, .. }
            | Section::Standard { chart, .. } => chart.as_ref(),
            Section::Chapter { .. } | Section::Prelude { .. } | Section::References { .. } => None,
        }
    }

    pub fn image(&self) -> Option<&ImageRef> {
        match self {
            Section::Box { image, .. } | Section::Standard { image, .. } => image.as_ref(),
            _ => None,
        }
    }
}

fn prelude(kind: PreludeKind, title: String, body: Body) -> Section {
    Section::Prelude { kind, title, body }
}

fn default_title(layout: Layout) -> &'static str {
    match layout {
        Layout::Chapter => "Untitled Chapter",
        Layout::FrontMatter => "Foreword",
        Layout::ExecutiveSummary => "Executive Summary",
        Layout::Abbreviations => "Abbreviations",
        Layout::Acknowledgements => "Acknowledgements",
        Layout::References => "References",
        Layout::Annex => "Supplementary Material",
        Layout::Split => "Overview",
        Layout::Box => "Box",
        Layout::Sidebar | Layout::Hero | Layout::Standard => "",
    }
}

fn report_dropped_fields(layout: Layout, record: &SectionRecord) {
    let renders_chart = !matches!(
        layout,
        Layout::Chapter
            | Layout::FrontMatter
            | Layout::ExecutiveSummary
            | Layout::Abbreviations
            | Layout::Acknowledgements
            | Layout::References
    );
    let renders_image = matches!(layout, Layout::Box | Layout::Standard);
    let renders_side = matches!(layout, Layout::Split | Layout::Sidebar);

    if record.chart.is_some() && !renders_chart {
        tracing::debug!(%layout, "dropping chart not rendered by layout");
    }
    if record.image.is_some() && !renders_image {
        tracing::debug!(%layout, "dropping image not rendered by layout");
    }
    if record.side_text.is_some() && !renders_side {
        tracing::debug!(%layout, "dropping side text not rendered by layout");
    }
    if record.pull_quote.is_some() && layout != Layout::Standard {
        tracing::debug!(%layout, "dropping pull quote not rendered by layout");
    }
    if layout == Layout::Chapter && record.main_text.is_some() {
        tracing::debug!("dropping main text of chapter divider");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_layouts() {
        for layout in Layout::ALL {
            assert_eq!(Layout::parse(Some(layout.as_str())), layout);
        }
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!(Layout::parse(Some(" Front-Matter ")), Layout::FrontMatter);
        assert_eq!(Layout::parse(Some("HERO")), Layout::Hero);
    }

    #[test]
    fn test_parse_falls_back_to_standard() {
        assert_eq!(Layout::parse(Some("nonexistent")), Layout::Standard);
        assert_eq!(Layout::parse(Some("")), Layout::Standard);
        assert_eq!(Layout::parse(None), Layout::Standard);
    }

    #[test]
    fn test_structural_layouts() {
        let structural: Vec<_> = Layout::ALL
            .into_iter()
            .filter(|l| l.is_structural())
            .collect();
        assert_eq!(structural.len(), 8);
        assert!(!Layout::Standard.is_structural());
        assert!(!Layout::Sidebar.is_structural());
        assert!(!Layout::Hero.is_structural());
        assert!(!Layout::Box.is_structural());
    }

    #[test]
    fn test_classify_drops_unrendered_fields() {
        let record = SectionRecord::new("chapter")
            .with_title("Findings")
            .with_main_text("ignored")
            .with_image(ImageRef::new("figure.png"));
        assert_eq!(
            Section::classify(record),
            Section::Chapter {
                title: "Findings".to_string()
            }
        );

        let record = SectionRecord::new("hero").with_image(ImageRef::new("figure.png"));
        let section = Section::classify(record);
        assert_eq!(section.layout(), Layout::Hero);
        assert!(section.image().is_none());
    }

    #[test]
    fn test_classify_default_titles() {
        let section = Section::classify(SectionRecord::new("split"));
        assert_eq!(section.title(), Some("Overview"));

        let section = Section::classify(SectionRecord::new("references").with_title("   "));
        assert_eq!(section.title(), Some("References"));
    }

    #[test]
    fn test_classify_keeps_table_captions_with_body() {
        let record = SectionRecord::new("standard")
            .with_main_text("| a |\n|---|\n| 1 |")
            .with_table_caption("Scores");
        let section = Section::classify(record);
        assert_eq!(section.body().unwrap().table_captions, vec!["Scores"]);
    }

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let record: SectionRecord = serde_json::from_str(r#"{"main_text": "Hello"}"#).unwrap();
        assert_eq!(record.layout, None);
        assert_eq!(Section::classify(record).layout(), Layout::Standard);
    }

    #[test]
    fn test_image_ignores_planner_fields() {
        let image: ImageRef = serde_json::from_str(
            r#"{"caption": "Figure I.1: Map", "generate": true, "prompt": "a map"}"#,
        )
        .unwrap();
        assert_eq!(image.path, None);
        assert_eq!(image.caption.as_deref(), Some("Figure I.1: Map"));
    }
}
