//! Chart specifications embedded in section records.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A chart request attached to a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSpec {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ChartData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            ..Self::default()
        }
    }

    /// Single-series data from `(label, value)` pairs, in order.
    pub fn with_mapping<L: Into<String>>(
        mut self,
        pairs: impl IntoIterator<Item = (L, f64)>,
    ) -> Self {
        self.data = Some(ChartData::Mapping(
            pairs.into_iter().map(|(l, v)| (l.into(), v)).collect(),
        ));
        self
    }

    /// Append a named series, switching the data to multi-series form.
    pub fn with_series(mut self, series: Series) -> Self {
        match &mut self.data {
            Some(ChartData::Series(all)) => all.push(series),
            _ => self.data = Some(ChartData::Series(vec![series])),
        }
        self
    }

    pub fn with_axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }

    /// Whether the chart has at least one data point to draw.
    pub fn has_data(&self) -> bool {
        match &self.data {
            None => false,
            Some(ChartData::Mapping(map)) => !map.is_empty(),
            Some(ChartData::Series(series)) => series.iter().any(|s| !s.values.is_empty()),
        }
    }

    /// Data normalized into a list of series.
    ///
    /// A mapping becomes one unnamed series.
    pub fn series(&self) -> Vec<Series> {
        match &self.data {
            None => Vec::new(),
            Some(ChartData::Mapping(map)) => vec![Series {
                name: String::new(),
                labels: map.keys().cloned().collect(),
                values: map.values().copied().collect(),
            }],
            Some(ChartData::Series(series)) => series.clone(),
        }
    }
}

/// Chart variant. Unknown type strings fall back to [`ChartKind::Bar`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Scatter,
    HorizontalBar,
    StackedBar,
}

impl ChartKind {
    pub fn parse(tag: &str) -> ChartKind {
        match tag.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "line" => ChartKind::Line,
            "scatter" => ChartKind::Scatter,
            "horizontal_bar" | "barh" => ChartKind::HorizontalBar,
            "stacked_bar" | "stacked" => ChartKind::StackedBar,
            _ => ChartKind::Bar,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::HorizontalBar => "horizontal_bar",
            ChartKind::StackedBar => "stacked_bar",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ChartKind::parse(&tag))
    }
}

/// Chart data in either of the two shapes the planner emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartData {
    /// Multi-series: named series with parallel label/value sequences.
    Series(Vec<Series>),
    /// Single series: label → value, in written order.
    Mapping(IndexMap<String, f64>),
}

/// One named data series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Series {
    pub name: String,
    #[serde(deserialize_with = "deserialize_labels")]
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new<L: Into<String>>(
        name: impl Into<String>,
        labels: impl IntoIterator<Item = L>,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            values: values.into_iter().collect(),
        }
    }
}

/// Labels arrive as strings or as bare numbers (years, quarters).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Number(f64),
}

fn deserialize_labels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Vec::<RawLabel>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|label| match label {
            RawLabel::Text(text) => text,
            RawLabel::Number(n) => format_number(n),
        })
        .collect())
}

/// Format a number without a trailing `.0` for integral values.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_preserves_written_order() {
        let spec: ChartSpec = serde_json::from_str(
            r#"{"title": "Metrics", "type": "bar",
                "data": {"Trust": 68, "Comprehension": 73, "Engagement": 80}}"#,
        )
        .unwrap();
        let series = spec.series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].labels, vec!["Trust", "Comprehension", "Engagement"]);
        assert_eq!(series[0].values, vec![68.0, 73.0, 80.0]);
    }

    #[test]
    fn test_multi_series_with_numeric_labels() {
        let spec: ChartSpec = serde_json::from_str(
            r#"{"title": "Adoption", "type": "line", "data": [
                {"name": "AI", "labels": [2020, 2021], "values": [23, 34.5]},
                {"name": "Cloud", "labels": ["2020", "2021"], "values": [45, 56]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(spec.kind, ChartKind::Line);
        let series = spec.series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].labels, vec!["2020", "2021"]);
        assert_eq!(series[0].values, vec![23.0, 34.5]);
    }

    #[test]
    fn test_unknown_type_is_bar() {
        let spec: ChartSpec = serde_json::from_str(r#"{"type": "pie"}"#).unwrap();
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(ChartKind::parse("Horizontal-Bar"), ChartKind::HorizontalBar);
    }

    #[test]
    fn test_has_data() {
        assert!(!ChartSpec::new(ChartKind::Bar, "Empty").has_data());
        let spec: ChartSpec = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(!spec.has_data());
        let spec: ChartSpec = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(!spec.has_data());
        assert!(
            ChartSpec::new(ChartKind::Bar, "One")
                .with_mapping([("a", 1.0)])
                .has_data()
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2020.0), "2020");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }
}
