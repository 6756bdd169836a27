//! Chart rendering tests.
//!
//! Charts as the planner writes them (JSON), rendered through the public
//! rasterizer and checked as XML.

use dossier::chart::{ChartError, ChartRasterizer, SvgChartRasterizer};
use dossier::model::{ChartKind, ChartSpec};
use quick_xml::Reader;
use quick_xml::events::Event;

fn parse(json: &str) -> ChartSpec {
    serde_json::from_str(json).expect("chart parses")
}

fn render(spec: &ChartSpec) -> String {
    SvgChartRasterizer::new()
        .render(spec)
        .expect("chart renders")
        .expect("chart has data")
}

/// Count elements named `name`, failing on malformed XML.
fn count_elements(svg: &str, name: &[u8]) -> usize {
    let mut reader = Reader::from_str(svg);
    let mut count = 0;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == name => count += 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed SVG at {}: {e}", reader.buffer_position()),
        }
    }
    count
}

// ============================================================================
// Planner Input
// ============================================================================

#[test]
fn test_mapping_chart_from_json() {
    let spec = parse(
        r#"{
            "type": "bar",
            "title": "Global Market Share by Region",
            "data": {"North America": 35, "Europe": 28, "Asia Pacific": 25, "Africa & Middle East": 4},
            "x_label": "Region",
            "y_label": "Share (%)"
        }"#,
    );
    assert_eq!(spec.kind, ChartKind::Bar);

    let svg = render(&spec);
    assert_eq!(count_elements(&svg, b"rect"), 4);
    assert!(svg.contains("Africa &amp; Middle East"));
    assert!(svg.contains(">Share (%)</text>"));
    assert!(!svg.contains("class=\"legend\""));
}

#[test]
fn test_series_chart_from_json() {
    let spec = parse(
        r#"{
            "type": "line",
            "title": "Adoption",
            "data": [
                {"name": "AI/ML", "labels": [2020, 2021, 2022], "values": [23, 34, 45]},
                {"name": "Cloud", "labels": [2020, 2021, 2022], "values": [45, 56, 67]},
                {"name": "IoT", "labels": [2020, 2021, 2022], "values": [12, 18, 25]}
            ]
        }"#,
    );
    let svg = render(&spec);
    assert_eq!(count_elements(&svg, b"polyline"), 3);
    assert!(svg.contains("class=\"legend\""));
    for name in ["AI/ML", "Cloud", "IoT"] {
        assert!(svg.contains(&format!(">{name}</text>")), "{name}");
    }
    assert!(svg.contains(">2021</text>"));
}

#[test]
fn test_unknown_chart_type_renders_as_bar() {
    let spec = parse(r#"{"type": "pie", "title": "Slices", "data": {"a": 1, "b": 2}}"#);
    assert_eq!(spec.kind, ChartKind::Bar);
    assert!(render(&spec).contains("<rect"));
}

#[test]
fn test_chart_without_data_renders_nothing() {
    let spec = parse(r#"{"type": "scatter", "title": "Pending"}"#);
    assert_eq!(SvgChartRasterizer::new().render(&spec), Ok(None));

    let spec = parse(r#"{"type": "bar", "title": "Pending", "data": {}}"#);
    assert_eq!(SvgChartRasterizer::new().render(&spec), Ok(None));
}

// ============================================================================
// Kinds
// ============================================================================

#[test]
fn test_every_kind_is_well_formed() {
    let kinds = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::HorizontalBar,
        ChartKind::StackedBar,
    ];
    for kind in kinds {
        let spec = ChartSpec::new(kind, "Kinds <all>")
            .with_mapping([("Alpha", 3.0), ("Beta", -1.5), ("Gamma", 7.25)]);
        let svg = render(&spec);
        assert!(svg.starts_with("<svg"), "{kind}");
        assert!(count_elements(&svg, b"svg") == 1, "{kind}");
    }
}

#[test]
fn test_scatter_plots_one_point_per_value() {
    let spec = parse(
        r#"{"type": "scatter", "title": "ROI", "data": {"10": 5, "20": 12, "30": 18, "40": 25}}"#,
    );
    assert_eq!(count_elements(&render(&spec), b"circle"), 4);
}

#[test]
fn test_size_is_configurable() {
    let spec = ChartSpec::new(ChartKind::Bar, "Sized").with_mapping([("a", 1.0)]);
    let svg = SvgChartRasterizer::new()
        .with_size(800.0, 400.0)
        .render(&spec)
        .unwrap()
        .unwrap();
    assert!(svg.contains("viewBox=\"0 0 800 400\""));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_mismatched_series_is_rejected() {
    let spec = parse(
        r#"{"type": "line", "title": "Broken",
            "data": [{"name": "A", "labels": ["x", "y"], "values": [1, 2, 3]}]}"#,
    );
    let err = SvgChartRasterizer::new().render(&spec).unwrap_err();
    assert_eq!(
        err,
        ChartError::LengthMismatch {
            series: "A".into(),
            labels: 2,
            values: 3,
        }
    );
}

#[test]
fn test_values_too_far_apart_are_rejected() {
    for kind in ["bar", "line", "scatter", "horizontal_bar"] {
        let spec = parse(&format!(
            r#"{{"type": "{kind}", "title": "Extremes", "data": {{"a": 1.7976931348623157e308, "b": -1.7976931348623157e308}}}}"#
        ));
        assert_eq!(
            SvgChartRasterizer::new().render(&spec),
            Err(ChartError::OutOfRange {
                title: "Extremes".into()
            }),
            "{kind}"
        );
    }

    let spec = ChartSpec::new(ChartKind::Bar, "Large").with_mapping([("a", 1e300), ("b", 2e300)]);
    assert!(render(&spec).starts_with("<svg"));
}
