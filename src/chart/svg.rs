//! Inline SVG chart rendering.

use std::fmt::Write;

use crate::model::{ChartKind, ChartSpec, Series};
use crate::util::escape_xml;

use super::scale::Scale;
use super::{ChartError, ChartRasterizer};

/// Series colours, cycled in order.
const PALETTE: [&str; 6] = [
    "#632af5", "#2bb3c0", "#56696d", "#f2a541", "#4f22c0", "#9ccfd8",
];

/// Category labels longer than this are drawn rotated.
const ROTATE_LABEL_CHARS: usize = 12;
/// Approximate advance of one label character at the chart font size.
const CHAR_WIDTH: f64 = 6.5;
const FONT_SIZE: f64 = 11.0;
const TARGET_TICKS: usize = 5;
const LEGEND_HEIGHT: f64 = 24.0;

/// Renders [`ChartSpec`]s as standalone inline SVG.
#[derive(Debug, Clone, Copy)]
pub struct SvgChartRasterizer {
    width: f64,
    height: f64,
}

impl SvgChartRasterizer {
    pub fn new() -> Self {
        Self {
            width: 640.0,
            height: 360.0,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width.max(160.0);
        self.height = height.max(120.0);
        self
    }
}

impl Default for SvgChartRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRasterizer for SvgChartRasterizer {
    fn render(&self, spec: &ChartSpec) -> Result<Option<String>, ChartError> {
        if !spec.has_data() {
            return Ok(None);
        }
        let series = spec.series();
        validate(&series)?;

        let chart = Chart::new(spec, &series, self.width, self.height)?;
        let mut svg = String::new();
        chart.write(&mut svg)?;
        Ok(Some(svg))
    }
}

fn validate(series: &[Series]) -> Result<(), ChartError> {
    for (i, s) in series.iter().enumerate() {
        let name = if s.name.is_empty() {
            format!("#{}", i + 1)
        } else {
            s.name.clone()
        };
        if s.labels.len() != s.values.len() {
            return Err(ChartError::LengthMismatch {
                series: name,
                labels: s.labels.len(),
                values: s.values.len(),
            });
        }
        if s.values.iter().any(|v| !v.is_finite()) {
            return Err(ChartError::NonFinite { series: name });
        }
    }
    Ok(())
}

/// Plot rectangle in SVG user units.
#[derive(Debug, Clone, Copy)]
struct Plot {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Plot {
    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// One chart being laid out.
struct Chart<'a> {
    spec: &'a ChartSpec,
    series: &'a [Series],
    categories: Vec<&'a str>,
    width: f64,
    height: f64,
    legend: bool,
    rotate_labels: bool,
    scale: Scale,
    plot: Plot,
}

impl<'a> Chart<'a> {
    fn new(
        spec: &'a ChartSpec,
        series: &'a [Series],
        width: f64,
        height: f64,
    ) -> Result<Self, ChartError> {
        let categories = categories(series);
        let legend = series.len() > 1;
        let horizontal = spec.kind == ChartKind::HorizontalBar;

        let longest = categories
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);

        let mut plot = Plot {
            left: 56.0,
            top: 16.0,
            right: width - 16.0,
            bottom: height - 36.0,
        };
        if legend {
            plot.top += LEGEND_HEIGHT;
        }
        if spec.x_label.is_some() {
            plot.bottom -= 18.0;
        }
        if spec.y_label.is_some() {
            plot.left += 18.0;
        }

        let mut rotate_labels = false;
        if horizontal {
            let label_room = (longest as f64 * CHAR_WIDTH + 12.0).min(width * 0.4);
            plot.left = plot.left.max(label_room + if spec.y_label.is_some() { 18.0 } else { 0.0 });
        } else if !categories.is_empty() {
            let slot = plot.width() / categories.len() as f64;
            rotate_labels =
                longest > ROTATE_LABEL_CHARS || longest as f64 * CHAR_WIDTH > slot * 0.95;
            if rotate_labels {
                let drop = (longest.min(28) as f64 * CHAR_WIDTH * 0.6).max(24.0);
                plot.bottom -= drop;
            }
        }

        let scale = value_range(spec.kind, series, &categories)
            .and_then(|(lo, hi)| Scale::nice(lo, hi, TARGET_TICKS))
            .ok_or_else(|| ChartError::OutOfRange {
                title: spec.title.clone(),
            })?;

        Ok(Chart {
            spec,
            series,
            categories,
            width,
            height,
            legend,
            rotate_labels,
            scale,
            plot,
        })
    }

    fn write(&self, out: &mut String) -> std::fmt::Result {
        write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"chart chart-{}\" \
             viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" role=\"img\" \
             font-family=\"sans-serif\" font-size=\"{FONT_SIZE}\">",
            self.spec.kind.as_str().replace('_', "-"),
            w = fmt(self.width),
            h = fmt(self.height),
        )?;
        if !self.spec.title.is_empty() {
            write!(out, "<title>{}</title>", escape_xml(&self.spec.title))?;
        }

        if self.legend {
            self.write_legend(out)?;
        }

        match self.spec.kind {
            ChartKind::HorizontalBar => {
                self.write_value_axis_horizontal(out)?;
                self.write_horizontal_bars(out)?;
                self.write_category_axis_horizontal(out)?;
            }
            kind => {
                self.write_value_axis(out)?;
                match kind {
                    ChartKind::Bar => self.write_bars(out)?,
                    ChartKind::StackedBar => self.write_stacked_bars(out)?,
                    ChartKind::Line => self.write_lines(out)?,
                    ChartKind::Scatter => self.write_points(out)?,
                    ChartKind::HorizontalBar => {}
                }
                self.write_category_axis(out)?;
            }
        }

        self.write_axis_titles(out)?;
        out.push_str("</svg>");
        Ok(())
    }

    fn color(index: usize) -> &'static str {
        PALETTE[index % PALETTE.len()]
    }

    fn slot(&self) -> f64 {
        self.plot.width() / self.categories.len().max(1) as f64
    }

    fn category_center(&self, index: usize) -> f64 {
        self.plot.left + self.slot() * (index as f64 + 0.5)
    }

    fn y(&self, value: f64) -> f64 {
        self.scale.map(value, self.plot.bottom, self.plot.top)
    }

    fn x(&self, value: f64) -> f64 {
        self.scale.map(value, self.plot.left, self.plot.right)
    }

    fn write_legend(&self, out: &mut String) -> std::fmt::Result {
        out.push_str("<g class=\"legend\">");
        let mut x = self.plot.left;
        let y = 12.0;
        for (i, s) in self.series.iter().enumerate() {
            write!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"10\" height=\"10\" fill=\"{}\"/>\
                 <text x=\"{}\" y=\"{}\">{}</text>",
                fmt(x),
                fmt(y - 9.0),
                Self::color(i),
                fmt(x + 14.0),
                fmt(y),
                escape_xml(&s.name)
            )?;
            x += 14.0 + s.name.chars().count() as f64 * CHAR_WIDTH + 16.0;
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_value_axis(&self, out: &mut String) -> std::fmt::Result {
        out.push_str("<g class=\"axis axis-value\">");
        for tick in self.scale.ticks() {
            let y = self.y(tick);
            write!(
                out,
                "<line x1=\"{l}\" y1=\"{y}\" x2=\"{r}\" y2=\"{y}\" stroke=\"#d9dedf\" stroke-width=\"0.5\"/>\
                 <text x=\"{tx}\" y=\"{ty}\" text-anchor=\"end\">{label}</text>",
                l = fmt(self.plot.left),
                r = fmt(self.plot.right),
                y = fmt(y),
                tx = fmt(self.plot.left - 6.0),
                ty = fmt(y + 4.0),
                label = self.scale.format_tick(tick),
            )?;
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_value_axis_horizontal(&self, out: &mut String) -> std::fmt::Result {
        out.push_str("<g class=\"axis axis-value\">");
        for tick in self.scale.ticks() {
            let x = self.x(tick);
            write!(
                out,
                "<line x1=\"{x}\" y1=\"{t}\" x2=\"{x}\" y2=\"{b}\" stroke=\"#d9dedf\" stroke-width=\"0.5\"/>\
                 <text x=\"{x}\" y=\"{ty}\" text-anchor=\"middle\">{label}</text>",
                x = fmt(x),
                t = fmt(self.plot.top),
                b = fmt(self.plot.bottom),
                ty = fmt(self.plot.bottom + 14.0),
                label = self.scale.format_tick(tick),
            )?;
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_category_axis(&self, out: &mut String) -> std::fmt::Result {
        write!(
            out,
            "<g class=\"axis axis-category\"><line x1=\"{l}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"#56696d\"/>",
            l = fmt(self.plot.left),
            r = fmt(self.plot.right),
            b = fmt(self.plot.bottom),
        )?;
        for (i, label) in self.categories.iter().enumerate() {
            let x = self.category_center(i);
            let y = self.plot.bottom + 14.0;
            if self.rotate_labels {
                write!(
                    out,
                    "<text x=\"{x}\" y=\"{y}\" text-anchor=\"end\" transform=\"rotate(-35 {x} {y})\">{}</text>",
                    escape_xml(label),
                    x = fmt(x),
                    y = fmt(y),
                )?;
            } else {
                write!(
                    out,
                    "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>",
                    fmt(x),
                    fmt(y),
                    escape_xml(label)
                )?;
            }
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_category_axis_horizontal(&self, out: &mut String) -> std::fmt::Result {
        write!(
            out,
            "<g class=\"axis axis-category\"><line x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" stroke=\"#56696d\"/>",
            l = fmt(self.plot.left),
            t = fmt(self.plot.top),
            b = fmt(self.plot.bottom),
        )?;
        let slot = self.plot.height() / self.categories.len().max(1) as f64;
        for (i, label) in self.categories.iter().enumerate() {
            let y = self.plot.top + slot * (i as f64 + 0.5) + 4.0;
            write!(
                out,
                "<text x=\"{}\" y=\"{}\" text-anchor=\"end\">{}</text>",
                fmt(self.plot.left - 6.0),
                fmt(y),
                escape_xml(label)
            )?;
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_bars(&self, out: &mut String) -> std::fmt::Result {
        let group = self.slot() * 0.7;
        let bar = group / self.series.len().max(1) as f64;
        let zero = self.y(0.0_f64.clamp(self.scale.min, self.scale.max));
        let labelled = self.series.len() == 1;

        out.push_str("<g class=\"bars\">");
        for (si, s) in self.series.iter().enumerate() {
            for (ci, category) in self.categories.iter().enumerate() {
                let Some(value) = value_at(s, category) else {
                    continue;
                };
                let x = self.category_center(ci) - group / 2.0 + bar * si as f64;
                let y = self.y(value);
                write!(
                    out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                    fmt(x),
                    fmt(y.min(zero)),
                    fmt(bar * 0.92),
                    fmt((zero - y).abs()),
                    Self::color(si)
                )?;
                if labelled {
                    let ly = if value >= 0.0 { y - 4.0 } else { y + 12.0 };
                    write!(
                        out,
                        "<text class=\"value\" x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>",
                        fmt(x + bar * 0.46),
                        fmt(ly),
                        crate::model::format_number(value)
                    )?;
                }
            }
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_stacked_bars(&self, out: &mut String) -> std::fmt::Result {
        let bar = self.slot() * 0.6;
        out.push_str("<g class=\"bars stacked\">");
        for (ci, category) in self.categories.iter().enumerate() {
            let x = self.category_center(ci) - bar / 2.0;
            let mut positive = 0.0;
            let mut negative = 0.0;
            for (si, s) in self.series.iter().enumerate() {
                let Some(value) = value_at(s, category) else {
                    continue;
                };
                let (from, to) = if value >= 0.0 {
                    let from = positive;
                    positive += value;
                    (from, positive)
                } else {
                    let from = negative;
                    negative += value;
                    (from, negative)
                };
                let (y0, y1) = (self.y(from), self.y(to));
                write!(
                    out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                    fmt(x),
                    fmt(y0.min(y1)),
                    fmt(bar),
                    fmt((y0 - y1).abs()),
                    Self::color(si)
                )?;
            }
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_horizontal_bars(&self, out: &mut String) -> std::fmt::Result {
        let slot = self.plot.height() / self.categories.len().max(1) as f64;
        let group = slot * 0.7;
        let bar = group / self.series.len().max(1) as f64;
        let zero = self.x(0.0_f64.clamp(self.scale.min, self.scale.max));

        out.push_str("<g class=\"bars horizontal\">");
        for (si, s) in self.series.iter().enumerate() {
            for (ci, category) in self.categories.iter().enumerate() {
                let Some(value) = value_at(s, category) else {
                    continue;
                };
                let center = self.plot.top + slot * (ci as f64 + 0.5);
                let y = center - group / 2.0 + bar * si as f64;
                let x = self.x(value);
                write!(
                    out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                    fmt(x.min(zero)),
                    fmt(y),
                    fmt((x - zero).abs()),
                    fmt(bar * 0.92),
                    Self::color(si)
                )?;
            }
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_lines(&self, out: &mut String) -> std::fmt::Result {
        out.push_str("<g class=\"lines\">");
        for (si, s) in self.series.iter().enumerate() {
            let points: Vec<(f64, f64)> = self
                .categories
                .iter()
                .enumerate()
                .filter_map(|(ci, c)| value_at(s, c).map(|v| (self.category_center(ci), self.y(v))))
                .collect();
            let color = Self::color(si);
            let path: Vec<String> = points
                .iter()
                .map(|(x, y)| format!("{},{}", fmt(*x), fmt(*y)))
                .collect();
            write!(
                out,
                "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>",
                path.join(" ")
            )?;
            for (x, y) in points {
                write!(
                    out,
                    "<circle cx=\"{}\" cy=\"{}\" r=\"3\" fill=\"{color}\"/>",
                    fmt(x),
                    fmt(y)
                )?;
            }
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_points(&self, out: &mut String) -> std::fmt::Result {
        out.push_str("<g class=\"points\">");
        for (si, s) in self.series.iter().enumerate() {
            for (ci, category) in self.categories.iter().enumerate() {
                if let Some(value) = value_at(s, category) {
                    write!(
                        out,
                        "<circle cx=\"{}\" cy=\"{}\" r=\"4\" fill=\"{}\" fill-opacity=\"0.8\"/>",
                        fmt(self.category_center(ci)),
                        fmt(self.y(value)),
                        Self::color(si)
                    )?;
                }
            }
        }
        out.push_str("</g>");
        Ok(())
    }

    fn write_axis_titles(&self, out: &mut String) -> std::fmt::Result {
        if let Some(x_label) = self.spec.x_label.as_deref().filter(|l| !l.is_empty()) {
            write!(
                out,
                "<text class=\"axis-title\" x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>",
                fmt(self.plot.left + self.plot.width() / 2.0),
                fmt(self.height - 8.0),
                escape_xml(x_label)
            )?;
        }
        if let Some(y_label) = self.spec.y_label.as_deref().filter(|l| !l.is_empty()) {
            let (x, y) = (14.0, self.plot.top + self.plot.height() / 2.0);
            write!(
                out,
                "<text class=\"axis-title\" x=\"{x}\" y=\"{y}\" text-anchor=\"middle\" transform=\"rotate(-90 {x} {y})\">{}</text>",
                escape_xml(y_label),
                x = fmt(x),
                y = fmt(y),
            )?;
        }
        Ok(())
    }
}

/// Union of all series labels, in first-seen order.
fn categories(series: &[Series]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for s in series {
        for label in &s.labels {
            if !seen.contains(&label.as_str()) {
                seen.push(label);
            }
        }
    }
    seen
}

fn value_at(series: &Series, category: &str) -> Option<f64> {
    series
        .labels
        .iter()
        .position(|l| l == category)
        .and_then(|i| series.values.get(i).copied())
}

/// Data extent for the value axis. Bar-type charts always include zero.
/// Value extent to plot, or `None` when it overflows (stacked sums included).
fn value_range(kind: ChartKind, series: &[Series], categories: &[&str]) -> Option<(f64, f64)> {
    let (mut lo, mut hi) = match kind {
        ChartKind::StackedBar => {
            let mut lo = 0.0_f64;
            let mut hi = 0.0_f64;
            for category in categories {
                let values = series.iter().filter_map(|s| value_at(s, category));
                let (pos, neg) = values.fold((0.0, 0.0), |(p, n), v| {
                    if v >= 0.0 { (p + v, n) } else { (p, n + v) }
                });
                hi = hi.max(pos);
                lo = lo.min(neg);
            }
            (lo, hi)
        }
        _ => series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            }),
    };
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    if matches!(kind, ChartKind::Bar | ChartKind::HorizontalBar | ChartKind::StackedBar) {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    Some((lo, hi))
}

/// Format a coordinate with at most one decimal.
fn fmt(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(spec: &ChartSpec) -> String {
        SvgChartRasterizer::new()
            .render(spec)
            .expect("render failed")
            .expect("chart has data")
    }

    fn single() -> ChartSpec {
        ChartSpec::new(ChartKind::Bar, "Effectiveness").with_mapping([
            ("Comprehension", 73.0),
            ("Retention", 65.0),
            ("Engagement", 80.0),
        ])
    }

    fn multi(kind: ChartKind) -> ChartSpec {
        ChartSpec::new(kind, "Adoption")
            .with_series(Series::new("AI/ML", ["2020", "2021", "2022"], [23.0, 34.0, 48.0]))
            .with_series(Series::new("Cloud", ["2020", "2021", "2022"], [45.0, 56.0, 67.0]))
    }

    #[test]
    fn test_no_data_renders_nothing() {
        let spec = ChartSpec::new(ChartKind::Line, "Empty");
        assert_eq!(SvgChartRasterizer::new().render(&spec).unwrap(), None);
    }

    #[test]
    fn test_single_series_has_no_legend() {
        let svg = render(&single());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("class=\"legend\""));
        assert!(svg.contains("<title>Effectiveness</title>"));
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains(">73</text>"));
    }

    #[test]
    fn test_multi_series_legend_names_every_series() {
        for kind in [
            ChartKind::Bar,
            ChartKind::Line,
            ChartKind::Scatter,
            ChartKind::HorizontalBar,
            ChartKind::StackedBar,
        ] {
            let svg = render(&multi(kind));
            assert!(svg.contains("class=\"legend\""), "{kind} legend");
            assert!(svg.contains(">AI/ML</text>"), "{kind} first series");
            assert!(svg.contains(">Cloud</text>"), "{kind} second series");
        }
    }

    #[test]
    fn test_kind_specific_marks() {
        assert!(render(&multi(ChartKind::Line)).contains("<polyline"));
        assert_eq!(render(&multi(ChartKind::Scatter)).matches("<circle").count(), 6);
        assert!(render(&multi(ChartKind::HorizontalBar)).contains("class=\"bars horizontal\""));
        assert!(render(&multi(ChartKind::StackedBar)).contains("class=\"bars stacked\""));
    }

    #[test]
    fn test_long_labels_rotate() {
        let spec = ChartSpec::new(ChartKind::Bar, "Scores").with_mapping([
            ("Typography Score Overall", 92.0),
            ("Visual Hierarchy", 88.0),
        ]);
        assert!(render(&spec).contains("rotate(-35"));

        let short =
            ChartSpec::new(ChartKind::Bar, "Scores").with_mapping([("Q1", 1.0), ("Q2", 2.0)]);
        assert!(!render(&short).contains("rotate(-35"));
    }

    #[test]
    fn test_axis_titles_and_escaping() {
        let spec = single().with_axis_labels("Metric", "Share <%>");
        let svg = render(&spec);
        assert!(svg.contains(">Metric</text>"));
        assert!(svg.contains(">Share &lt;%&gt;</text>"));
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let spec = ChartSpec::new(ChartKind::Line, "Broken")
            .with_series(Series::new("A", ["x", "y"], [1.0]));
        let err = SvgChartRasterizer::new().render(&spec).unwrap_err();
        assert_eq!(
            err,
            ChartError::LengthMismatch {
                series: "A".to_string(),
                labels: 2,
                values: 1
            }
        );
    }

    #[test]
    fn test_non_finite_is_an_error() {
        let spec = ChartSpec::new(ChartKind::Bar, "NaN").with_mapping([("a", f64::NAN)]);
        assert!(matches!(
            SvgChartRasterizer::new().render(&spec),
            Err(ChartError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_extreme_values_are_an_error() {
        let spec = ChartSpec::new(ChartKind::Line, "Extremes")
            .with_mapping([("a", f64::MAX), ("b", -f64::MAX)]);
        assert_eq!(
            SvgChartRasterizer::new().render(&spec),
            Err(ChartError::OutOfRange {
                title: "Extremes".to_string()
            })
        );

        let stacked = ChartSpec::new(ChartKind::StackedBar, "Overflow")
            .with_series(Series::new("a", ["x"], [f64::MAX]))
            .with_series(Series::new("b", ["x"], [f64::MAX]));
        assert!(matches!(
            SvgChartRasterizer::new().render(&stacked),
            Err(ChartError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_stacked_range_sums_series() {
        let series = vec![
            Series::new("a", ["x"], [3.0]),
            Series::new("b", ["x"], [4.0]),
        ];
        let cats = categories(&series);
        assert_eq!(value_range(ChartKind::StackedBar, &series, &cats), Some((0.0, 7.0)));
        assert_eq!(value_range(ChartKind::Line, &series, &cats), Some((3.0, 4.0)));
    }

    #[test]
    fn test_fmt() {
        assert_eq!(fmt(12.0), "12");
        assert_eq!(fmt(12.345), "12.3");
        assert_eq!(fmt(-0.04), "0");
    }
}
