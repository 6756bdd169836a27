//! Markup fragments shared by the layout templates.

use crate::util::escape_xml;

use super::{Figure, FigureContent};

/// Branded divider drawn under chapter, prelude, split and sidebar headings.
pub fn ornament() -> &'static str {
    concat!(
        "<div class=\"ornament\">",
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"50\" height=\"6\" viewBox=\"0 0 50 6\">",
        "<rect width=\"50\" height=\"6\" fill=\"#bae9f4\"/>",
        "</svg></div>\n"
    )
}

/// A numbered figure: chart or image with its caption underneath.
pub fn figure(out: &mut String, figure: &Figure) {
    let class = match figure.content {
        FigureContent::Chart(_) => "figure chart-wrapper",
        FigureContent::Image { .. } => "figure image-wrapper",
    };
    out.push_str(&format!(
        "<figure id=\"{}\" class=\"{class}\">",
        escape_xml(&figure.anchor)
    ));
    match &figure.content {
        FigureContent::Chart(svg) => out.push_str(svg),
        FigureContent::Image { src, alt } => out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\"/>",
            escape_xml(src),
            escape_xml(alt)
        )),
    }
    out.push_str(&format!(
        "<figcaption class=\"caption\">{}</figcaption></figure>\n",
        escape_xml(&figure.label)
    ));
}

/// Wrap converted table markup with its anchor and caption.
pub fn table_figure(anchor: &str, label: &str, table: &str) -> String {
    format!(
        "<figure id=\"{}\" class=\"table-wrapper\"><figcaption class=\"caption\">{}</figcaption>\n{}</figure>\n",
        escape_xml(anchor),
        escape_xml(label),
        table.trim_end()
    )
}

/// Open a section element.
pub fn open_section(out: &mut String, anchor: &str, class: &str) {
    out.push_str(&format!(
        "<section id=\"{}\" class=\"{class}\">\n",
        escape_xml(anchor)
    ));
}

/// Heading with escaped text.
pub fn heading(out: &mut String, level: u8, class: Option<&str>, text: &str) {
    match class {
        Some(class) => out.push_str(&format!(
            "<h{level} class=\"{class}\">{}</h{level}>\n",
            escape_xml(text)
        )),
        None => out.push_str(&format!("<h{level}>{}</h{level}>\n", escape_xml(text))),
    }
}

/// `<div class=..>` around already converted markup.
pub fn div(out: &mut String, class: &str, inner: &str) {
    out.push_str(&format!("<div class=\"{class}\">\n{inner}</div>\n"));
}
