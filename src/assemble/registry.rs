//! Registries of numbered items and their caption rules.

use crate::model::RegistryEntry;

/// An append-only list of numbered items with a document-wide ordinal.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// 1-based ordinal the next entry will get.
    pub fn next_ordinal(&self) -> usize {
        self.entries.len() + 1
    }

    pub fn push(&mut self, entry: RegistryEntry) {
        tracing::trace!(
            number = %entry.number,
            anchor = %entry.anchor,
            section = entry.section,
            "registered {}",
            entry.label
        );
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Vec<RegistryEntry> {
        self.entries
    }
}

/// Caption and display label of a registry item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Caption {
    pub caption: String,
    pub label: String,
}

/// `Figure {n}: {title}` for a chart.
pub(crate) fn chart_caption(number: &str, title: &str) -> Caption {
    let title = title.trim();
    Caption {
        caption: title.to_string(),
        label: prefixed("Figure", number, title),
    }
}

/// Caption for an image.
///
/// A caller caption that already carries a figure number (`Figure 2: ...`,
/// `Fig. I.3 - ...`) is kept verbatim as the label; the caption is the text
/// after its colon.
pub(crate) fn image_caption(number: &str, caption: Option<&str>) -> Caption {
    let caption = caption.map(str::trim).unwrap_or_default();
    if has_figure_number(caption) {
        let text = caption
            .split_once(':')
            .map(|(_, rest)| rest.trim())
            .unwrap_or(caption);
        return Caption {
            caption: text.to_string(),
            label: caption.to_string(),
        };
    }
    Caption {
        caption: caption.to_string(),
        label: prefixed("Figure", number, caption),
    }
}

/// Whether `caption` opens with `Figure`/`Fig.` followed by a number or a
/// colon. "Figures of merit" and "Figure in context" do not.
fn has_figure_number(caption: &str) -> bool {
    let lower = caption.to_ascii_lowercase();
    let rest = if let Some(rest) = lower.strip_prefix("figure") {
        if !rest.starts_with(|c: char| c.is_whitespace() || c == ':') {
            return false;
        }
        rest
    } else if let Some(rest) = lower.strip_prefix("fig.") {
        rest
    } else {
        return false;
    };

    let rest = rest.trim_start();
    if rest.starts_with(':') {
        return true;
    }
    let token_len = rest
        .find(|c: char| !(c.is_ascii_digit() || "ivxlcdm.".contains(c)))
        .unwrap_or(rest.len());
    let token = rest[..token_len].trim_end_matches('.');
    let boundary = rest[token_len..]
        .chars()
        .next()
        .is_none_or(|c| c.is_whitespace() || matches!(c, ':' | '-' | ','));
    !token.is_empty() && !token.starts_with('.') && boundary
}

/// Caption for a table, from the next unused table caption if any.
pub(crate) fn table_caption(number: &str, caption: Option<&str>) -> Caption {
    match caption.map(str::trim).filter(|c| !c.is_empty()) {
        Some(caption) => Caption {
            caption: caption.to_string(),
            label: prefixed("Table", number, caption),
        },
        None => {
            let generic = format!("Table {number}");
            Caption {
                caption: generic.clone(),
                label: generic,
            }
        }
    }
}

/// Caption for a box. `number` is empty for unnumbered boxes.
pub(crate) fn box_caption(number: &str, title: &str) -> Caption {
    let title = title.trim();
    let label = if number.is_empty() || title.to_lowercase().starts_with("box") {
        title.to_string()
    } else {
        prefixed("Box", number, title)
    };
    Caption {
        caption: title.to_string(),
        label,
    }
}

fn prefixed(kind: &str, number: &str, text: &str) -> String {
    if text.is_empty() {
        format!("{kind} {number}")
    } else {
        format!("{kind} {number}: {text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_caption() {
        let c = chart_caption("I.2", "Adoption Rates");
        assert_eq!(c.label, "Figure I.2: Adoption Rates");
        assert_eq!(c.caption, "Adoption Rates");
        assert_eq!(chart_caption("3", "").label, "Figure 3");
    }

    #[test]
    fn test_image_caption_verbatim_figure_prefix() {
        let c = image_caption("I.1", Some("Figure I.1: System architecture"));
        assert_eq!(c.label, "Figure I.1: System architecture");
        assert_eq!(c.caption, "System architecture");

        let c = image_caption("2", Some("fig. 7 - sketch"));
        assert_eq!(c.label, "fig. 7 - sketch");
        assert_eq!(c.caption, "fig. 7 - sketch");
    }

    #[test]
    fn test_image_caption_numbered() {
        assert_eq!(image_caption("II.1", Some("Floor plan")).label, "Figure II.1: Floor plan");
        assert_eq!(image_caption("1", None).label, "Figure 1");
        assert_eq!(image_caption("1", Some("Figurative art")).label, "Figure 1: Figurative art");

        let c = image_caption("I.2", Some("Figures of merit across regions"));
        assert_eq!(c.label, "Figure I.2: Figures of merit across regions");
        assert_eq!(c.caption, "Figures of merit across regions");
        assert_eq!(
            image_caption("3", Some("Figure in context")).label,
            "Figure 3: Figure in context"
        );
    }

    #[test]
    fn test_figure_number_detection() {
        for caption in [
            "Figure 2: Map",
            "FIGURE II.4 Ground floor",
            "Figure: Untitled",
            "Fig. 7 - sketch",
            "fig.3, detail",
            "Figure 12",
        ] {
            assert!(has_figure_number(caption), "{caption}");
        }
        for caption in [
            "Figures of merit",
            "Figurehead",
            "Figure in context",
            "Fig tree",
            "Figure skating results",
            "",
        ] {
            assert!(!has_figure_number(caption), "{caption}");
        }
    }

    #[test]
    fn test_table_caption() {
        let c = table_caption("I.1", Some("Layout modes"));
        assert_eq!(c.label, "Table I.1: Layout modes");
        let c = table_caption("I.2", None);
        assert_eq!(c.label, "Table I.2");
        assert_eq!(c.caption, "Table I.2");
        assert_eq!(table_caption("3", Some("  ")).label, "Table 3");
    }

    #[test]
    fn test_box_caption() {
        assert_eq!(box_caption("", "Key Takeaways").label, "Key Takeaways");
        assert_eq!(box_caption("I.1", "Key Takeaways").label, "Box I.1: Key Takeaways");
        assert_eq!(box_caption("I.1", "Box 1: Methods").label, "Box 1: Methods");
    }

    #[test]
    fn test_registry_ordinals() {
        let mut registry = Registry::default();
        assert_eq!(registry.next_ordinal(), 1);
        registry.push(RegistryEntry {
            number: "1".into(),
            caption: "A".into(),
            label: "Figure 1: A".into(),
            anchor: "figure-1".into(),
            section: 0,
        });
        assert_eq!(registry.next_ordinal(), 2);
        assert_eq!(registry.len(), 1);
    }
}
