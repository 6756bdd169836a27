//! The sequential numbering fold.

use std::ops::Range;

use crate::error::{Error, Result};
use crate::model::{AssembledDocument, Asset, Block, RegistryEntry, Section, TocEntry};
use crate::render::{self, Figure, FigureContent, SectionView};
use crate::util::sanitize_file_name;

use super::config::{AssemblyConfig, BoxNumbering};
use super::numbering::{Counters, roman};
use super::prepare::{Prepared, ResolvedImage};
use super::registry::{self, Registry};

/// All mutable state of one assembly run, owned by the fold.
pub(crate) struct AssemblyState<'c> {
    config: &'c AssemblyConfig,
    counters: Counters,
    toc: Vec<TocEntry>,
    figures: Registry,
    tables: Registry,
    boxes: Registry,
    body: Vec<Block>,
    assets: Vec<Asset>,
}

impl<'c> AssemblyState<'c> {
    pub fn new(config: &'c AssemblyConfig) -> Self {
        Self {
            config,
            counters: Counters::default(),
            toc: Vec::new(),
            figures: Registry::default(),
            tables: Registry::default(),
            boxes: Registry::default(),
            body: Vec::new(),
            assets: Vec::new(),
        }
    }

    /// Number, register and render one prepared section.
    pub fn place(&mut self, prepared: Prepared) -> Result<()> {
        let Prepared {
            index,
            anchor,
            section,
            main,
            side,
            chart,
            image,
        } = prepared;
        let layout = section.layout();

        let numeral = match &section {
            Section::Chapter { .. } => Some(self.enter_chapter(index)?),
            _ => None,
        };

        if layout.is_structural() {
            self.toc.push(TocEntry {
                title: section.title().unwrap_or_default().to_string(),
                anchor: anchor.clone(),
                layout,
                numeral: numeral.clone(),
            });
        }

        let chart = chart.map(|svg| self.number_chart(index, &section, svg));
        let image = image.map(|image| self.number_image(index, image));

        let table_captions = section
            .body()
            .map(|body| body.table_captions.as_slice())
            .unwrap_or_default();
        let main = self.number_tables(index, &main.html, &main.tables, table_captions);

        let box_label = match &section {
            Section::Box { title, .. } => Some(self.register_box(index, &anchor, title)),
            _ => None,
        };

        let html = render::render_section(&SectionView {
            anchor: &anchor,
            section: &section,
            main: &main,
            side: &side.html,
            chart: chart.as_ref(),
            image: image.as_ref(),
            numeral: numeral.as_deref(),
            box_label: box_label.as_deref(),
        });

        tracing::debug!(section = index, %layout, "placed section");
        self.body.push(Block {
            anchor,
            layout,
            html,
        });
        Ok(())
    }

    pub fn finish(self) -> AssembledDocument {
        tracing::info!(
            sections = self.body.len(),
            chapters = self.counters.chapters(),
            figures = self.figures.len(),
            tables = self.tables.len(),
            boxes = self.boxes.len(),
            "assembled document"
        );
        AssembledDocument {
            toc: self.toc,
            figures: self.figures.into_entries(),
            tables: self.tables.into_entries(),
            boxes: self.boxes.into_entries(),
            body: self.body,
            assets: self.assets,
        }
    }

    fn enter_chapter(&mut self, index: usize) -> Result<String> {
        let chapter = self.counters.next_chapter();
        let policy = self.config.numerals;
        let numeral = roman(chapter, policy).ok_or(Error::ChapterNumeral {
            section: index,
            chapter,
            policy,
        })?;
        self.counters.enter_chapter(numeral.clone());
        Ok(numeral)
    }

    fn number_chart(&mut self, index: usize, section: &Section, svg: String) -> Figure {
        let title = section.chart().map(|c| c.title.as_str()).unwrap_or_default();
        let number = self.counters.next_figure();
        let caption = registry::chart_caption(&number, title);
        self.register_figure(index, number, caption, FigureContent::Chart(svg))
    }

    fn number_image(&mut self, index: usize, image: ResolvedImage) -> Figure {
        let number = self.counters.next_figure();
        let caption = registry::image_caption(&number, image.caption.as_deref());
        let src = match image.data_uri {
            Some(uri) => uri,
            None => self.bundle(&image),
        };
        let alt = caption.caption.clone();
        self.register_figure(index, number, caption, FigureContent::Image { src, alt })
    }

    fn register_figure(
        &mut self,
        index: usize,
        number: String,
        caption: registry::Caption,
        content: FigureContent,
    ) -> Figure {
        let anchor = format!("figure-{}", self.figures.next_ordinal());
        self.figures.push(RegistryEntry {
            number,
            caption: caption.caption,
            label: caption.label.clone(),
            anchor: anchor.clone(),
            section: index,
        });
        Figure {
            anchor,
            label: caption.label,
            content,
        }
    }

    /// List the image as an asset and return its href.
    fn bundle(&mut self, image: &ResolvedImage) -> String {
        let file_name = image
            .path
            .file_name()
            .map(|name| sanitize_file_name(&name.to_string_lossy()))
            .unwrap_or_else(|| "image".to_string());
        let href = format!("images/{}-{}", self.assets.len() + 1, file_name);
        self.assets.push(Asset {
            href: href.clone(),
            path: image.path.clone(),
            media_type: image.media_type.to_string(),
        });
        href
    }

    /// Caption every table of a converted body, consuming captions in order.
    fn number_tables(
        &mut self,
        index: usize,
        html: &str,
        spans: &[Range<usize>],
        captions: &[String],
    ) -> String {
        if spans.is_empty() {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len() + spans.len() * 96);
        let mut cursor = 0;
        for (i, span) in spans.iter().enumerate() {
            out.push_str(&html[cursor..span.start]);

            let number = self.counters.next_table();
            let caption = registry::table_caption(&number, captions.get(i).map(String::as_str));
            let anchor = format!("table-{}", self.tables.next_ordinal());
            out.push_str(&render::html::table_figure(
                &anchor,
                &caption.label,
                &html[span.clone()],
            ));
            self.tables.push(RegistryEntry {
                number,
                caption: caption.caption,
                label: caption.label,
                anchor,
                section: index,
            });
            cursor = span.end;
        }
        out.push_str(&html[cursor..]);

        if captions.len() > spans.len() {
            tracing::debug!(
                section = index,
                unused = captions.len() - spans.len(),
                "table captions without a matching table"
            );
        }
        out
    }

    fn register_box(&mut self, index: usize, anchor: &str, title: &str) -> String {
        let number = match self.config.box_numbering {
            BoxNumbering::Unnumbered => String::new(),
            BoxNumbering::ChapterRelative => self.counters.next_box(),
        };
        let caption = registry::box_caption(&number, title);
        self.boxes.push(RegistryEntry {
            number,
            caption: caption.caption,
            label: caption.label.clone(),
            anchor: anchor.to_string(),
            section: index,
        });
        caption.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::NumeralPolicy;
    use crate::markdown::Converted;
    use crate::model::{Body, Layout};

    fn standard(
        index: usize,
        html: &str,
        tables: Vec<Range<usize>>,
        captions: &[&str],
    ) -> Prepared {
        Prepared {
            index,
            anchor: format!("section-{index}"),
            section: Section::Standard {
                pull_quote: None,
                body: Body {
                    text: String::new(),
                    table_captions: captions.iter().map(|c| c.to_string()).collect(),
                },
                chart: None,
                image: None,
            },
            main: Converted {
                html: html.to_string(),
                tables,
            },
            side: Converted::default(),
            chart: None,
            image: None,
        }
    }

    #[test]
    fn test_tables_consume_captions_in_order() {
        let html = "<p>a</p>\n<table>1</table>\n<p>b</p>\n<table>2</table>\n";
        let first = html.find("<table>1").unwrap();
        let second = html.find("<table>2").unwrap();
        let spans = vec![first..first + 17, second..second + 17];

        let config = AssemblyConfig::default();
        let mut state = AssemblyState::new(&config);
        state.place(standard(0, html, spans, &["Only one"])).unwrap();
        let doc = state.finish();

        assert_eq!(doc.tables.len(), 2);
        assert_eq!(doc.tables[0].label, "Table 1: Only one");
        assert_eq!(doc.tables[1].label, "Table 2");
        assert_eq!(doc.tables[1].anchor, "table-2");
        let body = doc.body_html();
        assert!(body.contains("<figure id=\"table-1\" class=\"table-wrapper\">"));
        assert!(body.find("<p>a</p>").unwrap() < body.find("table-1").unwrap());
        assert!(body.find("table-1").unwrap() < body.find("<p>b</p>").unwrap());
    }

    #[test]
    fn test_chapter_numeral_overflow_names_section() {
        let config = AssemblyConfig::default().with_numerals(NumeralPolicy::Classic);
        let mut state = AssemblyState::new(&config);
        for i in 0..10 {
            state.place(chapter(i)).unwrap();
        }
        let err = state.place(chapter(10)).unwrap_err();
        assert!(matches!(
            err,
            Error::ChapterNumeral {
                section: 10,
                chapter: 11,
                ..
            }
        ));
    }

    fn chapter(index: usize) -> Prepared {
        Prepared {
            index,
            anchor: format!("section-{index}"),
            section: Section::Chapter {
                title: format!("Chapter {index}"),
            },
            main: Converted::default(),
            side: Converted::default(),
            chart: None,
            image: None,
        }
    }

    #[test]
    fn test_toc_only_lists_structural_layouts() {
        let config = AssemblyConfig::default();
        let mut state = AssemblyState::new(&config);
        state.place(chapter(0)).unwrap();
        state.place(standard(1, "<p>x</p>", Vec::new(), &[])).unwrap();
        let doc = state.finish();
        assert_eq!(doc.toc.len(), 1);
        assert_eq!(doc.toc[0].layout, Layout::Chapter);
        assert_eq!(doc.toc[0].numeral.as_deref(), Some("I"));
        assert_eq!(doc.toc[0].label(), "I. Chapter 0");
    }
}
