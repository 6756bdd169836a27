//! Markdown → XHTML conversion with table span reporting.

use std::cell::Cell;
use std::fmt;
use std::ops::Range;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use super::normalize::normalize_source;

/// Result of converting one text body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Converted {
    /// The generated markup.
    pub html: String,
    /// Byte span of every `<table>` element in `html`, in document order.
    pub tables: Vec<Range<usize>>,
}

impl Converted {
    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty()
    }

    /// Markup of the `index`-th table.
    pub fn table(&self, index: usize) -> Option<&str> {
        self.tables.get(index).map(|span| &self.html[span.clone()])
    }
}

/// Converts lightweight marked-up text into structural markup.
///
/// Implementations are best effort and never fail: fragments that cannot be
/// converted are passed through as literal text. `scope` is a document-unique
/// prefix for any identifiers the converter generates (footnote ids), so
/// converted bodies can be concatenated without id collisions.
pub trait MarkupConverter: Send + Sync {
    fn convert(&self, text: &str, scope: &str) -> Converted;
}

/// CommonMark converter with the GitHub extensions reports rely on:
/// tables, footnotes, strikethrough and task lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkConverter {
    smart_punctuation: bool,
}

impl CommonMarkConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert straight quotes and dashes to their typographic forms.
    pub fn with_smart_punctuation(mut self, enabled: bool) -> Self {
        self.smart_punctuation = enabled;
        self
    }

    fn options(&self) -> Options {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        if self.smart_punctuation {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        options
    }
}

impl MarkupConverter for CommonMarkConverter {
    fn convert(&self, text: &str, scope: &str) -> Converted {
        let source = normalize_source(text);
        if source.is_empty() {
            return Converted::default();
        }

        let written = Cell::new(0);
        let mut html = String::with_capacity(source.len() * 3 / 2);
        let mut events = ScopedEvents {
            inner: Parser::new_ext(&source, self.options()),
            scope,
            written: &written,
            open_table: None,
            closing_table: false,
            tables: Vec::new(),
        };

        let writer = TrackedWriter {
            out: &mut html,
            written: &written,
        };
        if let Err(err) = html::write_html_fmt(writer, &mut events) {
            tracing::warn!(
                %scope,
                error = %err,
                "markdown conversion failed, passing text through"
            );
            return Converted {
                html: format!("<p>{}</p>\n", crate::util::escape_xml(&source)),
                tables: Vec::new(),
            };
        }
        events.finish();

        Converted {
            html,
            tables: events.tables,
        }
    }
}

/// `fmt::Write` sink that publishes its length after every write.
struct TrackedWriter<'a> {
    out: &'a mut String,
    written: &'a Cell<usize>,
}

impl fmt::Write for TrackedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        self.written.set(self.out.len());
        Ok(())
    }
}

/// Event adapter that scopes footnote labels, records table spans and
/// escapes raw HTML.
///
/// The HTML writer fully emits each event before pulling the next one, so
/// the output length observed when an event is pulled is the byte offset
/// at which that event's markup begins.
struct ScopedEvents<'a, 'c> {
    inner: Parser<'a>,
    scope: &'c str,
    written: &'c Cell<usize>,
    open_table: Option<usize>,
    closing_table: bool,
    tables: Vec<Range<usize>>,
}

impl<'a> ScopedEvents<'a, '_> {
    fn scoped(&self, label: &str) -> CowStr<'a> {
        CowStr::from(format!("{}-fn-{}", self.scope, label))
    }

    fn finish(&mut self) {
        if self.closing_table {
            self.closing_table = false;
            if let Some(start) = self.open_table.take() {
                self.tables.push(start..self.written.get());
            }
        }
    }
}

impl<'a> Iterator for ScopedEvents<'a, '_> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        self.finish();

        let event = self.inner.next()?;
        let event = match event {
            Event::Start(Tag::Table(alignments)) => {
                self.open_table = Some(self.written.get());
                Event::Start(Tag::Table(alignments))
            }
            Event::End(TagEnd::Table) => {
                self.closing_table = true;
                Event::End(TagEnd::Table)
            }
            Event::FootnoteReference(label) => Event::FootnoteReference(self.scoped(&label)),
            Event::Start(Tag::FootnoteDefinition(label)) => {
                Event::Start(Tag::FootnoteDefinition(self.scoped(&label)))
            }
            // Raw HTML is not guaranteed to be XHTML; keep it as literal text.
            Event::Start(Tag::HtmlBlock) => Event::Start(Tag::Paragraph),
            Event::End(TagEnd::HtmlBlock) => Event::End(TagEnd::Paragraph),
            Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
            other => other,
        };
        Some(event)
    }
}
