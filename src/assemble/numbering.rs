//! Chapter numerals and chapter-relative counters.

use super::config::NumeralPolicy;

const CLASSIC: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

const SUBTRACTIVE: [(usize, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Roman numeral for a 1-based chapter ordinal, or `None` when the policy
/// has no numeral for it.
pub fn roman(ordinal: usize, policy: NumeralPolicy) -> Option<String> {
    if ordinal == 0 || ordinal > policy.max_chapter() {
        return None;
    }
    match policy {
        NumeralPolicy::Classic => CLASSIC.get(ordinal - 1).map(|s| s.to_string()),
        NumeralPolicy::Extended => {
            let mut rest = ordinal;
            let mut out = String::new();
            for (value, symbol) in SUBTRACTIVE {
                while rest >= value {
                    out.push_str(symbol);
                    rest -= value;
                }
            }
            Some(out)
        }
    }
}

/// Per-chapter counters for figures, tables and boxes.
///
/// Counters restart at 1 on every chapter. Before the first chapter numbers
/// are plain integers; inside a chapter they carry its numeral (`II.3`).
#[derive(Debug, Default)]
pub(crate) struct Counters {
    chapter: usize,
    numeral: Option<String>,
    figure: usize,
    table: usize,
    boxed: usize,
}

impl Counters {
    /// Ordinal the next chapter will get.
    pub fn next_chapter(&self) -> usize {
        self.chapter + 1
    }

    pub fn enter_chapter(&mut self, numeral: String) {
        self.chapter += 1;
        self.numeral = Some(numeral);
        self.figure = 0;
        self.table = 0;
        self.boxed = 0;
    }

    pub fn chapters(&self) -> usize {
        self.chapter
    }

    pub fn next_figure(&mut self) -> String {
        self.figure += 1;
        self.display(self.figure)
    }

    pub fn next_table(&mut self) -> String {
        self.table += 1;
        self.display(self.table)
    }

    pub fn next_box(&mut self) -> String {
        self.boxed += 1;
        self.display(self.boxed)
    }

    fn display(&self, n: usize) -> String {
        match &self.numeral {
            Some(numeral) => format!("{numeral}.{n}"),
            None => n.to_string(),
        }
    }
}
