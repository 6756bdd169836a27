//! Source normalization ahead of Markdown parsing.
//!
//! Planner output often arrives with Windows line endings and with every
//! line indented by the same amount (text lifted out of an indented string
//! literal). Left alone, CommonMark would read such text as one large code
//! block.

/// Normalize line endings, strip surrounding blank lines and remove the
/// whitespace prefix common to every non-blank line.
///
/// # Examples
///
/// ```
/// use dossier::markdown::normalize_source;
///
/// assert_eq!(normalize_source("\n    # Title\n\n    Body\n  "), "# Title\n\nBody");
/// assert_eq!(normalize_source("a\r\nb"), "a\nb");
/// ```
pub fn normalize_source(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = text.split('\n').collect();

    let Some(start) = lines.iter().position(|line| !is_blank(line)) else {
        return String::new();
    };
    let end = lines
        .iter()
        .rposition(|line| !is_blank(line))
        .map_or(lines.len(), |i| i + 1);
    let lines = &lines[start..end];

    let prefix = common_indent(lines);

    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if is_blank(line) {
            continue;
        }
        out.push_str(line.strip_prefix(prefix).unwrap_or(line));
    }
    out
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// The longest whitespace prefix shared by all non-blank lines.
fn common_indent<'a>(lines: &[&'a str]) -> &'a str {
    let mut prefix: Option<&str> = None;
    for line in lines.iter().filter(|line| !is_blank(line)) {
        let indent = leading_whitespace(line);
        prefix = Some(match prefix {
            None => indent,
            Some(current) => {
                let shared = current
                    .bytes()
                    .zip(indent.bytes())
                    .take_while(|(a, b)| a == b)
                    .count();
                &current[..shared]
            }
        });
    }
    prefix.unwrap_or("")
}
