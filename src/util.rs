//! Small string and path helpers shared by the renderers and exporters.

use std::path::Path;

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reduce a file name to characters that are safe inside a ZIP entry and an
/// href (ASCII alphanumerics, `-`, `_`, `.`).
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "asset".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Guess media type from file extension.
pub fn guess_media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xhtml" | "html" | "htm" => "application/xhtml+xml",
        "css" => "text/css",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Hello & World"), "Hello &amp; World");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("map of europe.png"), "map_of_europe.png");
        assert_eq!(sanitize_file_name("résumé.jpg"), "r_sum_.jpg");
        assert_eq!(sanitize_file_name("..."), "asset");
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type(Path::new("a/b.PNG")), "image/png");
        assert_eq!(guess_media_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(guess_media_type(Path::new("style.css")), "text/css");
        assert_eq!(guess_media_type(Path::new("noext")), "application/octet-stream");
    }
}
