//! Small text helpers shared by addresses, headers and the HTML body.

/// Trims bytes 0x00-0x20 from both ends and collapses every run of ASCII
/// whitespace (line breaks included) into one space.
///
/// Non-ASCII spaces such as U+00A0 are kept as written.
#[must_use]
pub fn trim_control_chars(text: &str) -> String {
    text.split(|c: char| c.is_ascii_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c <= ' ')
        .to_string()
}

/// Cleans an address or display name: angle brackets removed, then
/// [`trim_control_chars`].
#[must_use]
pub fn sanitize(text: &str) -> String {
    trim_control_chars(&text.replace(['<', '>'], ""))
}

/// Escapes text for use inside HTML elements and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
