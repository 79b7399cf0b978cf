//! MIME transfer and header encodings.
//!
//! Supports Base64 (optionally wrapped at 76 columns), Quoted-Printable and
//! RFC 2047 encoded words.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum encoded line length (RFC 2045).
pub const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 split into CRLF-separated lines of at most 76
/// characters.
#[must_use]
pub fn encode_base64_lines(data: &[u8]) -> String {
    let encoded = encode_base64(data);
    encoded
        .as_bytes()
        .chunks(MAX_LINE_LENGTH)
        // Base64 output is ASCII, so every chunk is valid UTF-8
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Encodes text using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input become CRLF hard breaks; longer lines get soft
/// breaks (`=` CRLF) so no output line exceeds 76 characters. Spaces and tabs
/// are encoded when they end a line.
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut result = String::new();

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            result.push_str("\r\n");
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        let bytes = line.as_bytes();
        let mut line_length = 0;

        for (pos, byte) in bytes.iter().enumerate() {
            // Keep room for an escape plus the soft break marker
            if line_length >= MAX_LINE_LENGTH - 3 {
                result.push_str("=\r\n");
                line_length = 0;
            }

            let at_line_end = pos + 1 == bytes.len();
            match byte {
                b'!'..=b'<' | b'>'..=b'~' => {
                    result.push(char::from(*byte));
                    line_length += 1;
                }
                b' ' | b'\t' if !at_line_end => {
                    result.push(char::from(*byte));
                    line_length += 1;
                }
                _ => {
                    let _ = write!(result, "={byte:02X}");
                    line_length += 3;
                }
            }
        }
    }

    result
}

/// Encodes a header value as a single UTF-8 Base64 encoded word.
///
/// Format: `=?UTF-8?B?<base64>?=`
#[must_use]
pub fn encoded_word(text: &str) -> String {
    format!("=?UTF-8?B?{}?=", encode_base64(text.as_bytes()))
}

/// Encodes a header value using RFC 2047 encoding when it needs it.
///
/// Plain ASCII without `=` or `?` is returned unchanged.
///
/// # Arguments
///
/// * `text` - Text to encode
/// * `charset` - Character set (e.g., "UTF-8")
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    if text.chars().all(|c| c.is_ascii() && c != '=' && c != '?') {
        return text.to_string();
    }

    let encoded = encode_base64(text.as_bytes());
    format!("=?{charset}?B?{encoded}?=")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base64_encode() {
        assert_eq!(encode_base64(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn test_base64_lines_wrap_at_76() {
        let data = vec![0xAB_u8; 200];
        let wrapped = encode_base64_lines(&data);
        let lines: Vec<_> = wrapped.split("\r\n").collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[..3].iter().all(|l| l.len() == 76));
        assert_eq!(lines.concat(), encode_base64(&data));
    }

    #[test]
    fn test_base64_lines_empty() {
        assert_eq!(encode_base64_lines(b""), "");
    }

    #[test]
    fn test_quoted_printable_plain_ascii() {
        assert_eq!(encode_quoted_printable("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_quoted_printable_escapes() {
        let encoded = encode_quoted_printable("Héllo a=b");
        assert_eq!(encoded, "H=C3=A9llo a=3Db");
    }

    #[test]
    fn test_quoted_printable_trailing_space() {
        assert_eq!(encode_quoted_printable("end "), "end=20");
        assert_eq!(encode_quoted_printable("a \nb"), "a=20\r\nb");
    }

    #[test]
    fn test_quoted_printable_soft_breaks() {
        let text = "x".repeat(200);
        let encoded = encode_quoted_printable(&text);
        assert!(encoded.split("\r\n").all(|l| l.len() <= MAX_LINE_LENGTH));
        assert_eq!(encoded.replace("=\r\n", ""), text);
    }

    #[test]
    fn test_encoded_word() {
        assert_eq!(encoded_word("Héllo"), "=?UTF-8?B?SMOpbGxv?=");
        assert_eq!(encoded_word(""), "=?UTF-8?B??=");
    }

    #[test]
    fn test_rfc2047_encode() {
        assert_eq!(encode_rfc2047("report.pdf", "UTF-8"), "report.pdf");
        let encoded = encode_rfc2047("résumé.pdf", "UTF-8");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    proptest! {
        #[test]
        fn quoted_printable_lines_fit(text in "\\PC{0,300}") {
            let encoded = encode_quoted_printable(&text);
            for line in encoded.split("\r\n") {
                prop_assert!(line.len() <= MAX_LINE_LENGTH);
                prop_assert!(line.is_ascii());
            }
        }
    }
}
