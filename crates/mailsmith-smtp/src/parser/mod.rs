//! SMTP response parser.

use crate::types::{Reply, ReplyCode};

/// Parses the reply code from the first three bytes of a line.
///
/// Each byte must be an ASCII digit; the code is accumulated digit by digit.
/// Returns `None` for short or non-numeric lines.
#[must_use]
pub fn parse_code(line: &str) -> Option<u16> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 {
        return None;
    }

    bytes[..3].iter().try_fold(0u16, |code, byte| {
        byte.is_ascii_digit()
            .then(|| code * 10 + u16::from(byte - b'0'))
    })
}

/// Parses an SMTP reply from response lines.
///
/// SMTP replies can be single-line or multi-line:
/// - Single: `250 OK\r\n`
/// - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
///
/// Returns `None` when the first line carries no numeric code. Lines that are
/// too short to hold text contribute an empty message line.
#[must_use]
pub fn parse_reply(lines: &[String]) -> Option<Reply> {
    let code = parse_code(lines.first()?)?;

    let message = lines
        .iter()
        .map(|line| line.get(4..).unwrap_or_default().to_string())
        .collect();

    Some(Reply::new(ReplyCode::new(code), message))
}

/// Checks if a line is the last line of a multi-line reply.
///
/// Multi-line replies use `-` separator for continuation and ` ` for the last
/// line. A line too short to carry a separator also ends the reply.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.len() < 4 || line.as_bytes()[3] == b' '
}
