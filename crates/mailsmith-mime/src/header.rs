//! MIME header handling.

use chrono::{DateTime, TimeZone};
use std::fmt;

use crate::error::{Error, Result};

/// Ordered collection of email headers.
///
/// Headers are written in insertion order; names compare case-insensitively.
/// Values containing CR or LF are rejected so a header can never smuggle in
/// another one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the name is empty or contains
    /// anything but printable ASCII without `:`, or if the value contains a
    /// line break.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        validate(&name, &value)?;
        self.headers.push((name, value));
        Ok(())
    }

    /// Replaces the first header with this name, or appends it.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Headers::add`].
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        validate(&name, &value)?;
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        Ok(())
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns each header rendered as a `Name: value` line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.iter().map(|(n, v)| format!("{n}: {v}")).collect()
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Formats a timestamp for the `Date` header (RFC 2822 with zone offset).
#[must_use]
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    date.to_rfc2822()
}

fn validate(name: &str, value: &str) -> Result<()> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic() && b != b':') {
        return Err(Error::InvalidHeader(format!("bad header name {name:?}")));
    }
    if value.contains(['\r', '\n']) {
        return Err(Error::InvalidHeader(format!(
            "line break in value of {name}"
        )));
    }
    Ok(())
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_headers_keep_insertion_order() {
        let mut headers = Headers::new();
        headers.add("Priority", "urgent").unwrap();
        headers.add("Importance", "High").unwrap();
        headers.add("From", "me@example.com").unwrap();

        assert_eq!(
            headers.lines(),
            ["Priority: urgent", "Importance: High", "From: me@example.com"]
        );
    }

    #[test]
    fn test_headers_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain").unwrap();
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("Subject"), None);
    }

    #[test]
    fn test_headers_set_replaces_in_place() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com").unwrap();
        headers.add("Subject", "Hi").unwrap();
        headers.set("to", "bob@example.com").unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.lines()[0], "To: bob@example.com");
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.add("Subject", "Test").unwrap();
        headers.remove("SUBJECT");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_line_breaks_are_rejected() {
        let mut headers = Headers::new();
        let err = headers
            .add("Subject", "hi\r\nBcc: victim@example.com")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
        assert!(headers.add("Bad Name", "x").is_err());
        assert!(headers.add("", "x").is_err());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_display_uses_crlf() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com").unwrap();
        headers.add("To", "b@example.com").unwrap();
        assert_eq!(
            headers.to_string(),
            "From: a@example.com\r\nTo: b@example.com\r\n"
        );
    }

    #[test]
    fn test_format_date() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let date = offset.with_ymd_and_hms(2024, 3, 15, 14, 7, 9).unwrap();
        assert_eq!(format_date(&date), "Fri, 15 Mar 2024 14:07:09 +0300");
    }
}
