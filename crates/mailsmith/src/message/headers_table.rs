//! Visible table of the original headers, used by the test modes.

use crate::text::escape_html;

/// Paragraph separating the table from the original body.
pub const DIVIDER: &str =
    "<p style=\"font-weight: 600\">----Actual Email Starts After This Line----</p>\n<hr>";

/// Two-column HTML table of header names and values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadersTable {
    rows: Vec<(String, String)>,
}

impl HeadersTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Adds a row.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.rows.push((name.into(), value.into()));
    }

    /// Value of the first row named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the table; names and values are escaped.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = String::from(
            "<table id=\"email-headers-table\">\n<tr><td style=\"font-weight: bold\">Header Name</td><td style=\"font-weight: bold\">Header Value</td></tr>\n",
        );
        for (name, value) in &self.rows {
            html.push_str("<tr><td style=\"font-weight: bold\">");
            html.push_str(&escape_html(name));
            html.push_str("</td><td>");
            html.push_str(&escape_html(value));
            html.push_str("</td></tr>\n");
        }
        html.push_str("</table>");
        html
    }
}
