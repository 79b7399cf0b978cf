//! Append-only record of every command sent and reply received.

use chrono::{DateTime, Local};
use serde::Serialize;

/// One exchanged command and the reply it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Command line as sent (or a pseudo-command such as `CONNECT`).
    pub command: String,
    /// Reply code, 0 when no reply was read.
    pub code: u16,
    /// Reply text or a diagnostic message.
    pub message: String,
    /// Wall-clock time the entry was recorded.
    pub time: DateTime<Local>,
}

/// Ordered, append-only session log.
///
/// Entries are never modified once recorded. Errors that carry a log hold a
/// cloned snapshot, so appending to the live session never changes what an
/// error reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
}

impl SessionLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records an entry stamped with the current time.
    pub fn append(&mut self, command: impl Into<String>, code: u16, message: impl Into<String>) {
        self.entries.push(LogEntry {
            command: command.into(),
            code,
            message: message.into(),
            time: Local::now(),
        });
    }

    /// Returns the most recent entry.
    #[must_use]
    pub fn last_entry(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Returns every entry, oldest first.
    #[must_use]
    pub fn all(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Iterates over the entries, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a SessionLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
