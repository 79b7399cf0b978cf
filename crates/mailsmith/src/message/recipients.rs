//! Recipient classes and address lists.

use std::fmt;
use std::str::FromStr;

use mailsmith_mime::encoding::encoded_word;

use crate::error::{Error, Result};
use crate::text::sanitize;

/// Recipient class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientKind {
    /// Primary recipients.
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy.
    Bcc,
}

impl RecipientKind {
    /// Every class, in envelope order.
    pub const ALL: [Self; 3] = [Self::To, Self::Cc, Self::Bcc];

    /// Header name for this class.
    #[must_use]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::To => "To",
            Self::Cc => "CC",
            Self::Bcc => "BCC",
        }
    }
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

impl FromStr for RecipientKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "to" => Ok(Self::To),
            "cc" => Ok(Self::Cc),
            "bcc" => Ok(Self::Bcc),
            other => Err(Error::Config(format!("unknown recipient class: {other}"))),
        }
    }
}

/// One recipient address with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Sanitized address.
    pub address: String,
    /// Display name; the address when none was given.
    pub name: String,
}

impl Recipient {
    /// `=?UTF-8?B?<name>?= <address>`
    #[must_use]
    pub fn encoded(&self) -> String {
        format!("{} <{}>", encoded_word(&self.name), self.address)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.address)
    }
}

/// Addresses of one recipient class, unique and case-sensitive, in insertion
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList {
    entries: Vec<Recipient>,
}

impl RecipientList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an address.
    ///
    /// Both parts are sanitized. A blank name falls back to the address and
    /// an existing address has its name replaced. Returns false, leaving the
    /// list untouched, if the address is empty after sanitizing.
    pub fn add(&mut self, address: &str, name: Option<&str>) -> bool {
        let address = sanitize(address);
        if address.is_empty() {
            return false;
        }
        let name = name.map(sanitize).filter(|n| !n.is_empty());
        let name = name.unwrap_or_else(|| address.clone());

        if let Some(existing) = self.entries.iter_mut().find(|r| r.address == address) {
            existing.name = name;
        } else {
            self.entries.push(Recipient { address, name });
        }
        true
    }

    /// Looks up the display name of an address.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|r| r.address == address)
            .map(|r| r.name.as_str())
    }

    /// Returns true if the address is present.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.get(address).is_some()
    }

    /// Iterates over recipients in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Recipient> {
        self.entries.iter()
    }

    /// Iterates over addresses in insertion order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.address.as_str())
    }

    /// Encoded header value, comma-joined.
    #[must_use]
    pub fn header_value(&self) -> String {
        self.entries
            .iter()
            .map(Recipient::encoded)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Plain `name <address>` list, comma-joined.
    #[must_use]
    pub fn display_value(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Removes every address.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no addresses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecipientList {
    type Item = &'a Recipient;
    type IntoIter = std::slice::Iter<'a, Recipient>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The three recipient classes of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients {
    to: RecipientList,
    cc: RecipientList,
    bcc: RecipientList,
}

impl Recipients {
    /// Returns the list for a class.
    #[must_use]
    pub const fn get(&self, kind: RecipientKind) -> &RecipientList {
        match kind {
            RecipientKind::To => &self.to,
            RecipientKind::Cc => &self.cc,
            RecipientKind::Bcc => &self.bcc,
        }
    }

    /// Returns the list for a class, mutably.
    pub const fn get_mut(&mut self, kind: RecipientKind) -> &mut RecipientList {
        match kind {
            RecipientKind::To => &mut self.to,
            RecipientKind::Cc => &mut self.cc,
            RecipientKind::Bcc => &mut self.bcc,
        }
    }

    /// Every address across classes, in envelope order.
    pub fn envelope(&self) -> impl Iterator<Item = &str> {
        RecipientKind::ALL
            .into_iter()
            .flat_map(|kind| self.get(kind).addresses())
    }

    /// Total count across classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// Returns true if no class holds an address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears every class.
    pub fn clear(&mut self) {
        self.to.clear();
        self.cc.clear();
        self.bcc.clear();
    }
}
