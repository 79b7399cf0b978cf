//! MIME content type handling.

use crate::error::{Error, Result};
use std::fmt;

/// MIME content type with ordered parameters.
///
/// Parameter values are always written quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters in the order they are written.
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Vec::new(),
        }
    }

    /// Creates a `text/html; charset="UTF-8"` content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html").with_parameter("charset", "UTF-8")
    }

    /// Creates a multipart/mixed content type with boundary.
    #[must_use]
    pub fn multipart_mixed(boundary: impl Into<String>) -> Self {
        Self::new("multipart", "mixed").with_parameter("boundary", boundary)
    }

    /// The generic binary type used when nothing more specific is known.
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Adds a parameter, replacing an existing one with the same name.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .parameters
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.parameters.push((key, value)),
        }
        self
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary")
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }

    /// Parses a `type/subtype` string, optionally followed by parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the type or subtype is missing or contains
    /// characters outside printable ASCII.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(';');
        let type_str = parts.next().unwrap_or_default().trim();

        let (main_type, sub_type) = type_str
            .split_once('/')
            .ok_or_else(|| Error::InvalidContentType(format!("missing subtype in {s:?}")))?;
        let (main_type, sub_type) = (main_type.trim(), sub_type.trim());
        let is_token = |t: &str| {
            !t.is_empty()
                && t.bytes()
                    .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?=".contains(&b))
        };
        if !is_token(main_type) || !is_token(sub_type) {
            return Err(Error::InvalidContentType(s.to_string()));
        }

        let mut content_type = Self::new(main_type.to_lowercase(), sub_type.to_lowercase());
        for param in parts {
            if let Some((key, value)) = param.trim().split_once('=') {
                content_type = content_type
                    .with_parameter(key.trim().to_lowercase(), value.trim().trim_matches('"'));
            }
        }

        Ok(content_type)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;
        for (key, value) in &self.parameters {
            write!(f, "; {key}=\"{value}\"")?;
        }
        Ok(())
    }
}
