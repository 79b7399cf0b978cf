//! Multipart message composition.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::content_type::ContentType;
use crate::encoding::{encode_base64_lines, encode_quoted_printable, encode_rfc2047};
use crate::error::Result;
use crate::header::Headers;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
        }
    }
}

/// Generates a multipart boundary unique to this process.
///
/// The boundary starts with `=_`, a sequence that neither Base64 nor
/// Quoted-Printable output can produce.
#[must_use]
pub fn generate_boundary() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let mut hasher = Sha256::new();
    hasher.update(nanos.to_le_bytes());
    hasher.update(COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());

    let hex: String = hasher
        .finalize()
        .iter()
        .take(16)
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("=_{hex}")
}

/// One body part of a multipart message, already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Encoded body with CRLF line breaks.
    pub body: String,
}

impl Part {
    /// Creates a part from headers and an encoded body.
    #[must_use]
    pub const fn new(headers: Headers, body: String) -> Self {
        Self { headers, body }
    }

    /// Creates a quoted-printable `text/html` part.
    ///
    /// # Errors
    ///
    /// Never fails for the fixed headers used here; the signature follows
    /// [`Headers::add`].
    pub fn html(html: &str) -> Result<Self> {
        let mut headers = Headers::new();
        headers.add("Content-Type", ContentType::text_html().to_string())?;
        headers.add(
            "Content-Transfer-Encoding",
            TransferEncoding::QuotedPrintable.to_string(),
        )?;
        Ok(Self::new(headers, encode_quoted_printable(html)))
    }

    /// Creates a base64 attachment part.
    ///
    /// Non-ASCII file names are RFC 2047 encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the name contains a line break.
    pub fn attachment(name: &str, content_type: &ContentType, data: &[u8]) -> Result<Self> {
        let name = encode_rfc2047(name, "UTF-8").replace('"', "");
        let mut headers = Headers::new();
        headers.add(
            "Content-Type",
            content_type.clone().with_parameter("name", &name).to_string(),
        )?;
        headers.add(
            "Content-Transfer-Encoding",
            TransferEncoding::Base64.to_string(),
        )?;
        headers.add(
            "Content-Disposition",
            format!("attachment; filename=\"{name}\""),
        )?;
        Ok(Self::new(headers, encode_base64_lines(data)))
    }
}

/// A `multipart/mixed` message ready to be written line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeMessage {
    headers: Headers,
    boundary: String,
    parts: Vec<Part>,
}

impl MimeMessage {
    /// Creates an empty message with a fresh boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Creates an empty message with the given boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            headers: Headers::new(),
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Top-level headers, written in insertion order before `MIME-Version`.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the top-level headers.
    pub const fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Multipart boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Appends a body part.
    pub fn push(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// Body parts in order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Renders the message as the blocks written after `DATA`.
    ///
    /// Each header is its own block; part bodies are single blocks that may
    /// span several CRLF-separated lines. The closing boundary is always
    /// present, even without parts.
    #[must_use]
    pub fn blocks(&self) -> Vec<String> {
        let mut blocks = self.headers.lines();
        blocks.push("MIME-Version: 1.0".to_string());
        blocks.push(format!(
            "Content-Type: {}",
            ContentType::multipart_mixed(&self.boundary)
        ));
        blocks.push(String::new());

        for part in &self.parts {
            blocks.push(format!("--{}", self.boundary));
            blocks.extend(part.headers.lines());
            blocks.push(String::new());
            blocks.push(part.body.clone());
        }

        blocks.push(format!("--{}--", self.boundary));
        blocks
    }
}

impl Default for MimeMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MimeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.blocks().join("\r\n"))
    }
}
