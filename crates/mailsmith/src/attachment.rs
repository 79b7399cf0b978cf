//! File attachments.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

/// Default MIME type for unknown extensions.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    ("7z", "application/x-7z-compressed"),
    ("bmp", "image/bmp"),
    ("csv", "text/csv"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("eml", "message/rfc822"),
    ("gif", "image/gif"),
    ("gz", "application/gzip"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ics", "text/calendar"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("json", "application/json"),
    ("md", "text/markdown"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("svg", "image/svg+xml"),
    ("tar", "application/x-tar"),
    ("txt", "text/plain"),
    ("wav", "audio/wav"),
    ("webp", "image/webp"),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("xml", "application/xml"),
    ("zip", "application/zip"),
];

/// Guesses a MIME type from a file name's extension.
#[must_use]
pub fn mime_type_for(name: &str) -> &'static str {
    let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MIME_TYPE;
    };
    let ext = ext.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map_or(DEFAULT_MIME_TYPE, |(_, mime)| mime)
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// File read from disk at send time.
    Path(PathBuf),
    /// In-memory content.
    Bytes {
        /// File name shown to the recipient.
        name: String,
        /// MIME type.
        mime_type: String,
        /// Content.
        data: Vec<u8>,
    },
}

impl Attachment {
    /// Attachment read from `path`.
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// In-memory attachment; the MIME type is guessed from `name`.
    #[must_use]
    pub fn bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        Self::Bytes {
            mime_type: mime_type_for(&name).to_string(),
            name,
            data: data.into(),
        }
    }

    /// Returns true if the content is available: a regular file for paths,
    /// always for in-memory content.
    #[must_use]
    pub fn exists(&self) -> bool {
        match self {
            Self::Path(path) => path.is_file(),
            Self::Bytes { .. } => true,
        }
    }

    /// File name shown to the recipient.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Path(path) => path
                .file_name()
                .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy()),
            Self::Bytes { name, .. } => Cow::Borrowed(name),
        }
    }

    /// MIME type of the content.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Path(_) => mime_type_for(&self.name()),
            Self::Bytes { mime_type, .. } => mime_type,
        }
    }

    /// Reads the content.
    ///
    /// # Errors
    ///
    /// Returns an error if a path attachment cannot be read.
    pub fn bytes_content(&self) -> io::Result<Cow<'_, [u8]>> {
        match self {
            Self::Path(path) => std::fs::read(path).map(Cow::Owned),
            Self::Bytes { data, .. } => Ok(Cow::Borrowed(data)),
        }
    }
}

impl From<PathBuf> for Attachment {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Attachment {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for Attachment {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}
