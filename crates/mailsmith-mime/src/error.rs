//! Error types for MIME operations.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Header name or value that cannot be written safely.
    #[error("Invalid MIME header: {0}")]
    InvalidHeader(String),

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),
}
