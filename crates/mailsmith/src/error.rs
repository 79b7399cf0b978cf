//! Error types for composing and sending messages.

use mailsmith_smtp::SessionLog;
use thiserror::Error;

/// Errors that can occur while preparing or sending a message.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid account or send-mode configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMTP protocol or transport failure.
    #[error("SMTP error: {0}")]
    Smtp(#[from] mailsmith_smtp::Error),

    /// The server could not be reached or refused the credentials.
    #[error("Unable to login to SMTP server ({code}): {message}")]
    Authentication {
        /// Code of the refusing reply, 0 if the server was unreachable.
        code: u16,
        /// Reply text or connection diagnostic.
        message: String,
        /// Session log at the time of failure.
        log: SessionLog,
    },

    /// The message was already sent and cannot be sent again.
    #[error("Message was already sent")]
    AlreadySent,

    /// No recipient is set.
    #[error("No message recipients")]
    NoRecipients,

    /// Content could not be encoded.
    #[error("MIME error: {0}")]
    Mime(#[from] mailsmith_mime::Error),

    /// File system error (attachments, templates, stored copies).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the session log attached to this error, if any.
    #[must_use]
    pub fn log(&self) -> Option<&SessionLog> {
        match self {
            Self::Authentication { log, .. } => Some(log),
            Self::Smtp(e) => e.log(),
            _ => None,
        }
    }

    /// Returns the SMTP reply code attached to this error, if any.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Authentication { code, .. } => Some(*code),
            Self::Smtp(e) => e.code(),
            _ => None,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
