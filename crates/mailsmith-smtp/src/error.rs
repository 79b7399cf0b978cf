//! Error types for SMTP operations.

use std::io;

use crate::log::SessionLog;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// The host name cannot be used for TLS server name verification.
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    /// The server answered with a failure reply, or greeted with a code other than 220.
    #[error("SMTP error {code}: {message}")]
    Protocol {
        /// Reply code (e.g., 550).
        code: u16,
        /// Explanation, including the server text.
        message: String,
        /// Snapshot of the session log at the time of failure.
        log: SessionLog,
    },
}

impl Error {
    /// Creates a protocol error carrying a snapshot of `log`.
    #[must_use]
    pub fn protocol(code: u16, message: impl Into<String>, log: &SessionLog) -> Self {
        Self::Protocol {
            code,
            message: message.into(),
            log: log.clone(),
        }
    }

    /// Returns the reply code for protocol errors.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the attached session log, if any.
    #[must_use]
    pub const fn log(&self) -> Option<&SessionLog> {
        match self {
            Self::Protocol { log, .. } => Some(log),
            _ => None,
        }
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if *code >= 500 && *code < 600)
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if *code >= 400 && *code < 500)
    }
}
