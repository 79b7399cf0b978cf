//! SMTP reply types.

/// SMTP reply from server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Reply message lines, code and separator stripped.
    pub message: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec is not const-compatible
    pub fn new(code: ReplyCode, message: Vec<String>) -> Self {
        Self { code, message }
    }

    /// Returns true if this is a success reply (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the full message as a single string.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.join("\n")
    }
}

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is an intermediate reply (3xx).
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Returns true for 4xx and 5xx codes, which poison the session.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        self.0 >= 400
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ReplyCode> for u16 {
    fn from(code: ReplyCode) -> Self {
        code.0
    }
}

// Reply codes the session reacts to
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCEEDED: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_codes() {
        assert!(ReplyCode::OK.is_success());
        assert!(ReplyCode::CLOSING.is_success());
        assert!(ReplyCode::START_DATA.is_intermediate());
        assert!(!ReplyCode::START_DATA.is_failure());
        assert!(ReplyCode::new(421).is_failure());
        assert!(ReplyCode::AUTH_FAILED.is_failure());
        assert!(!ReplyCode::new(0).is_success());
    }

    #[test]
    fn display_and_conversion() {
        assert_eq!(ReplyCode::OK.to_string(), "250");
        assert_eq!(u16::from(ReplyCode::AUTH_FAILED), 535);
    }

    #[test]
    fn message_text_joins_lines() {
        let reply = Reply::new(
            ReplyCode::OK,
            vec!["smtp.example.com".to_string(), "SIZE 1000".to_string()],
        );
        assert!(reply.is_success());
        assert_eq!(reply.message_text(), "smtp.example.com\nSIZE 1000");
    }
}
