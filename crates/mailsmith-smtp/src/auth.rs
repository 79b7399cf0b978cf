//! SMTP authentication over an [`SmtpSession`].
//!
//! Supports `LOGIN` (username and password, one round trip each) and
//! `XOAUTH2` (`OAuth2` bearer token in a single initial response).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};

use crate::command::Command;
use crate::connection::SmtpSession;
use crate::error::Result;
use crate::types::{AuthMechanism, ReplyCode};

/// Credentials presented to the server.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `AUTH LOGIN` with username and password.
    Login {
        /// Login name.
        username: String,
        /// Password.
        password: String,
    },
    /// `AUTH XOAUTH2` with an `OAuth2` access token.
    XOAuth2 {
        /// Mailbox the token was issued for.
        user: String,
        /// Bearer access token.
        token: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::XOAuth2 { user, .. } => f
                .debug_struct("XOAuth2")
                .field("user", user)
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Result of an authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The server accepted the credentials with a 2xx reply.
    Accepted,
    /// The server answered with something other than the expected reply.
    Rejected {
        /// Reply code of the refusing reply.
        code: u16,
        /// Reply text of the refusing reply.
        message: String,
    },
    /// No connection could be established.
    Unreachable,
}

impl AuthOutcome {
    /// Returns true if the credentials were accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Generates the XOAUTH2 initial response.
///
/// Format: `user=<user>\x01auth=Bearer <token>\x01\x01` (base64 encoded)
#[must_use]
pub fn xoauth2_response(user: &str, token: &str) -> String {
    let auth_string = format!("user={user}\x01auth=Bearer {token}\x01\x01");
    STANDARD.encode(auth_string.as_bytes())
}

impl SmtpSession {
    /// Connects if needed and authenticates with `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting is refused, the session is already
    /// poisoned by a failed reply, or the exchange fails at the I/O level.
    pub fn authenticate(&mut self, credentials: &Credentials) -> Result<AuthOutcome> {
        if !self.connect()? {
            warn!(host = %self.host(), "cannot authenticate, server unreachable");
            return Ok(AuthOutcome::Unreachable);
        }

        let outcome = match credentials {
            Credentials::Login { username, password } => self.auth_login(username, password)?,
            Credentials::XOAuth2 { user, token } => self.auth_xoauth2(user, token)?,
        };

        match &outcome {
            AuthOutcome::Accepted => info!(host = %self.host(), "authenticated"),
            AuthOutcome::Rejected { code, .. } => {
                warn!(host = %self.host(), code, "authentication rejected");
            }
            AuthOutcome::Unreachable => warn!(host = %self.host(), "connection lost during authentication"),
        }
        Ok(outcome)
    }

    fn auth_login(&mut self, username: &str, password: &str) -> Result<AuthOutcome> {
        let steps = [
            Command::Auth {
                mechanism: AuthMechanism::Login,
                initial_response: None,
            },
            Command::AuthResponse(STANDARD.encode(username)),
        ];
        for step in &steps {
            if !self.send_command(step)? {
                return Ok(AuthOutcome::Unreachable);
            }
            if self.last_code() != ReplyCode::AUTH_CONTINUE.as_u16() {
                return Ok(self.rejected());
            }
        }

        if !self.send_command(&Command::AuthResponse(STANDARD.encode(password)))? {
            return Ok(AuthOutcome::Unreachable);
        }
        Ok(self.final_outcome())
    }

    fn auth_xoauth2(&mut self, user: &str, token: &str) -> Result<AuthOutcome> {
        let command = Command::Auth {
            mechanism: AuthMechanism::XOAuth2,
            initial_response: Some(xoauth2_response(user, token)),
        };
        if !self.send_command(&command)? {
            return Ok(AuthOutcome::Unreachable);
        }

        // A 334 carries a base64 JSON error; an empty line makes the server
        // send its final reply.
        if self.last_code() == ReplyCode::AUTH_CONTINUE.as_u16()
            && !self.send_command(&Command::AuthResponse(String::new()))?
        {
            return Ok(AuthOutcome::Unreachable);
        }
        Ok(self.final_outcome())
    }

    fn final_outcome(&self) -> AuthOutcome {
        if ReplyCode::new(self.last_code()).is_success() {
            AuthOutcome::Accepted
        } else {
            self.rejected()
        }
    }

    fn rejected(&self) -> AuthOutcome {
        AuthOutcome::Rejected {
            code: self.last_code(),
            message: self.last_reply().to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn xoauth2_response_format() {
        let response = xoauth2_response("user@example.com", "token123");
        let decoded = String::from_utf8(STANDARD.decode(response).unwrap()).unwrap();
        assert_eq!(
            decoded,
            "user=user@example.com\x01auth=Bearer token123\x01\x01"
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::Login {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));

        let creds = Credentials::XOAuth2 {
            user: "alice".to_string(),
            token: "ya29.secret".to_string(),
        };
        assert!(!format!("{creds:?}").contains("ya29"));
    }

    #[test]
    fn unreachable_server_yields_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut session = SmtpSession::new("127.0.0.1", port);
        let outcome = session
            .authenticate(&Credentials::Login {
                username: "u".to_string(),
                password: "p".to_string(),
            })
            .unwrap();
        assert_eq!(outcome, AuthOutcome::Unreachable);
        assert!(!outcome.is_accepted());
        assert!(session.log().iter().any(|e| e.command.starts_with("CONNECT")));
    }
}
