//! SMTP command builder.

use std::fmt;

use crate::types::AuthMechanism;

/// SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client hostname
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH - Begin authentication
    Auth {
        /// Authentication mechanism
        mechanism: AuthMechanism,
        /// Initial response (optional, for SASL-IR)
        initial_response: Option<String>,
    },
    /// Continuation line answering a 334 challenge
    AuthResponse(String),
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: String,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: String,
    },
    /// DATA - Begin message data
    Data,
    /// Message content written while in data mode; may span several lines
    Line(String),
    /// Lone `.` terminating the message content
    EndData,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Serializes the command to bytes.
    ///
    /// Content lines are normalized to CRLF and dot-stuffed.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Ehlo { hostname } => {
                buf.extend_from_slice(b"EHLO ");
                buf.extend_from_slice(hostname.as_bytes());
            }
            Self::StartTls => {
                buf.extend_from_slice(b"STARTTLS");
            }
            Self::Auth {
                mechanism,
                initial_response,
            } => {
                buf.extend_from_slice(b"AUTH ");
                buf.extend_from_slice(mechanism.as_str().as_bytes());
                if let Some(resp) = initial_response {
                    buf.push(b' ');
                    buf.extend_from_slice(resp.as_bytes());
                }
            }
            Self::AuthResponse(line) => {
                buf.extend_from_slice(line.as_bytes());
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:<");
                buf.extend_from_slice(from.as_bytes());
                buf.push(b'>');
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:<");
                buf.extend_from_slice(to.as_bytes());
                buf.push(b'>');
            }
            Self::Data => {
                buf.extend_from_slice(b"DATA");
            }
            Self::Line(content) => {
                let mut lines = content.split('\n').peekable();
                while let Some(line) = lines.next() {
                    let line = line.strip_suffix('\r').unwrap_or(line);
                    if line.starts_with('.') {
                        buf.push(b'.');
                    }
                    buf.extend_from_slice(line.as_bytes());
                    if lines.peek().is_some() {
                        buf.extend_from_slice(b"\r\n");
                    }
                }
            }
            Self::EndData => {
                buf.push(b'.');
            }
            Self::Quit => {
                buf.extend_from_slice(b"QUIT");
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns the leading keyword, e.g. `RCPT` for `RCPT TO:<..>`.
    #[must_use]
    pub fn keyword(&self) -> String {
        self.to_string()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Display form with credentials masked, for tracing output.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::AuthResponse(_) => "<redacted>".to_string(),
            Self::Auth {
                mechanism,
                initial_response: Some(_),
            } => format!("AUTH {} <redacted>", mechanism.as_str()),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo { hostname } => write!(f, "EHLO {hostname}"),
            Self::StartTls => write!(f, "STARTTLS"),
            Self::Auth {
                mechanism,
                initial_response: Some(resp),
            } => write!(f, "AUTH {} {resp}", mechanism.as_str()),
            Self::Auth { mechanism, .. } => write!(f, "AUTH {}", mechanism.as_str()),
            Self::AuthResponse(line) | Self::Line(line) => write!(f, "{line}"),
            Self::MailFrom { from } => write!(f, "MAIL FROM:<{from}>"),
            Self::RcptTo { to } => write!(f, "RCPT TO:<{to}>"),
            Self::Data => write!(f, "DATA"),
            Self::EndData => write!(f, "."),
            Self::Quit => write!(f, "QUIT"),
        }
    }
}
