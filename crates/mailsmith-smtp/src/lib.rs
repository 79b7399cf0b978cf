//! # mailsmith-smtp
//!
//! A blocking SMTP client session (RFC 5321) that records every exchanged
//! line in a replayable [`SessionLog`].
//!
//! ## Features
//!
//! - **Lazy connection**: implicit TLS on port 465 with plain-text fallback,
//!   opportunistic STARTTLS on every other port
//! - **Logged exchanges**: each command and reply becomes a [`LogEntry`];
//!   errors carry a snapshot of the log
//! - **Poisoned sessions**: a 4xx/5xx reply makes the next command fail
//! - **Authentication**: LOGIN and XOAUTH2
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailsmith_smtp::{Command, Credentials, SmtpSession};
//!
//! fn main() -> mailsmith_smtp::Result<()> {
//!     let mut session = SmtpSession::new("smtp.example.com", 587);
//!
//!     let outcome = session.authenticate(&Credentials::Login {
//!         username: "user@example.com".into(),
//!         password: "password".into(),
//!     })?;
//!     assert!(outcome.is_accepted());
//!
//!     session.send_command(&Command::MailFrom { from: "user@example.com".into() })?;
//!     session.send_command(&Command::RcptTo { to: "friend@example.com".into() })?;
//!     session.send_command(&Command::Data)?;
//!     session.send_command(&Command::Line("Subject: Hi\r\n\r\nHello!".into()))?;
//!     session.send_command(&Command::EndData)?;
//!     session.send_command(&Command::Quit)?;
//!
//!     for entry in session.log() {
//!         println!("{} -> {} {}", entry.command, entry.code, entry.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`auth`]: LOGIN and XOAUTH2 negotiation
//! - [`command`]: SMTP command serialization
//! - [`connection`]: Byte stream and logged session
//! - [`log`]: Session log entries
//! - [`parser`]: Reply parser
//! - [`types`]: Reply codes and EHLO extensions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod command;
pub mod connection;
mod error;
pub mod log;
pub mod parser;
pub mod types;

pub use auth::{AuthOutcome, Credentials};
pub use command::Command;
pub use connection::{IMPLICIT_TLS_PORT, SmtpSession};
pub use error::{Error, Result};
pub use log::{LogEntry, SessionLog};
pub use types::{AuthMechanism, Extension, Reply, ReplyCode};
