//! # mailsmith
//!
//! HTML email messages sent over a logged SMTP session.
//!
//! This crate provides:
//! - Account configuration (serde, kebab-case keys)
//! - Message building: subject, priority, recipients, attachments, HTML body
//! - A send pipeline with production, redirect-to-test-addresses and
//!   store-to-disk modes
//! - Before/after-send callbacks
//! - Errors carrying a snapshot of the SMTP session log
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailsmith::{Account, AccountOptions, Message};
//!
//! fn main() -> mailsmith::Result<()> {
//!     let account = Account::new(AccountOptions {
//!         server_address: "smtp.example.com".into(),
//!         port: 587,
//!         user: "bot@example.com".into(),
//!         pass: "secret".into(),
//!         sender_name: "Example Bot".into(),
//!         sender_address: "bot@example.com".into(),
//!         ..AccountOptions::default()
//!     });
//!
//!     let mut message = Message::with_account(account);
//!     message.set_subject("Weekly report").insert("<h1>Hello</h1>");
//!     message.add_to("team@example.com", Some("Team"));
//!     message.send()?;
//!
//!     for entry in message.log() {
//!         println!("{} {} {}", entry.command, entry.code, entry.message);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod attachment;
pub mod callbacks;
pub mod document;
mod error;
pub mod message;
pub mod mode;
pub mod text;

pub use account::{Account, AccountOptions};
pub use attachment::Attachment;
pub use document::Document;
pub use error::{Error, Result};
pub use mailsmith_smtp::{LogEntry, SessionLog, SmtpSession};
pub use message::{Message, Priority, RecipientKind, SendState};
pub use mode::{ConfigValue, ModeConfig, SendMode};
