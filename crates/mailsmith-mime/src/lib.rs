//! # mailsmith-mime
//!
//! Composition of `multipart/mixed` email messages with an HTML body and
//! attachments.
//!
//! ## Features
//!
//! - **Ordered headers**: written exactly in insertion order, line breaks in
//!   values rejected
//! - **Encodings**: Base64 wrapped at 76 columns, Quoted-Printable, RFC 2047
//!   encoded words
//! - **Multipart rendering**: one block per header, boundary lines and parts,
//!   ready to stream after SMTP `DATA`
//!
//! ## Quick Start
//!
//! ```
//! use mailsmith_mime::{ContentType, MimeMessage, Part};
//! use mailsmith_mime::encoding::encoded_word;
//!
//! # fn main() -> mailsmith_mime::Result<()> {
//! let mut message = MimeMessage::new();
//! message.headers_mut().add("Subject", encoded_word("Quarterly report"))?;
//! message.push(Part::html("<h1>Hello</h1>")?);
//! message.push(Part::attachment(
//!     "report.csv",
//!     &ContentType::parse("text/csv")?,
//!     b"a,b\n1,2\n",
//! )?);
//!
//! let blocks = message.blocks();
//! assert_eq!(blocks.last(), Some(&format!("--{}--", message.boundary())));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::{Headers, format_date};
pub use message::{MimeMessage, Part, TransferEncoding, generate_boundary};
