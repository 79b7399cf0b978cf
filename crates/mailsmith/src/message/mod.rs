//! HTML email message and its send pipeline.

mod headers_table;
mod priority;
mod recipients;
mod send;

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::path::Path;

use mailsmith_smtp::{LogEntry, SmtpSession};

pub use headers_table::{DIVIDER, HeadersTable};
pub use priority::Priority;
pub use recipients::{Recipient, RecipientKind, RecipientList, Recipients};
pub use send::SendState;

use crate::account::Account;
use crate::attachment::Attachment;
use crate::callbacks::CallbackPool;
use crate::document::Document;
use crate::error::Result;
use crate::mode::{ModeConfig, SendMode};
use crate::text::trim_control_chars;

/// Subject used until one is set.
pub const DEFAULT_SUBJECT: &str = "Hello Email Message";

/// An HTML email message.
///
/// A message is single-use: once [`send`](Self::send) has started
/// transmitting, every further call fails with
/// [`Error::AlreadySent`](crate::Error::AlreadySent).
#[derive(Debug)]
pub struct Message {
    subject: String,
    priority: Priority,
    recipients: Recipients,
    attachments: Vec<Attachment>,
    document: Document,
    mode: SendMode,
    mode_config: ModeConfig,
    sent: bool,
    // Set once the test-mode header table is in the document; retries after
    // a failed connect must not add it again.
    headers_table_added: bool,
    state: SendState,
    account: Option<Account>,
    session: Option<SmtpSession>,
    before_send: CallbackPool<Self>,
    after_send: CallbackPool<Self>,
}

impl Message {
    /// Creates an empty message with no account bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            priority: Priority::Normal,
            recipients: Recipients::default(),
            attachments: Vec::new(),
            document: Document::new(DEFAULT_SUBJECT),
            mode: SendMode::Prod,
            mode_config: ModeConfig::new(),
            sent: false,
            headers_table_added: false,
            state: SendState::New,
            account: None,
            session: None,
            before_send: CallbackPool::new(),
            after_send: CallbackPool::new(),
        }
    }

    /// Creates a message sent through `account`.
    #[must_use]
    pub fn with_account(account: Account) -> Self {
        let mut message = Self::new();
        message.set_account(account);
        message
    }

    /// Binds an account, replacing the session with a fresh one for its
    /// server.
    pub fn set_account(&mut self, account: Account) -> &mut Self {
        self.session = Some(account.session());
        self.account = Some(account);
        self
    }

    /// Bound account.
    #[must_use]
    pub const fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Sets the subject and document title. Control characters are trimmed;
    /// a subject that ends up empty is ignored.
    pub fn set_subject(&mut self, subject: &str) -> &mut Self {
        let subject = trim_control_chars(subject);
        if !subject.is_empty() {
            self.document.set_title(subject.clone());
            self.subject = subject;
        }
        self
    }

    /// Priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Sets the priority from a level, clamped to -1..=1.
    pub fn set_priority(&mut self, level: i32) -> &mut Self {
        self.priority = Priority::from_level(level);
        self
    }

    /// Adds a `To` recipient. Returns false if the address is empty once
    /// sanitized.
    pub fn add_to(&mut self, address: &str, name: Option<&str>) -> bool {
        self.add_address(RecipientKind::To, address, name)
    }

    /// Adds a `CC` recipient.
    pub fn add_cc(&mut self, address: &str, name: Option<&str>) -> bool {
        self.add_address(RecipientKind::Cc, address, name)
    }

    /// Adds a `BCC` recipient.
    pub fn add_bcc(&mut self, address: &str, name: Option<&str>) -> bool {
        self.add_address(RecipientKind::Bcc, address, name)
    }

    /// Adds a recipient of the given class.
    pub fn add_address(&mut self, kind: RecipientKind, address: &str, name: Option<&str>) -> bool {
        self.recipients.get_mut(kind).add(address, name)
    }

    /// Adds several `(address, name)` pairs; returns how many were accepted.
    pub fn add_recipients<'a, I>(&mut self, kind: RecipientKind, recipients: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut added = 0;
        for (address, name) in recipients {
            if self.add_address(kind, address, name) {
                added += 1;
            }
        }
        added
    }

    /// All recipient classes.
    #[must_use]
    pub const fn recipients(&self) -> &Recipients {
        &self.recipients
    }

    /// `To` recipients.
    #[must_use]
    pub const fn to(&self) -> &RecipientList {
        self.recipients.get(RecipientKind::To)
    }

    /// `CC` recipients.
    #[must_use]
    pub const fn cc(&self) -> &RecipientList {
        self.recipients.get(RecipientKind::Cc)
    }

    /// `BCC` recipients.
    #[must_use]
    pub const fn bcc(&self) -> &RecipientList {
        self.recipients.get(RecipientKind::Bcc)
    }

    /// Encoded header value of a recipient class.
    #[must_use]
    pub fn recipients_header(&self, kind: RecipientKind) -> String {
        self.recipients.get(kind).header_value()
    }

    /// Number of recipients across classes.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.recipients.len()
    }

    /// Attaches a file or in-memory content. Returns false, ignoring it, if
    /// the content does not exist.
    pub fn add_attachment(&mut self, attachment: impl Into<Attachment>) -> bool {
        let attachment = attachment.into();
        if !attachment.exists() {
            return false;
        }
        self.attachments.push(attachment);
        true
    }

    /// Attachments in insertion order.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Appends markup to the body.
    pub fn insert(&mut self, html: impl Into<String>) -> &mut Self {
        self.document.insert(html);
        self
    }

    /// Appends a filled-in HTML template to the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be read.
    pub fn insert_template<K, V, S>(
        &mut self,
        path: impl AsRef<Path>,
        params: &HashMap<K, V, S>,
    ) -> Result<&mut Self>
    where
        K: Borrow<str> + Hash + Eq,
        V: AsRef<str>,
        S: BuildHasher,
    {
        self.document.insert_template(path, params)?;
        Ok(self)
    }

    /// Sets the document language; only two-letter codes are accepted.
    pub fn set_lang(&mut self, lang: &str) -> bool {
        self.document.set_lang(lang)
    }

    /// Body document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Body document, mutably.
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Renders the full HTML document as stored or previewed.
    #[must_use]
    pub fn render(&self) -> String {
        self.document.render()
    }

    /// Send mode.
    #[must_use]
    pub const fn mode(&self) -> SendMode {
        self.mode
    }

    /// Configuration of the send mode.
    #[must_use]
    pub const fn mode_config(&self) -> &ModeConfig {
        &self.mode_config
    }

    /// Selects how [`send`](Self::send) delivers the message. Returns false
    /// once the message was sent.
    pub fn set_mode(&mut self, mode: SendMode, config: ModeConfig) -> bool {
        if self.sent {
            return false;
        }
        self.mode = mode;
        self.mode_config = config;
        true
    }

    /// Registers a callback run before sending.
    pub fn add_before_send(&mut self, callback: impl FnMut(&mut Self) + Send + 'static) -> &mut Self {
        self.before_send.push(callback);
        self
    }

    /// Registers a callback run after sending.
    pub fn add_after_send(&mut self, callback: impl FnMut(&mut Self) + Send + 'static) -> &mut Self {
        self.after_send.push(callback);
        self
    }

    /// Runs the before-send callbacks that have not run yet.
    pub fn invoke_before_send(&mut self) {
        let mut pool = std::mem::take(&mut self.before_send);
        pool.run(self);
        let added = std::mem::replace(&mut self.before_send, pool);
        self.before_send.append(added);
    }

    /// Runs the after-send callbacks that have not run yet.
    pub fn invoke_after_send(&mut self) {
        let mut pool = std::mem::take(&mut self.after_send);
        pool.run(self);
        let added = std::mem::replace(&mut self.after_send, pool);
        self.after_send.append(added);
    }

    /// Marks every callback as not run.
    pub fn reset_callbacks(&mut self) {
        self.before_send.reset();
        self.after_send.reset();
    }

    /// Returns true once the message was sent or stored.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        self.sent
    }

    /// Current send pipeline state.
    #[must_use]
    pub const fn state(&self) -> SendState {
        self.state
    }

    /// SMTP session, present once an account is bound.
    #[must_use]
    pub const fn session(&self) -> Option<&SmtpSession> {
        self.session.as_ref()
    }

    /// SMTP session, mutably.
    pub const fn session_mut(&mut self) -> Option<&mut SmtpSession> {
        self.session.as_mut()
    }

    /// Session log, oldest first; empty without an account.
    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        match &self.session {
            Some(session) => session.log().all(),
            None => &[],
        }
    }

    /// Most recent session log entry.
    #[must_use]
    pub fn last_log_entry(&self) -> Option<&LogEntry> {
        self.log().last()
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}
