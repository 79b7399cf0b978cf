//! Send pipeline: validation, test-mode handling, authentication and
//! transmission.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Local;
use mailsmith_mime::encoding::encoded_word;
use mailsmith_mime::{ContentType, MimeMessage, Part, TransferEncoding, format_date};
use mailsmith_smtp::{AuthOutcome, Command, SmtpSession};
use tracing::{debug, info, warn};

use super::{DIVIDER, HeadersTable, Message, RecipientKind};
use crate::account::Account;
use crate::error::{Error, Result};
use crate::mode::SendMode;
use crate::text::trim_control_chars;

/// Characters removed from the subject to name the store folder.
const FORBIDDEN_PATH_CHARS: &[char] = &[':', '?', '\\', '/', '*', '<', '>', '|', '"'];

/// Progress of [`Message::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SendState {
    /// Not sent yet.
    #[default]
    New,
    /// Checking preconditions and running before-send callbacks.
    Validating,
    /// Applying a test mode.
    ModeRedirecting,
    /// Opening the SMTP connection.
    Connecting,
    /// Presenting credentials.
    Authenticating,
    /// Writing the envelope and content.
    Transmitting,
    /// Running after-send callbacks.
    Finalizing,
    /// Delivered or stored.
    Sent,
    /// Aborted by an error.
    Failed,
}

impl SendState {
    /// Returns true for [`Sent`](Self::Sent) and [`Failed`](Self::Failed).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }

    /// Lowercase state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Validating => "validating",
            Self::ModeRedirecting => "mode-redirecting",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Transmitting => "transmitting",
            Self::Finalizing => "finalizing",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Message {
    /// Sends the message according to its [`SendMode`].
    ///
    /// Before-send callbacks run first. In [`SendMode::TestStore`] the
    /// rendered document is written to
    /// `<store-path>/<subject>/<YYYY-MM-DD HH-MM-SS>.html` and nothing is
    /// transmitted. In [`SendMode::TestSend`] a table of the original headers
    /// is prepended to the body and every recipient is replaced by the
    /// configured `send-addresses`. After-send callbacks run once the message
    /// is delivered or stored.
    ///
    /// The message counts as sent as soon as transmission starts, so a
    /// message that failed mid-transmission cannot be sent again.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadySent`] on a second call, without any I/O
    /// - [`Error::Config`] for a missing or invalid mode configuration, or
    ///   when no account is bound
    /// - [`Error::NoRecipients`] when no recipient remains
    /// - [`Error::Authentication`] when the server is unreachable or refuses
    ///   the credentials
    /// - [`Error::Smtp`] when the server answers a command with 4xx/5xx or
    ///   the connection breaks
    /// - [`Error::Io`] or [`Error::Mime`] when content cannot be read or
    ///   encoded
    pub fn send(&mut self) -> Result<()> {
        if self.sent {
            return Err(Error::AlreadySent);
        }

        let result = self.run_send();
        if let Err(e) = &result {
            warn!(subject = %self.subject, error = %e, "send failed");
            self.transition(SendState::Failed);
        }
        result
    }

    fn run_send(&mut self) -> Result<()> {
        self.transition(SendState::Validating);
        self.invoke_before_send();

        match self.mode {
            SendMode::TestStore => return self.store(),
            SendMode::TestSend => self.redirect()?,
            SendMode::Prod => {}
        }

        if self.recipients.is_empty() {
            return Err(Error::NoRecipients);
        }
        let account = self
            .account
            .clone()
            .ok_or_else(|| Error::Config("no account is bound to the message".to_string()))?;
        let commands = self.commands(&account)?;

        self.transition(SendState::Connecting);
        let connected = session_for(&mut self.session, &account).connect()?;

        self.transition(SendState::Authenticating);
        let session = session_for(&mut self.session, &account);
        let outcome = if connected {
            session.authenticate(&account.credentials())?
        } else {
            AuthOutcome::Unreachable
        };
        match outcome {
            AuthOutcome::Accepted => {}
            AuthOutcome::Rejected { code, message } => {
                return Err(Error::Authentication {
                    code,
                    message,
                    log: session.log().clone(),
                });
            }
            AuthOutcome::Unreachable => {
                return Err(Error::Authentication {
                    code: 0,
                    message: format!("unable to connect to {}:{}", account.host, account.port),
                    log: session.log().clone(),
                });
            }
        }

        self.transition(SendState::Transmitting);
        self.sent = true;
        let session = session_for(&mut self.session, &account);
        for command in &commands {
            if !session.send_command(command)? {
                return Err(mailsmith_smtp::Error::Io(io::ErrorKind::NotConnected.into()).into());
            }
        }
        info!(
            subject = %self.subject,
            recipients = self.recipients.len(),
            attachments = self.attachments.len(),
            "message sent"
        );

        self.transition(SendState::Finalizing);
        self.invoke_after_send();
        self.transition(SendState::Sent);
        Ok(())
    }

    /// Writes the rendered document below the configured store path.
    fn store(&mut self) -> Result<()> {
        let root = self.mode_config.store_path()?;

        self.transition(SendState::ModeRedirecting);
        self.prepend_headers_table();

        self.transition(SendState::Finalizing);
        self.invoke_after_send();

        let path = store_file_path(&root, &self.subject);
        if let Some(folder) = path.parent() {
            fs::create_dir_all(folder)?;
        }
        fs::write(&path, self.render())?;
        info!(path = %path.display(), "message stored");

        self.sent = true;
        self.transition(SendState::Sent);
        Ok(())
    }

    /// Replaces every recipient with the configured test addresses.
    fn redirect(&mut self) -> Result<()> {
        let addresses = self.mode_config.send_addresses()?;

        self.transition(SendState::ModeRedirecting);
        self.prepend_headers_table();
        self.recipients.clear();
        for address in &addresses {
            if !self.add_to(address, None) {
                debug!(%address, "ignoring unusable test address");
            }
        }
        info!(count = self.recipients.len(), "recipients redirected to test addresses");
        Ok(())
    }

    fn prepend_headers_table(&mut self) {
        if self.headers_table_added {
            debug!("headers table already present");
            return;
        }
        self.headers_table_added = true;
        let table = self.headers_table().render();
        self.document.prepend(DIVIDER);
        self.document.prepend(table);
    }

    /// Table of the headers as they would be sent to the original
    /// recipients.
    #[must_use]
    pub fn headers_table(&self) -> HeadersTable {
        let mut table = HeadersTable::new();
        table.add_header("Importance", self.priority.importance());
        let from = self.account.as_ref().map_or_else(
            || " <NOT SPECIFIED>".to_string(),
            |account| format!("{} <{}>", account.sender_name, account.sender_address),
        );
        table.add_header("From", from);
        for kind in RecipientKind::ALL {
            table.add_header(kind.header_name(), self.recipients.get(kind).display_value());
        }
        table.add_header(
            "Date",
            Local::now().format("%a, %d %b %Y %H:%M:%S %z (%Z)").to_string(),
        );
        table.add_header("Subject", self.subject.clone());
        let names: Vec<String> = self
            .attachments
            .iter()
            .map(|a| a.name().into_owned())
            .collect();
        table.add_header("Attachments", names.join(" "));
        table
    }

    /// Composes the MIME message transmitted after `DATA`.
    ///
    /// # Errors
    ///
    /// Returns an error if an attachment cannot be read or a header value
    /// contains a line break.
    pub fn compose(&self, account: &Account) -> Result<MimeMessage> {
        let mut mime = MimeMessage::new();
        let headers = mime.headers_mut();
        headers.add("Priority", self.priority.header_value())?;
        headers.add(
            "Content-Transfer-Encoding",
            TransferEncoding::SevenBit.to_string(),
        )?;
        headers.add("Importance", self.priority.importance())?;
        headers.add(
            "From",
            format!(
                "{} <{}>",
                encoded_word(&account.sender_name),
                account.sender_address
            ),
        )?;
        for kind in RecipientKind::ALL {
            let list = self.recipients.get(kind);
            if !list.is_empty() {
                headers.add(kind.header_name(), list.header_value())?;
            }
        }
        headers.add("Date", format_date(&Local::now()))?;
        headers.add("Subject", encoded_word(&self.subject))?;

        mime.push(Part::html(&trim_control_chars(&self.render()))?);
        for attachment in &self.attachments {
            let data = attachment.bytes_content()?;
            let content_type = ContentType::parse(attachment.mime_type())?;
            mime.push(Part::attachment(&attachment.name(), &content_type, &data)?);
        }
        Ok(mime)
    }

    /// Full command sequence: envelope, content and `QUIT`.
    fn commands(&self, account: &Account) -> Result<Vec<Command>> {
        let mime = self.compose(account)?;

        let mut commands = vec![Command::MailFrom {
            from: account.sender_address.clone(),
        }];
        commands.extend(self.recipients.envelope().map(|to| Command::RcptTo {
            to: to.to_string(),
        }));
        commands.push(Command::Data);
        commands.extend(mime.blocks().into_iter().map(Command::Line));
        commands.push(Command::EndData);
        commands.push(Command::Quit);
        Ok(commands)
    }

    fn transition(&mut self, state: SendState) {
        debug!(from = %self.state, to = %state, "send state");
        self.state = state;
    }
}

fn session_for<'a>(session: &'a mut Option<SmtpSession>, account: &Account) -> &'a mut SmtpSession {
    session.get_or_insert_with(|| account.session())
}

/// `<root>/<subject without path characters>/<YYYY-MM-DD HH-MM-SS>.html`
fn store_file_path(root: &std::path::Path, subject: &str) -> PathBuf {
    let folder: String = subject
        .chars()
        .filter(|c| !FORBIDDEN_PATH_CHARS.contains(c))
        .collect();
    let folder = folder.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let file = format!("{}.html", Local::now().format("%Y-%m-%d %H-%M-%S"));
    root.join(folder).join(file)
}
