//! Stateful SMTP session with a replayable command log.

use std::io;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::stream::{self, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::log::{LogEntry, SessionLog};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{AuthMechanism, Extension, ReplyCode};

/// Port on which the channel is encrypted from the first byte.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Response timeout applied when none is configured, in minutes.
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 5;

/// A single SMTP conversation with one server.
///
/// The socket is opened lazily by [`SmtpSession::connect`]. Every command
/// sent and every reply read is appended to the session log, including
/// commands issued while disconnected.
///
/// After any reply with a code of 400 or above the session is poisoned: the
/// next [`SmtpSession::send_command`] fails with [`Error::Protocol`].
#[derive(Debug)]
pub struct SmtpSession {
    host: String,
    port: u16,
    stream: Option<SmtpStream>,
    last_code: u16,
    last_reply: String,
    last_command: String,
    writing: bool,
    capabilities: Vec<String>,
    timeout_minutes: u64,
    log: SessionLog,
}

impl SmtpSession {
    /// Creates a disconnected session for `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            stream: None,
            last_code: 0,
            last_reply: String::new(),
            last_command: String::new(),
            writing: false,
            capabilities: Vec::new(),
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            log: SessionLog::new(),
        }
    }

    /// Opens the connection, reads the greeting and negotiates EHLO/STARTTLS.
    ///
    /// Does nothing when already connected. Port 465 tries implicit TLS first
    /// and falls back to plain TCP; every attempt is logged as `CONNECT`.
    ///
    /// Returns `Ok(false)` when the transport cannot be established, when an
    /// advertised STARTTLS is refused, or when the handshake fails. The
    /// socket is closed in each case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] when the greeting code is not 220.
    pub fn connect(&mut self) -> Result<bool> {
        if self.stream.is_some() {
            return Ok(true);
        }

        let Some(stream) = self.open() else {
            return Ok(false);
        };
        self.stream = Some(stream);

        match self.handshake() {
            Ok(true) => Ok(true),
            Ok(false) => {
                warn!(host = %self.host, code = self.last_code, "STARTTLS refused");
                self.log
                    .append("CONNECT", 0, format!("STARTTLS refused: {}", self.last_reply));
                self.disconnect();
                Ok(false)
            }
            Err(e @ Error::Protocol { .. }) => {
                self.disconnect();
                Err(e)
            }
            Err(e) => {
                warn!(host = %self.host, port = self.port, error = %e, "SMTP handshake failed");
                self.log.append("CONNECT", 0, format!("handshake failed: {e}"));
                self.disconnect();
                Ok(false)
            }
        }
    }

    fn disconnect(&mut self) {
        self.stream = None;
        self.writing = false;
        self.capabilities.clear();
    }

    fn open(&mut self) -> Option<SmtpStream> {
        let timeout = Duration::from_secs(self.timeout_minutes * 60);
        let address = format!("{}:{}", self.host, self.port);

        if self.port == IMPLICIT_TLS_PORT {
            match stream::connect_tls(&self.host, self.port, timeout) {
                Ok(stream) => {
                    info!(%address, "connected with implicit TLS");
                    self.log.append(format!("CONNECT tls://{address}"), 0, "connected");
                    return Some(stream);
                }
                Err(e) => {
                    warn!(%address, error = %e, "TLS connection failed, retrying in plain text");
                    self.log
                        .append(format!("CONNECT tls://{address}"), 0, format!("failed: {e}"));
                }
            }
        }

        match stream::connect(&self.host, self.port, timeout) {
            Ok(stream) => {
                info!(%address, "connected");
                self.log.append(format!("CONNECT tcp://{address}"), 0, "connected");
                Some(stream)
            }
            Err(e) => {
                warn!(%address, error = %e, "connection failed");
                self.log
                    .append(format!("CONNECT tcp://{address}"), 0, format!("failed: {e}"));
                None
            }
        }
    }

    /// Returns `Ok(false)` when the server advertised STARTTLS but refused it.
    fn handshake(&mut self) -> Result<bool> {
        self.read()?;
        self.log.append("GREETING", self.last_code, self.last_reply.clone());
        if self.last_code != ReplyCode::SERVICE_READY.as_u16() {
            return Err(Error::protocol(
                self.last_code,
                format!("unexpected greeting: {}", self.last_reply),
                &self.log,
            ));
        }

        self.ehlo()?;

        if !self.is_encrypted() && self.extensions().contains(&Extension::StartTls) {
            self.send_command(&Command::StartTls)?;
            if self.last_code != ReplyCode::SERVICE_READY.as_u16() {
                return Ok(false);
            }
            // Capabilities seen in plain text do not survive the upgrade.
            self.capabilities.clear();
            let plain = self.stream.take().ok_or_else(not_connected)?;
            self.stream = Some(plain.upgrade_to_tls(&self.host)?);
            info!(host = %self.host, "upgraded to TLS");
            self.ehlo()?;
        }

        Ok(true)
    }

    fn ehlo(&mut self) -> Result<()> {
        let lines = self.exchange(&Command::Ehlo {
            hostname: self.host.clone(),
        })?;
        self.capabilities = lines
            .iter()
            .skip(1)
            .map(|line| line.get(4..).unwrap_or_default().to_string())
            .collect();
        Ok(())
    }

    /// Sends a command and, unless in writing mode, reads its reply.
    ///
    /// `DATA` enters writing mode once its reply has been read; content lines
    /// are then written without waiting for a reply and logged with code 0.
    /// [`Command::EndData`] leaves writing mode and reads the final reply.
    /// The connection is closed after the reply to `QUIT`.
    ///
    /// Returns `Ok(false)` when not connected; the command is still logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the previous reply code was 400 or
    /// above, or an I/O error if the exchange fails.
    pub fn send_command(&mut self, command: &Command) -> Result<bool> {
        if ReplyCode::new(self.last_code).is_failure() {
            return Err(Error::protocol(
                self.last_code,
                format!(
                    "cannot send {} after failed reply: {}",
                    command.keyword(),
                    self.last_reply
                ),
                &self.log,
            ));
        }

        if self.stream.is_none() {
            debug!(command = %command.redacted(), "not connected, command not sent");
            self.log.append(command.to_string(), 0, "");
            return Ok(false);
        }

        self.exchange(command)?;
        Ok(true)
    }

    fn exchange(&mut self, command: &Command) -> Result<Vec<String>> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        debug!(command = %command.redacted(), "SMTP >>");
        stream.write_all(&command.serialize())?;

        if self.writing && matches!(command, Command::Line(_)) {
            self.log.append(command.to_string(), 0, "-");
            return Ok(Vec::new());
        }

        self.last_command = command.keyword();
        if matches!(command, Command::EndData) {
            self.writing = false;
        }

        let lines = self.read()?;
        debug!(code = self.last_code, reply = %self.last_reply, "SMTP <<");
        self.log
            .append(command.to_string(), self.last_code, self.last_reply.clone());

        match command {
            Command::Data if self.last_code == ReplyCode::START_DATA.as_u16() => {
                self.writing = true;
            }
            Command::Quit => {
                self.stream = None;
                info!(host = %self.host, "connection closed");
            }
            _ => {}
        }

        Ok(lines)
    }

    /// Reads reply lines until the final line of a (multi-line) reply.
    ///
    /// Updates the last reply code only when the first line starts with
    /// three digits.
    fn read(&mut self) -> Result<Vec<String>> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        let mut lines = Vec::new();
        while let Some(line) = stream.read_line()? {
            let last = is_last_reply_line(&line);
            lines.push(line);
            if last {
                break;
            }
        }

        if lines.is_empty() {
            self.stream = None;
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )));
        }

        if let Some(reply) = parse_reply(&lines) {
            self.last_code = reply.code.as_u16();
        }
        self.last_reply = lines.join("\n");
        Ok(lines)
    }

    /// Sets the connection and response timeout in minutes.
    ///
    /// Ignored when `minutes` is zero or the session is already connected.
    pub fn set_timeout(&mut self, minutes: u64) -> bool {
        if minutes < 1 || self.is_connected() {
            return false;
        }
        self.timeout_minutes = minutes;
        true
    }

    /// Server host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Raw capability lines from the latest EHLO reply.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Capabilities parsed into extensions.
    #[must_use]
    pub fn extensions(&self) -> Vec<Extension> {
        self.capabilities
            .iter()
            .map(|line| Extension::parse(line))
            .collect()
    }

    /// Authentication mechanisms advertised by the server.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions()
            .into_iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Code of the latest reply, 0 before the first one.
    #[must_use]
    pub const fn last_code(&self) -> u16 {
        self.last_code
    }

    /// Text of the latest reply, lines joined by `\n`.
    #[must_use]
    pub fn last_reply(&self) -> &str {
        &self.last_reply
    }

    /// Keyword of the latest command that expected a reply.
    #[must_use]
    pub fn last_command(&self) -> &str {
        &self.last_command
    }

    /// Timeout in minutes.
    #[must_use]
    pub const fn timeout(&self) -> u64 {
        self.timeout_minutes
    }

    /// Returns true while the socket is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns true if the channel is TLS-encrypted.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.stream.as_ref().is_some_and(SmtpStream::is_encrypted)
    }

    /// Returns true between `DATA` and the end-of-data terminator.
    #[must_use]
    pub const fn is_writing(&self) -> bool {
        self.writing
    }

    /// Full session log.
    #[must_use]
    pub const fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Most recent log entry.
    #[must_use]
    pub fn last_log_entry(&self) -> Option<&LogEntry> {
        self.log.last_entry()
    }
}

fn not_connected() -> Error {
    Error::Io(io::Error::new(io::ErrorKind::NotConnected, "not connected"))
}
