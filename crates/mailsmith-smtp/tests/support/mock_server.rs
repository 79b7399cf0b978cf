//! Scripted in-process SMTP server for integration tests.
#![allow(dead_code)] // Not every test binary uses every knob
//!
//! The server listens on `127.0.0.1` with an OS-assigned port, answers each
//! command from its configuration and records what it received. It has no
//! TLS of its own: after accepting `STARTTLS` with 220 it closes the socket,
//! so the client's TLS handshake fails.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Canned reply for one command.
#[derive(Debug, Clone)]
pub struct SmtpResponse {
    /// Reply code.
    pub code: u16,
    /// Reply text.
    pub message: String,
}

impl SmtpResponse {
    /// Creates a reply.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        format!("{} {}\r\n", self.code, self.message).into_bytes()
    }
}

#[derive(Debug, Clone)]
struct MockServerConfig {
    greeting: SmtpResponse,
    capabilities: Vec<String>,
    auth_responses: Vec<SmtpResponse>,
    starttls_response: Option<SmtpResponse>,
    mail_from_response: SmtpResponse,
    rcpt_to_response: SmtpResponse,
    data_response: SmtpResponse,
    data_end_response: SmtpResponse,
    quit_response: SmtpResponse,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            greeting: SmtpResponse::new(220, "mock.local ESMTP ready"),
            capabilities: vec!["AUTH LOGIN XOAUTH2".to_string(), "SIZE 10000000".to_string()],
            auth_responses: vec![
                SmtpResponse::new(334, "VXNlcm5hbWU6"),
                SmtpResponse::new(334, "UGFzc3dvcmQ6"),
                SmtpResponse::new(235, "2.7.0 Authentication successful"),
            ],
            starttls_response: None,
            mail_from_response: SmtpResponse::new(250, "2.1.0 OK"),
            rcpt_to_response: SmtpResponse::new(250, "2.1.5 OK"),
            data_response: SmtpResponse::new(354, "End data with <CR><LF>.<CR><LF>"),
            data_end_response: SmtpResponse::new(250, "2.0.0 OK: queued"),
            quit_response: SmtpResponse::new(221, "2.0.0 Bye"),
        }
    }
}

#[derive(Debug, Default)]
struct Received {
    commands: Vec<String>,
    messages: Vec<String>,
    connections: usize,
}

/// Running mock server; stops when dropped.
pub struct MockSmtpServer {
    port: u16,
    received: Arc<Mutex<Received>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockSmtpServer {
    /// Creates a builder with a server that accepts everything.
    pub fn builder() -> MockSmtpServerBuilder {
        MockSmtpServerBuilder {
            config: MockServerConfig::default(),
        }
    }

    /// Port the server listens on.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Command lines received outside of message content, in order.
    pub fn commands(&self) -> Vec<String> {
        self.received.lock().unwrap().commands.clone()
    }

    /// Message contents received between `DATA` and `.`, dot-stuffing undone.
    pub fn messages(&self) -> Vec<String> {
        self.received.lock().unwrap().messages.clone()
    }

    /// Number of accepted connections.
    pub fn connections(&self) -> usize {
        self.received.lock().unwrap().connections
    }

    fn handle_client(
        stream: TcpStream,
        config: &MockServerConfig,
        received: &Mutex<Received>,
    ) -> std::io::Result<()> {
        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        let mut auth_step: Option<usize> = None;

        writer.write_all(&config.greeting.to_bytes())?;

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let line = line.trim_end_matches(['\r', '\n']).to_string();
            received.lock().unwrap().commands.push(line.clone());

            if let Some(step) = auth_step {
                let response = &config.auth_responses[step];
                auth_step = (response.code == 334 && step + 1 < config.auth_responses.len())
                    .then_some(step + 1);
                writer.write_all(&response.to_bytes())?;
                continue;
            }

            let keyword = line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_uppercase();
            let response = match keyword.as_str() {
                "EHLO" => {
                    let mut reply = String::new();
                    let host = line.get(5..).unwrap_or_default();
                    if config.capabilities.is_empty() {
                        reply.push_str(&format!("250 {host}\r\n"));
                    } else {
                        reply.push_str(&format!("250-{host}\r\n"));
                        let last = config.capabilities.len() - 1;
                        for (i, cap) in config.capabilities.iter().enumerate() {
                            let sep = if i == last { ' ' } else { '-' };
                            reply.push_str(&format!("250{sep}{cap}\r\n"));
                        }
                    }
                    writer.write_all(reply.as_bytes())?;
                    continue;
                }
                "AUTH" => {
                    let first = &config.auth_responses[0];
                    auth_step = (first.code == 334 && config.auth_responses.len() > 1).then_some(1);
                    first.clone()
                }
                "STARTTLS" => match &config.starttls_response {
                    Some(response) => {
                        writer.write_all(&response.to_bytes())?;
                        if response.code == 220 {
                            return Ok(());
                        }
                        continue;
                    }
                    None => SmtpResponse::new(500, "Unknown command"),
                },
                "MAIL" => config.mail_from_response.clone(),
                "RCPT" => config.rcpt_to_response.clone(),
                "DATA" => {
                    writer.write_all(&config.data_response.to_bytes())?;
                    if config.data_response.code == 354 {
                        let content = Self::read_content(&mut reader)?;
                        received.lock().unwrap().messages.push(content);
                        writer.write_all(&config.data_end_response.to_bytes())?;
                    }
                    continue;
                }
                "QUIT" => {
                    writer.write_all(&config.quit_response.to_bytes())?;
                    return Ok(());
                }
                "RSET" | "NOOP" => SmtpResponse::new(250, "OK"),
                _ => SmtpResponse::new(500, "Unknown command"),
            };
            writer.write_all(&response.to_bytes())?;
        }
    }

    fn read_content(reader: &mut BufReader<TcpStream>) -> std::io::Result<String> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line == "." {
                break;
            }
            lines.push(line.strip_prefix('.').unwrap_or(line).to_string());
        }
        Ok(lines.join("\r\n"))
    }
}

impl Drop for MockSmtpServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop so it can observe the flag.
        let _ = TcpStream::connect(("127.0.0.1", self.port));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Builder for [`MockSmtpServer`].
pub struct MockSmtpServerBuilder {
    config: MockServerConfig,
}

impl MockSmtpServerBuilder {
    /// Sets the greeting.
    #[must_use]
    pub fn with_greeting(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.greeting = SmtpResponse::new(code, message);
        self
    }

    /// Sets the EHLO capability lines.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.config.capabilities = capabilities.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the replies to `AUTH` and each following authentication line.
    #[must_use]
    pub fn with_auth_responses(mut self, responses: &[(u16, &str)]) -> Self {
        self.config.auth_responses = responses
            .iter()
            .map(|(code, message)| SmtpResponse::new(*code, *message))
            .collect();
        self
    }

    /// Sets the STARTTLS reply; unset, the command is unknown.
    #[must_use]
    pub fn with_starttls_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.starttls_response = Some(SmtpResponse::new(code, message));
        self
    }

    /// Sets the MAIL FROM reply.
    #[must_use]
    pub fn with_mail_from_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.mail_from_response = SmtpResponse::new(code, message);
        self
    }

    /// Sets the RCPT TO reply.
    #[must_use]
    pub fn with_rcpt_to_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.rcpt_to_response = SmtpResponse::new(code, message);
        self
    }

    /// Sets the DATA reply.
    #[must_use]
    pub fn with_data_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_response = SmtpResponse::new(code, message);
        self
    }

    /// Sets the reply to the end-of-data terminator.
    #[must_use]
    pub fn with_data_end_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_end_response = SmtpResponse::new(code, message);
        self
    }

    /// Binds the listener and starts serving on a background thread.
    pub fn start(self) -> MockSmtpServer {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Received::default()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let received = Arc::clone(&received);
            let shutdown = Arc::clone(&shutdown);
            let config = self.config;
            thread::spawn(move || {
                for stream in listener.incoming() {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    let Ok(stream) = stream else { continue };
                    received.lock().unwrap().connections += 1;
                    let _ = MockSmtpServer::handle_client(stream, &config, &received);
                }
            })
        };

        MockSmtpServer {
            port,
            received,
            shutdown,
            handle: Some(handle),
        }
    }
}
