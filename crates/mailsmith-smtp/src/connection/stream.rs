//! Low-level SMTP stream handling.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::error::{Error, Result};

/// SMTP stream (TCP or TLS).
#[derive(Debug)]
pub enum SmtpStream {
    /// Plain TCP connection.
    Tcp(BufReader<TcpStream>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<StreamOwned<ClientConnection, TcpStream>>>),
}

impl SmtpStream {
    /// Reads a line from the stream with the line terminator removed.
    ///
    /// Returns `None` once the peer has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or times out.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = match self {
            Self::Tcp(reader) => reader.read_line(&mut line)?,
            Self::Tls(reader) => reader.read_line(&mut line)?,
        };
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Writes data to the stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Tcp(reader) => {
                reader.get_mut().write_all(data)?;
                reader.get_mut().flush()?;
            }
            Self::Tls(reader) => {
                reader.get_mut().write_all(data)?;
                reader.get_mut().flush()?;
            }
        }
        Ok(())
    }

    /// Returns true if the channel is TLS-encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Upgrades a TCP stream to TLS.
    ///
    /// The handshake completes before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already encrypted or the TLS
    /// handshake fails.
    pub fn upgrade_to_tls(self, hostname: &str) -> Result<Self> {
        let tcp_stream = match self {
            Self::Tcp(reader) => reader.into_inner(),
            Self::Tls(_) => {
                return Err(Error::Io(io::Error::other("channel is already encrypted")));
            }
        };
        handshake(hostname, tcp_stream)
    }
}

/// Connects to an SMTP server over plain TCP.
///
/// `timeout` bounds the connection attempt and every later read and write.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub fn connect(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let stream = open_tcp(hostname, port, timeout)?;
    Ok(SmtpStream::Tcp(BufReader::new(stream)))
}

/// Connects to an SMTP server over TLS (implicit TLS on port 465).
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails.
pub fn connect_tls(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let stream = open_tcp(hostname, port, timeout)?;
    handshake(hostname, stream)
}

fn open_tcp(hostname: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let mut last_error = None;
    for addr in (hostname, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                return Ok(stream);
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(Error::Io(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address found for {hostname}:{port}"),
        )
    })))
}

fn handshake(hostname: &str, mut tcp_stream: TcpStream) -> Result<SmtpStream> {
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::InvalidHostname(hostname.to_string()))?;

    let mut conn = ClientConnection::new(create_tls_config(), server_name)?;
    while conn.is_handshaking() {
        conn.complete_io(&mut tcp_stream)?;
    }

    Ok(SmtpStream::Tls(Box::new(BufReader::new(StreamOwned::new(
        conn, tcp_stream,
    )))))
}

/// Creates a TLS client configuration with the webpki root certificates.
fn create_tls_config() -> Arc<ClientConfig> {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn reads_lines_without_terminators() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            sock.write_all(b"220 ready\r\n250-first\r\n").unwrap();
        });

        let mut stream = connect("127.0.0.1", port, Duration::from_secs(5)).unwrap();
        server.join().unwrap();

        assert!(!stream.is_encrypted());
        assert_eq!(stream.read_line().unwrap().as_deref(), Some("220 ready"));
        assert_eq!(stream.read_line().unwrap().as_deref(), Some("250-first"));
        assert_eq!(stream.read_line().unwrap(), None);
    }

    #[test]
    fn refused_connection_is_an_io_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect("127.0.0.1", port, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn invalid_hostname_is_rejected_before_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let _conn = listener.accept().unwrap();
        });
        let tcp = TcpStream::connect(("127.0.0.1", port)).unwrap();

        let err = handshake("bad host name", tcp).unwrap_err();
        assert!(matches!(err, Error::InvalidHostname(_)));
        server.join().unwrap();
    }
}
