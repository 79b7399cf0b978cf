//! Connection management: the byte stream and the logged session on top of it.

mod session;
mod stream;

pub use session::{DEFAULT_TIMEOUT_MINUTES, IMPLICIT_TLS_PORT, SmtpSession};
pub use stream::{SmtpStream, connect, connect_tls};
