//! SMTP account configuration.

mod model;

pub use model::{Account, AccountOptions, DEFAULT_PORT};
