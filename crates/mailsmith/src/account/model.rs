//! Account model types.

use mailsmith_smtp::{Credentials, SmtpSession};
use serde::{Deserialize, Serialize};

/// Port used when the options do not name one (implicit TLS).
pub const DEFAULT_PORT: u16 = 465;

/// Raw account options, as read from a configuration file.
///
/// Keys use kebab-case (`server-address`, `sender-name`, ...). Missing keys
/// take their defaults: port 465 and empty strings elsewhere.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AccountOptions {
    /// SMTP server host name.
    pub server_address: String,
    /// SMTP server port.
    pub port: u16,
    /// Login name.
    pub user: String,
    /// Login password.
    pub pass: String,
    /// Display name of the sender.
    pub sender_name: String,
    /// Envelope and `From` address.
    pub sender_address: String,
    /// Free-form account label; falls back to the sender name.
    pub account_name: String,
    /// `OAuth2` client id.
    pub client_id: String,
    /// `OAuth2` client secret.
    pub client_secret: String,
    /// `OAuth2` tenant (Microsoft identity platform).
    pub tenant: String,
    /// `OAuth2` redirect URI.
    pub redirect_uri: String,
    /// `OAuth2` access token; when set, XOAUTH2 is used instead of LOGIN.
    pub access_token: String,
}

impl Default for AccountOptions {
    fn default() -> Self {
        Self {
            server_address: String::new(),
            port: DEFAULT_PORT,
            user: String::new(),
            pass: String::new(),
            sender_name: String::new(),
            sender_address: String::new(),
            account_name: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            tenant: String::new(),
            redirect_uri: String::new(),
            access_token: String::new(),
        }
    }
}

impl std::fmt::Debug for AccountOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountOptions")
            .field("server_address", &self.server_address)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("sender_address", &self.sender_address)
            .finish_non_exhaustive()
    }
}

/// SMTP account used to send messages.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// `OAuth2` bearer token.
    pub access_token: Option<String>,
    /// Display name of the sender.
    pub sender_name: String,
    /// Sender address.
    pub sender_address: String,
    /// Account label.
    pub name: String,
    /// `OAuth2` client id.
    pub client_id: String,
    /// `OAuth2` client secret.
    pub client_secret: String,
    /// `OAuth2` tenant.
    pub tenant: String,
    /// `OAuth2` redirect URI.
    pub redirect_uri: String,
}

impl Account {
    /// Builds an account from options.
    ///
    /// Host, user, sender name and sender address are trimmed; an empty
    /// account name falls back to the sender name.
    #[must_use]
    pub fn new(options: AccountOptions) -> Self {
        let sender_name = options.sender_name.trim().to_string();
        let name = if options.account_name.trim().is_empty() {
            sender_name.clone()
        } else {
            options.account_name
        };
        let access_token = Some(options.access_token.trim().to_string()).filter(|t| !t.is_empty());

        Self {
            host: options.server_address.trim().to_string(),
            port: options.port,
            username: options.user.trim().to_string(),
            password: options.pass,
            access_token,
            sender_name,
            sender_address: options.sender_address.trim().to_string(),
            name,
            client_id: options.client_id,
            client_secret: options.client_secret,
            tenant: options.tenant,
            redirect_uri: options.redirect_uri,
        }
    }

    /// Credentials presented when authenticating.
    ///
    /// Token-bearing accounts use XOAUTH2, all others LOGIN.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        match &self.access_token {
            Some(token) => Credentials::XOAuth2 {
                user: if self.username.is_empty() {
                    self.sender_address.clone()
                } else {
                    self.username.clone()
                },
                token: token.clone(),
            },
            None => Credentials::Login {
                username: self.username.clone(),
                password: self.password.clone(),
            },
        }
    }

    /// Creates a fresh, disconnected session for this account's server.
    #[must_use]
    pub fn session(&self) -> SmtpSession {
        SmtpSession::new(self.host.clone(), self.port)
    }
}

impl From<AccountOptions> for Account {
    fn from(options: AccountOptions) -> Self {
        Self::new(options)
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("sender_name", &self.sender_name)
            .field("sender_address", &self.sender_address)
            .field("name", &self.name)
            .field("oauth", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}
