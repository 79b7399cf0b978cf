//! SMTP extension types.

/// SMTP extensions discovered from EHLO response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS - TLS upgrade
    StartTls,
    /// AUTH - Authentication
    Auth(Vec<AuthMechanism>),
    /// SIZE - Maximum message size
    Size(Option<usize>),
    /// 8BITMIME - 8-bit MIME transport
    EightBitMime,
    /// PIPELINING - Command pipelining
    Pipelining,
    /// SMTPUTF8 - UTF-8 email addresses
    SmtpUtf8,
    /// Unknown extension
    Unknown(String),
}

impl Extension {
    /// Parses an extension line from EHLO response.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(keyword) = parts.first() else {
            return Self::Unknown(line.to_string());
        };

        match keyword.to_uppercase().as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => Self::Auth(
                parts[1..]
                    .iter()
                    .filter_map(|m| AuthMechanism::parse(m))
                    .collect(),
            ),
            "SIZE" => Self::Size(parts.get(1).and_then(|s| s.parse().ok())),
            "8BITMIME" => Self::EightBitMime,
            "PIPELINING" => Self::Pipelining,
            "SMTPUTF8" => Self::SmtpUtf8,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - plaintext authentication
    Plain,
    /// LOGIN - legacy plaintext, one round trip per credential
    Login,
    /// `XOAUTH2` - `OAuth2` bearer token (Google/Microsoft)
    XOAuth2,
    /// `OAUTHBEARER` - RFC 7628 `OAuth2`
    OAuthBearer,
}

impl AuthMechanism {
    /// Parses an authentication mechanism name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLAIN" => Some(Self::Plain),
            "LOGIN" => Some(Self::Login),
            "XOAUTH2" => Some(Self::XOAuth2),
            "OAUTHBEARER" => Some(Self::OAuthBearer),
            _ => None,
        }
    }

    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::XOAuth2 => "XOAUTH2",
            Self::OAuthBearer => "OAUTHBEARER",
        }
    }
}
