//! Send modes and their configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration key naming the directory used by [`SendMode::TestStore`].
pub const STORE_PATH: &str = "store-path";

/// Configuration key naming the override recipients of [`SendMode::TestSend`].
pub const SEND_ADDRESSES: &str = "send-addresses";

/// How [`Message::send`](crate::Message::send) delivers a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SendMode {
    /// Deliver to the real recipients.
    #[default]
    #[serde(rename = "send")]
    Prod,
    /// Deliver to the addresses in `send-addresses` instead, with a table of
    /// the original headers prepended to the body.
    #[serde(rename = "test_send")]
    TestSend,
    /// Write the rendered message below `store-path` instead of sending it.
    #[serde(rename = "store")]
    TestStore,
}

impl SendMode {
    /// Configuration name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prod => "send",
            Self::TestSend => "test_send",
            Self::TestStore => "store",
        }
    }
}

impl fmt::Display for SendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SendMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "send" | "prod" => Ok(Self::Prod),
            "test_send" | "test-send" => Ok(Self::TestSend),
            "store" | "test_store" | "test-store" => Ok(Self::TestStore),
            other => Err(Error::Config(format!("unknown send mode: {other}"))),
        }
    }
}

/// A configuration value: one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Single value.
    Text(String),
    /// Several values.
    List(Vec<String>),
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<PathBuf> for ConfigValue {
    fn from(value: PathBuf) -> Self {
        Self::Text(value.to_string_lossy().into_owned())
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<&[&str]> for ConfigValue {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(ToString::to_string).collect())
    }
}

/// Settings for the active send mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeConfig(BTreeMap<String, ConfigValue>);

impl ModeConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    /// Directory for stored messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `store-path` is missing or is not an
    /// existing directory.
    pub fn store_path(&self) -> Result<PathBuf> {
        let path = match self.get(STORE_PATH) {
            Some(ConfigValue::Text(path)) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => {
                return Err(Error::Config(format!(
                    "{STORE_PATH} is not set for mode {}",
                    SendMode::TestStore
                )));
            }
        };
        if !path.is_dir() {
            return Err(Error::Config(format!(
                "store path does not exist: '{}'",
                path.display()
            )));
        }
        Ok(path)
    }

    /// Override recipients, trimmed, empty entries dropped.
    ///
    /// A single string is split on `;`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `send-addresses` is missing or holds no
    /// address.
    pub fn send_addresses(&self) -> Result<Vec<String>> {
        let raw: Vec<&str> = match self.get(SEND_ADDRESSES) {
            Some(ConfigValue::Text(list)) => list.split(';').collect(),
            Some(ConfigValue::List(list)) => list.iter().map(String::as_str).collect(),
            None => Vec::new(),
        };
        let addresses: Vec<String> = raw
            .into_iter()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(ToString::to_string)
            .collect();

        if addresses.is_empty() {
            return Err(Error::Config(format!(
                "{SEND_ADDRESSES} is not set for mode {}",
                SendMode::TestSend
            )));
        }
        Ok(addresses)
    }
}
