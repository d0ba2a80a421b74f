//! Connection options for the Alerta client.
//!
//! Values travel through resolution as raw strings and are coerced the way
//! the INI tooling coerces them: a boolean when the text parses as one,
//! otherwise the text itself. [`Options`] is the typed view the sender uses.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::{ConfigError, Result};

/// Option naming the configuration file.
pub const CONFIG_FILE: &str = "config_file";
/// Option naming the profile section to use.
pub const PROFILE: &str = "profile";
/// Option holding the Alerta API base URL.
pub const ENDPOINT: &str = "endpoint";
/// Option holding the API key.
pub const KEY: &str = "key";
/// Option controlling TLS certificate verification.
pub const SSL_VERIFY: &str = "sslverify";
/// Option enabling client debug output.
pub const DEBUG: &str = "debug";
/// Option holding the request timeout in seconds.
pub const TIMEOUT: &str = "timeout";

/// Built-in option values, applied before anything read from disk.
pub const DEFAULTS: [(&str, &str); 7] = [
    (CONFIG_FILE, "/etc/alertclient.conf"),
    (PROFILE, "production"),
    (ENDPOINT, "http://localhost:8080"),
    (KEY, ""),
    (SSL_VERIFY, "False"),
    (DEBUG, "False"),
    (TIMEOUT, "5"),
];

/// Returns the built-in value for a recognized option.
#[must_use]
pub fn default_value(key: &str) -> Option<&'static str> {
    DEFAULTS.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Parses the boolean spellings accepted in the configuration file.
///
/// `1`, `yes`, `true`, `on` and `0`, `no`, `false`, `off`, case-insensitive.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// The raw text parsed as a boolean.
    Bool(bool),
    /// Anything else, kept verbatim.
    Text(String),
}

impl OptionValue {
    /// Coerces raw text: boolean first, text otherwise.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        parse_bool(raw).map_or_else(|| Self::Text(raw.to_string()), Self::Bool)
    }

    /// Returns the boolean, if this value is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    /// Returns the text, if this value is not a boolean.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Bool(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Truthiness: booleans as-is, text when non-empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// How the client verifies the server's TLS certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsVerify {
    /// Verify against the system trust roots.
    Enabled,
    /// Accept any certificate.
    Disabled,
    /// Verify against the CA bundle at this path.
    CaBundle(PathBuf),
}

impl TlsVerify {
    fn from_value(value: &OptionValue) -> Self {
        match value {
            OptionValue::Bool(true) => Self::Enabled,
            OptionValue::Bool(false) => Self::Disabled,
            OptionValue::Text(s) if s.is_empty() => Self::Disabled,
            OptionValue::Text(s) => Self::CaBundle(PathBuf::from(s)),
        }
    }
}

/// Typed connection options, built fresh for every send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Options {
    /// Configuration file the options were read from.
    pub config_file: String,
    /// Profile name in effect.
    pub profile: String,
    /// Alerta API base URL.
    pub endpoint: String,
    /// API key, empty when unauthenticated.
    #[serde(skip_serializing)]
    pub key: String,
    /// TLS verification mode.
    pub ssl_verify: TlsVerify,
    /// Client debug flag.
    pub debug: bool,
    /// Request timeout.
    pub timeout: Duration,
}

impl Options {
    /// Builds typed options from raw values keyed by option name.
    ///
    /// Missing keys take their built-in value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `timeout` is not a
    /// non-negative number of seconds.
    pub fn from_raw(raw: &BTreeMap<String, String>) -> Result<Self> {
        let get = |key: &str| -> String {
            raw.get(key)
                .map(String::as_str)
                .or_else(|| default_value(key))
                .unwrap_or_default()
                .to_string()
        };

        let timeout_raw = get(TIMEOUT);
        let timeout = timeout_raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .ok_or_else(|| ConfigError::InvalidValue {
                key: TIMEOUT.to_string(),
                value: timeout_raw.clone(),
            })?;

        Ok(Self {
            config_file: get(CONFIG_FILE),
            profile: get(PROFILE),
            endpoint: get(ENDPOINT),
            key: get(KEY),
            ssl_verify: TlsVerify::from_value(&OptionValue::coerce(&get(SSL_VERIFY))),
            debug: OptionValue::coerce(&get(DEBUG)).is_truthy(),
            timeout,
        })
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config_file: "/etc/alertclient.conf".to_string(),
            profile: "production".to_string(),
            endpoint: "http://localhost:8080".to_string(),
            key: String::new(),
            ssl_verify: TlsVerify::Disabled,
            debug: false,
            timeout: Duration::from_secs(5),
        }
    }
}
