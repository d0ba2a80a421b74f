//! CLI error types.

use std::fmt;

use alerta_alerter::AlertaError;
use alerta_config::ConfigError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be resolved.
    Config(ConfigError),
    /// The alerter failed to build or send the alert.
    Alert(AlertaError),
    /// An input file was not valid JSON of the expected shape.
    Input {
        /// Where the input came from.
        source: String,
        /// What was wrong with it.
        reason: String,
    },
    /// Output formatting error.
    Format(String),
    /// IO error.
    Io(std::io::Error),
}

impl CliError {
    /// Creates an input error.
    pub fn input(source: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Input {
            source: source.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Alert(e) => write!(f, "alert failed: {e}"),
            Self::Input { source, reason } => write!(f, "invalid input {source}: {reason}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Alert(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<AlertaError> for CliError {
    fn from(err: AlertaError) -> Self {
        Self::Alert(err)
    }
}
