//! Error types for the alerta-config crate.

use std::path::PathBuf;

use thiserror::Error;

/// A syntax error found while parsing an INI document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct SyntaxError {
    /// 1-based line number of the offending line.
    pub line: usize,
    /// What was wrong with it.
    pub reason: String,
}

impl SyntaxError {
    pub(crate) fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while resolving connection options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not a valid INI document.
    #[error("failed to parse configuration file {}: {source}", path.display())]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// The syntax error.
        #[source]
        source: SyntaxError,
    },

    /// A recognized option holds a value that cannot be used.
    #[error("invalid value for option {key}: {value:?}")]
    InvalidValue {
        /// Option name.
        key: String,
        /// The raw value found.
        value: String,
    },
}

impl ConfigError {
    /// Returns the path of the configuration file involved, if any.
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => Some(path),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
