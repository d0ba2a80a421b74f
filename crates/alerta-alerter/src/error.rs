//! Error types for the alerta-alerter crate.

use thiserror::Error;

/// Errors that can occur while building or sending an alert.
#[derive(Debug, Error)]
pub enum AlertaError {
    /// The alerter was invoked without any matches.
    #[error("no matches to alert on")]
    NoMatches,

    /// A match record or the rule lacks a field the payload needs.
    #[error("missing field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// The request never got a usable answer from the Alerta server.
    ///
    /// Connection, TLS, timeout and body I/O failures all land here.
    #[error("send message has error: {reason}")]
    Send {
        /// Text of the underlying transport error.
        reason: String,
    },

    /// The Alerta server answered and rejected the alert.
    #[error("alerta api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// The client could not be built from the resolved options.
    #[error("invalid client configuration: {reason}")]
    InvalidConfig {
        /// The reason the configuration is unusable.
        reason: String,
    },

    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] alerta_config::ConfigError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The logging subscriber could not be installed.
    #[error("logging setup failed: {reason}")]
    Logging {
        /// The reason setup failed.
        reason: String,
    },
}

impl AlertaError {
    /// Creates a `MissingField` error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Wraps a transport failure from the HTTP client.
    #[must_use]
    pub fn transport(err: &reqwest::Error) -> Self {
        Self::Send {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AlertaError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for alerter operations.
pub type Result<T> = std::result::Result<T, AlertaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_no_matches() {
        assert_eq!(AlertaError::NoMatches.to_string(), "no matches to alert on");
    }

    #[test]
    fn error_display_missing_field() {
        let err = AlertaError::missing("num_hits");
        assert_eq!(err.to_string(), "missing field: num_hits");
    }

    #[test]
    fn error_display_send() {
        let err = AlertaError::Send {
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "send message has error: connection refused"
        );
    }

    #[test]
    fn error_display_api() {
        let err = AlertaError::Api {
            status: 400,
            message: "must supply resource".to_string(),
        };
        assert_eq!(err.to_string(), "alerta api error (400): must supply resource");
    }

    #[test]
    fn error_from_config_error_is_transparent() {
        let config_err = alerta_config::ConfigError::InvalidValue {
            key: "timeout".to_string(),
            value: "x".to_string(),
        };
        let expected = config_err.to_string();
        let err: AlertaError = config_err.into();
        assert!(matches!(err, AlertaError::Config(_)));
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("invalid json");
        assert!(json_err.is_err());
        let err: AlertaError = json_err.unwrap_err().into();
        assert!(matches!(err, AlertaError::SerializationError(_)));
    }
}
