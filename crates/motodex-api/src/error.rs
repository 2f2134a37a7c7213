//! Error types for API operations.

use serde::{Deserialize, Serialize};

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown for failures where no response reached the server.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network connection error. Please check your internet connection.";

/// A single field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field the message refers to.
    #[serde(alias = "param", alias = "path")]
    pub field: String,
    /// Human-readable message.
    #[serde(alias = "msg")]
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// API error taxonomy surfaced to callers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// No response reached the server (connect failure, timeout, transport I/O).
    #[error("Network error: {0}")]
    Network(String),

    /// 401 after the refresh attempt failed, was impossible, or was already used.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Non-2xx response with a server-supplied message.
    #[error("Server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message passed through verbatim from the server when present.
        message: String,
    },

    /// 4xx carrying field-level messages.
    #[error("Validation failed: {message}")]
    Validation {
        /// HTTP status code (0 when raised locally before any request).
        status: u16,
        /// Summary message.
        message: String,
        /// Field-level messages.
        fields: Vec<FieldError>,
    },

    /// Non-HTTP failure, e.g. a malformed response body.
    #[error("Unexpected error: {0}")]
    Unknown(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Credential storage failed.
    #[error("Credential storage error: {0}")]
    Storage(String),
}

/// Fieldless discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Network`].
    Network,
    /// See [`Error::Unauthorized`].
    Unauthorized,
    /// See [`Error::Server`].
    Server,
    /// See [`Error::Validation`].
    Validation,
    /// See [`Error::Unknown`].
    Unknown,
    /// See [`Error::InvalidConfig`].
    InvalidConfig,
    /// See [`Error::Storage`].
    Storage,
}

impl Error {
    /// Creates a server error from a status and message.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Returns the discriminant of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Server { .. } => ErrorKind::Server,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unknown(_) => ErrorKind::Unknown,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns true for server-reported failures, including validation errors.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Validation { .. })
    }

    /// Returns the HTTP status code if the server responded.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Validation { status, .. } if *status != 0 => Some(*status),
            Self::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    /// Human-readable message suitable for display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Server { status, message } | Self::Validation { status, message, .. } => {
                if message.is_empty() {
                    format!("Server error: {status}")
                } else {
                    message.clone()
                }
            }
            Self::Unauthorized(message)
            | Self::Unknown(message)
            | Self::InvalidConfig(message)
            | Self::Storage(message) => {
                if message.is_empty() {
                    "An unexpected error occurred".to_string()
                } else {
                    message.clone()
                }
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Unknown(format!("malformed response body: {err}"))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Unknown(err.to_string())
        } else if err.is_builder() {
            Self::InvalidConfig(err.to_string())
        } else if let Some(status) = err.status() {
            Self::server(status.as_u16(), String::new())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_passthrough() {
        let err = Error::server(500, "Database unavailable");
        assert_eq!(err.user_message(), "Database unavailable");
        assert_eq!(err.status(), Some(500));
        assert!(err.is_server_error());
    }

    #[test]
    fn test_server_message_fallback() {
        let err = Error::server(503, "");
        assert_eq!(err.user_message(), "Server error: 503");
    }

    #[test]
    fn test_validation_counts_as_server_error() {
        let err = Error::Validation {
            status: 422,
            message: "Invalid input".to_string(),
            fields: vec![FieldError::new("email", "Email is required")],
        };
        assert!(err.is_server_error());
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_network_message() {
        let err = Error::Network("connection refused".to_string());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_field_error_aliases() {
        let field: FieldError =
            serde_json::from_str(r#"{"param": "password", "msg": "Too short"}"#).unwrap();
        assert_eq!(field, FieldError::new("password", "Too short"));
    }
}
