//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// API call failed.
    #[error(transparent)]
    Api(#[from] motodex_api::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Credential storage error.
    #[error("Credential error: {0}")]
    Credential(#[from] crate::credentials::CredentialError),
}

impl Error {
    /// The API error, if this is one.
    #[must_use]
    pub const fn as_api(&self) -> Option<&motodex_api::Error> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Message suitable for display; `fallback` covers errors without a
    /// server-supplied message.
    #[must_use]
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(err) => describe(err, fallback),
            _ => fallback.to_string(),
        }
    }
}

/// Server message when one was supplied, otherwise `fallback`.
///
/// Network failures always use the shared connectivity message.
#[must_use]
pub fn describe(err: &motodex_api::Error, fallback: &str) -> String {
    use motodex_api::Error as Api;

    match err {
        Api::Network(_) => motodex_api::NETWORK_ERROR_MESSAGE.to_string(),
        Api::Server { message, .. } | Api::Validation { message, .. } | Api::Unauthorized(message)
            if !message.is_empty() =>
        {
            message.clone()
        }
        _ => fallback.to_string(),
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_prefers_server_message() {
        let err = motodex_api::Error::server(404, "Motorcycle not found");
        assert_eq!(describe(&err, "Failed to fetch"), "Motorcycle not found");

        let empty = motodex_api::Error::server(500, "");
        assert_eq!(describe(&empty, "Failed to fetch"), "Failed to fetch");
    }

    #[test]
    fn test_describe_network() {
        let err = motodex_api::Error::Network("connection refused".to_string());
        assert_eq!(
            describe(&err, "Failed to fetch"),
            motodex_api::NETWORK_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_display_message_for_local_errors() {
        let err = Error::Io(std::io::Error::other("disk full"));
        assert_eq!(err.display_message("Failed to save"), "Failed to save");
        assert!(err.as_api().is_none());
    }
}
