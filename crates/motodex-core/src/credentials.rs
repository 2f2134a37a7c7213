//! Secure credential storage using system keyring.
//!
//! Provides a [`CredentialStore`] backed by the platform's native
//! credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use motodex_api::{CredentialStore, SessionCredential};
use tracing::{debug, warn};

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "motodex";

/// Entry name of the access token.
const ACCESS_TOKEN: &str = "auth_token";

/// Entry name of the refresh token.
const REFRESH_TOKEN: &str = "refresh_token";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<CredentialError> for motodex_api::Error {
    fn from(err: CredentialError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Session tokens kept in the system keyring.
///
/// `profile` namespaces the entries so several API environments can keep
/// separate sessions.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    profile: String,
}

impl KeyringCredentialStore {
    /// Creates a store for the given profile (for example the API host).
    #[must_use]
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    /// Generates the keyring entry key for a credential.
    fn credential_key(&self, credential_type: &str) -> String {
        format!("{SERVICE_NAME}_{credential_type}_{}", self.profile)
    }

    fn entry(&self, credential_type: &str) -> CredentialResult<Entry> {
        Ok(Entry::new(SERVICE_NAME, &self.credential_key(credential_type))?)
    }

    fn read(&self, credential_type: &str) -> CredentialResult<Option<String>> {
        match self.entry(credential_type)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => {
                debug!("No {credential_type} found for profile {}", self.profile);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, credential_type: &str, secret: &str) -> CredentialResult<()> {
        self.entry(credential_type)?.set_password(secret)?;
        debug!("Stored {credential_type} for profile {}", self.profile);
        Ok(())
    }

    fn delete(&self, credential_type: &str) -> CredentialResult<()> {
        match self.entry(credential_type)?.delete_credential() {
            Ok(()) => {
                debug!("Deleted {credential_type} for profile {}", self.profile);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No {credential_type} to delete for profile {}", self.profile);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to delete {credential_type}: {e}");
                Err(e.into())
            }
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn access_token(&self) -> motodex_api::Result<Option<String>> {
        Ok(self.read(ACCESS_TOKEN)?)
    }

    fn refresh_token(&self) -> motodex_api::Result<Option<String>> {
        Ok(self.read(REFRESH_TOKEN)?)
    }

    fn store(&self, credential: &SessionCredential) -> motodex_api::Result<()> {
        self.write(ACCESS_TOKEN, &credential.access_token)?;
        match &credential.refresh_token {
            Some(refresh) => self.write(REFRESH_TOKEN, refresh)?,
            None => self.delete(REFRESH_TOKEN)?,
        }
        Ok(())
    }

    fn set_access_token(&self, token: &str) -> motodex_api::Result<()> {
        Ok(self.write(ACCESS_TOKEN, token)?)
    }

    fn clear(&self) -> motodex_api::Result<()> {
        self.delete(ACCESS_TOKEN)?;
        self.delete(REFRESH_TOKEN)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    // These tests interact with the actual system keyring and are ignored by
    // default. Run manually with `cargo test -- --ignored`.

    use super::*;

    #[test]
    fn test_credential_key_is_namespaced() {
        let store = KeyringCredentialStore::new("localhost:5000");
        assert_eq!(
            store.credential_key(ACCESS_TOKEN),
            "motodex_auth_token_localhost:5000"
        );
    }

    #[test]
    #[ignore = "Interacts with system keyring"]
    fn test_store_and_clear() {
        let store = KeyringCredentialStore::new("test-profile-99999");
        store
            .store(&SessionCredential::new("access").with_refresh_token("refresh"))
            .unwrap();

        assert_eq!(store.access_token().unwrap().as_deref(), Some("access"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("refresh"));

        store.set_access_token("rotated").unwrap();
        assert_eq!(store.access_token().unwrap().as_deref(), Some("rotated"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("refresh"));

        store.clear().unwrap();
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
    }
}
