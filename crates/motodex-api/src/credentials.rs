//! Session credential and the storage seam the client reads it through.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Access/refresh token pair identifying an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    /// Bearer token attached to requests.
    pub access_token: String,
    /// Token exchanged for a new access token on 401.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl SessionCredential {
    /// Creates a credential without a refresh token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

/// Storage for the session credential.
///
/// The client only reads through this trait; the refresh path is the sole
/// writer besides login and logout.
pub trait CredentialStore: Send + Sync {
    /// Current access token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn access_token(&self) -> Result<Option<String>>;

    /// Current refresh token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn refresh_token(&self) -> Result<Option<String>>;

    /// Replaces both tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn store(&self, credential: &SessionCredential) -> Result<()>;

    /// Replaces the access token, keeping the refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set_access_token(&self, token: &str) -> Result<()>;

    /// Removes every credential field.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn clear(&self) -> Result<()>;
}

/// In-process credential store.
///
/// Counts writes and clears so callers can assert how often the session was touched.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<SessionCredential>>,
    writes: AtomicUsize,
    clears: AtomicUsize,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given credential.
    #[must_use]
    pub fn with_credential(credential: SessionCredential) -> Self {
        Self {
            inner: Mutex::new(Some(credential)),
            ..Self::default()
        }
    }

    /// Snapshot of the stored credential.
    #[must_use]
    pub fn credential(&self) -> Option<SessionCredential> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }

    /// Number of `store` and `set_access_token` calls.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of `clear` calls.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<SessionCredential>>> {
        self.inner
            .lock()
            .map_err(|_| Error::Storage("credential lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.lock()?.as_ref().map(|c| c.access_token.clone()))
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.lock()?.as_ref().and_then(|c| c.refresh_token.clone()))
    }

    fn store(&self, credential: &SessionCredential) -> Result<()> {
        *self.lock()? = Some(credential.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_access_token(&self, token: &str) -> Result<()> {
        let mut guard = self.lock()?;
        match guard.as_mut() {
            Some(credential) => token.clone_into(&mut credential.access_token),
            None => *guard = Some(SessionCredential::new(token)),
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_set_access_token_keeps_refresh() {
        let store = MemoryCredentialStore::with_credential(
            SessionCredential::new("old").with_refresh_token("refresh"),
        );
        store.set_access_token("new").unwrap();
        assert_eq!(store.access_token().unwrap().as_deref(), Some("new"));
        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("refresh"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_clear() {
        let store = MemoryCredentialStore::with_credential(SessionCredential::new("token"));
        store.clear().unwrap();
        assert!(store.credential().is_none());
        assert_eq!(store.clear_count(), 1);
    }

    #[test]
    fn test_serialization_skips_missing_refresh() {
        let json = serde_json::to_string(&SessionCredential::new("abc")).unwrap();
        assert_eq!(json, r#"{"access_token":"abc"}"#);
    }
}
