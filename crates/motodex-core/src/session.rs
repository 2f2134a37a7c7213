//! Authentication session state.
//!
//! Tokens live in the client's [`CredentialStore`](motodex_api::CredentialStore);
//! the signed-in user is persisted to [`Storage`] under [`USER_KEY`] so a
//! session survives restarts.

use motodex_api::model::{FilePart, LoginCredentials, ProfileUpdate, RegisterCredentials, User};
use motodex_api::{ApiClient, SessionCredential};
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::describe;
use crate::storage::{Storage, USER_KEY};
use crate::validation::{
    ValidationError, into_api_error, is_valid_email, validate_login, validate_new_password,
    validate_registration,
};

/// Signed-in user and session status.
#[derive(Debug, Clone)]
pub struct AuthSession {
    storage: Storage,
    user: Option<User>,
    is_authenticated: bool,
    is_loading: bool,
    error: Option<String>,
}

impl AuthSession {
    /// Creates a signed-out session persisting to `storage`.
    #[must_use]
    pub const fn new(storage: Storage) -> Self {
        Self {
            storage,
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: None,
        }
    }

    /// The signed-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// An auth request is running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Last error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Clears the last error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Restores a persisted session.
    ///
    /// The session is authenticated only if both a token and a stored user
    /// exist; a stored user without a token is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store or storage cannot be read.
    pub async fn restore(&mut self, client: &ApiClient) -> Result<bool> {
        let token = client.credentials().access_token()?;
        let user = self.storage.get_json::<User>(USER_KEY).await?;

        match (token, user) {
            (Some(_), Some(user)) => {
                debug!(user = %user.id, "Restored session");
                self.user = Some(user);
                self.is_authenticated = true;
            }
            (None, Some(_)) => {
                debug!("Discarding stored user without a token");
                self.storage.remove(USER_KEY).await?;
                self.reset();
            }
            _ => self.reset(),
        }
        Ok(self.is_authenticated)
    }

    /// Signs in.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error without contacting the server when the
    /// input is malformed, otherwise the API error.
    pub async fn login(
        &mut self,
        client: &ApiClient,
        credentials: &LoginCredentials,
    ) -> Result<&User> {
        if let Err(errors) = validate_login(credentials) {
            return Err(self.reject(&errors));
        }

        self.begin();
        match client.auth().login(credentials).await {
            Ok(payload) => {
                let credential = SessionCredential {
                    access_token: payload.token,
                    refresh_token: payload.refresh_token,
                };
                self.establish(client, &credential, payload.user).await
            }
            Err(err) => Err(self.fail(client, err, "Login failed").await),
        }
    }

    /// Creates an account and signs in.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error without contacting the server when the
    /// input is malformed, otherwise the API error.
    pub async fn register(
        &mut self,
        client: &ApiClient,
        credentials: &RegisterCredentials,
    ) -> Result<&User> {
        if let Err(errors) = validate_registration(credentials) {
            return Err(self.reject(&errors));
        }

        self.begin();
        match client.auth().register(credentials).await {
            Ok(payload) => {
                let credential = SessionCredential {
                    access_token: payload.token,
                    refresh_token: payload.refresh_token,
                };
                self.establish(client, &credential, payload.user).await
            }
            Err(err) => Err(self.fail(client, err, "Registration failed").await),
        }
    }

    /// Signs out.
    ///
    /// The server call is best-effort; local credentials and the stored user
    /// are always cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if local credentials or storage cannot be cleared.
    pub async fn logout(&mut self, client: &ApiClient) -> Result<()> {
        self.is_loading = true;
        if let Err(e) = client.auth().logout().await {
            warn!("Server logout failed: {e}");
        }

        let cleared = client.credentials().clear();
        let removed = self.storage.remove(USER_KEY).await;
        self.reset();
        info!("Signed out");

        cleared?;
        removed
    }

    /// Reloads the user from the server.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn load_profile(&mut self, client: &ApiClient) -> Result<&User> {
        self.begin();
        match client.auth().profile().await {
            Ok(user) => self.replace_user(user).await,
            Err(err) => Err(self.fail(client, err, "Failed to load profile").await),
        }
    }

    /// Applies a profile update.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn update_profile(
        &mut self,
        client: &ApiClient,
        update: &ProfileUpdate,
    ) -> Result<&User> {
        self.begin();
        match client.auth().update_profile(update).await {
            Ok(user) => self.replace_user(user).await,
            Err(err) => Err(self.fail(client, err, "Failed to update profile").await),
        }
    }

    /// Changes the password.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error without contacting the server when the
    /// new password is too weak, otherwise the API error.
    pub async fn change_password(
        &mut self,
        client: &ApiClient,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if let Err(errors) = validate_new_password(new_password) {
            return Err(self.reject(&errors));
        }

        self.begin();
        match client.auth().change_password(old_password, new_password).await {
            Ok(()) => {
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail(client, err, "Failed to change password").await),
        }
    }

    /// Uploads a new avatar and stores its URL on the user.
    ///
    /// # Errors
    ///
    /// Returns the API error if the upload fails.
    pub async fn upload_avatar(&mut self, client: &ApiClient, image: FilePart) -> Result<String> {
        self.begin();
        match client.auth().upload_avatar(image).await {
            Ok(url) => {
                self.is_loading = false;
                if let Some(user) = self.user.as_mut() {
                    user.avatar = Some(url.clone());
                    self.storage.set_json(USER_KEY, user).await?;
                }
                Ok(url)
            }
            Err(err) => Err(self.fail(client, err, "Failed to upload avatar").await),
        }
    }

    /// Requests a password reset email.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error for a malformed address, otherwise the
    /// API error.
    pub async fn forgot_password(&mut self, client: &ApiClient, email: &str) -> Result<()> {
        if !is_valid_email(email) {
            return Err(self.reject(&[ValidationError::InvalidEmail]));
        }

        self.begin();
        match client.auth().forgot_password(email).await {
            Ok(()) => {
                self.is_loading = false;
                Ok(())
            }
            Err(err) => Err(self.fail(client, err, "Failed to send reset email").await),
        }
    }

    /// Records a favorite on the signed-in user.
    pub fn add_favorite_to_user(&mut self, motorcycle_id: &str) {
        if let Some(user) = self.user.as_mut()
            && !user.favorites.iter().any(|id| id == motorcycle_id)
        {
            user.favorites.push(motorcycle_id.to_string());
        }
    }

    /// Removes a favorite from the signed-in user.
    pub fn remove_favorite_from_user(&mut self, motorcycle_id: &str) {
        if let Some(user) = self.user.as_mut() {
            user.favorites.retain(|id| id != motorcycle_id);
        }
    }

    /// Records an authored review on the signed-in user.
    pub fn add_review_to_user(&mut self, review_id: &str) {
        if let Some(user) = self.user.as_mut()
            && !user.reviews.iter().any(|id| id == review_id)
        {
            user.reviews.push(review_id.to_string());
        }
    }

    /// Persists the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn persist_user(&self) -> Result<()> {
        match &self.user {
            Some(user) => self.storage.set_json(USER_KEY, user).await,
            None => Ok(()),
        }
    }

    fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    fn reset(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.is_loading = false;
    }

    fn reject(&mut self, errors: &[ValidationError]) -> crate::Error {
        let err = into_api_error(errors);
        self.error = Some(err.user_message());
        err.into()
    }

    async fn establish(
        &mut self,
        client: &ApiClient,
        credential: &SessionCredential,
        user: User,
    ) -> Result<&User> {
        self.is_loading = false;
        client.credentials().store(credential)?;
        self.storage.set_json(USER_KEY, &user).await?;
        info!(user = %user.id, "Signed in");

        self.is_authenticated = true;
        Ok(self.user.insert(user))
    }

    async fn replace_user(&mut self, user: User) -> Result<&User> {
        self.is_loading = false;
        self.storage.set_json(USER_KEY, &user).await?;
        Ok(self.user.insert(user))
    }

    /// Records `err` and signs out locally when the client gave up on the
    /// session.
    async fn fail(
        &mut self,
        client: &ApiClient,
        err: motodex_api::Error,
        fallback: &str,
    ) -> crate::Error {
        self.is_loading = false;
        self.error = Some(describe(&err, fallback));

        let expired = matches!(err, motodex_api::Error::Unauthorized(_))
            && self.is_authenticated
            && matches!(client.credentials().access_token(), Ok(None));
        if expired {
            warn!("Session expired, signing out");
            if let Err(e) = self.storage.remove(USER_KEY).await {
                warn!("Failed to remove stored user: {e}");
            }
            self.reset();
        }

        err.into()
    }
}
