//! Authentication and profile endpoints.

use serde_json::json;

use crate::client::{ApiClient, REFRESH_PATH, parse_refresh_payload};
use crate::error::Result;
use crate::model::{
    AuthPayload, FilePart, LoginCredentials, ProfileUpdate, RefreshPayload, RegisterCredentials,
    UploadedUrl, User,
};
use crate::request::RequestDescriptor;

/// `/auth` routes.
#[derive(Debug, Clone, Copy)]
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Logs in. A 401 here is a credential error and is never refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload> {
        let request = RequestDescriptor::post("/auth/login")
            .without_refresh()
            .json(credentials)?;
        self.client.execute(&request).await
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn register(&self, credentials: &RegisterCredentials) -> Result<AuthPayload> {
        let request = RequestDescriptor::post("/auth/register")
            .without_refresh()
            .json(credentials)?;
        self.client.execute(&request).await
    }

    /// Invalidates the session server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn logout(&self) -> Result<()> {
        self.client
            .execute_unit(&RequestDescriptor::post("/auth/logout").without_refresh())
            .await
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Accepts the payload bare or inside an envelope, like the client's own
    /// refresh path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body carries no token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshPayload> {
        let request = RequestDescriptor::post(REFRESH_PATH)
            .without_refresh()
            .json(&json!({ "refreshToken": refresh_token }))?;
        let response = self.client.execute_raw(&request).await?;
        parse_refresh_payload(&response.body)
    }

    /// Requests a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let request = RequestDescriptor::post("/auth/forgot-password")
            .without_refresh()
            .json(&json!({ "email": email }))?;
        self.client.execute_unit(&request).await
    }

    /// Sets a new password using a reset token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let request = RequestDescriptor::post("/auth/reset-password")
            .without_refresh()
            .json(&json!({ "token": token, "newPassword": new_password }))?;
        self.client.execute_unit(&request).await
    }

    /// Current user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn profile(&self) -> Result<User> {
        self.client
            .execute(&RequestDescriptor::get("/auth/profile"))
            .await
    }

    /// Updates the current user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let request = RequestDescriptor::put("/auth/profile").json(update)?;
        self.client.execute(&request).await
    }

    /// Changes the password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let request = RequestDescriptor::post("/auth/change-password")
            .json(&json!({ "oldPassword": old_password, "newPassword": new_password }))?;
        self.client.execute_unit(&request).await
    }

    /// Uploads a new avatar and returns its URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn upload_avatar(&self, image: FilePart) -> Result<String> {
        let request = RequestDescriptor::post("/auth/upload-avatar")
            .multipart(vec![("avatar".to_string(), image)], Vec::new());
        let uploaded: UploadedUrl = self.client.execute(&request).await?;
        Ok(uploaded.url)
    }
}
