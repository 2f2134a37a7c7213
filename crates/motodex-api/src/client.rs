//! HTTP client with authentication-aware recovery.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::credentials::{CredentialStore, SessionCredential};
use crate::endpoints::{Auth, Favorites, Motorcycles, Reviews, StatsApi, Uploads};
use crate::envelope::{ListResponse, error_from_status, normalize_envelope, normalize_list};
use crate::error::{Error, Result};
use crate::model::RefreshPayload;
use crate::refresh::RefreshLatch;
use crate::request::{RequestBody, RequestDescriptor};
use crate::retry::{Outcome, Recovery, Step};

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// A 2xx response body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status.
    pub status: u16,
    /// Body bytes.
    pub body: Vec<u8>,
}

/// What one physical attempt produced.
enum Attempt {
    Response { status: StatusCode, body: Vec<u8> },
    Transport(String),
}

struct Inner {
    http: Client,
    config: ApiConfig,
    credentials: Arc<dyn CredentialStore>,
    latch: RefreshLatch,
}

/// Client for the catalogue API.
///
/// Cloning is cheap; clones share the connection pool, credential store and
/// refresh latch.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ApiConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                credentials,
                latch: RefreshLatch::new(),
            }),
        })
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Credential store shared with the client.
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    /// Motorcycle endpoints.
    #[must_use]
    pub const fn motorcycles(&self) -> Motorcycles<'_> {
        Motorcycles::new(self)
    }

    /// Authentication endpoints.
    #[must_use]
    pub const fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    /// Favorite endpoints.
    #[must_use]
    pub const fn favorites(&self) -> Favorites<'_> {
        Favorites::new(self)
    }

    /// Review endpoints.
    #[must_use]
    pub const fn reviews(&self) -> Reviews<'_> {
        Reviews::new(self)
    }

    /// Statistics endpoints.
    #[must_use]
    pub const fn stats(&self) -> StatsApi<'_> {
        StatsApi::new(self)
    }

    /// Upload endpoints.
    #[must_use]
    pub const fn uploads(&self) -> Uploads<'_> {
        Uploads::new(self)
    }

    /// Executes a request and unwraps the single-resource envelope.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the recovery state machine, or
    /// `Unknown` if the body does not match `T`.
    pub async fn execute<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<T> {
        let response = self.execute_raw(request).await?;
        normalize_envelope(response.status, &response.body)
    }

    /// Executes a request whose payload is irrelevant.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the recovery state machine.
    pub async fn execute_unit(&self, request: &RequestDescriptor) -> Result<()> {
        let response = self.execute_raw(request).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        match serde_json::from_slice::<Value>(&response.body) {
            Ok(Value::Object(map)) if map.get("success") == Some(&Value::Bool(false)) => {
                normalize_envelope::<Value>(response.status, &response.body).map(|_| ())
            }
            _ => Ok(()),
        }
    }

    /// Executes a request against a list endpoint.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the recovery state machine, or
    /// `Unknown` if the body is not a list response.
    pub async fn execute_list<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<ListResponse<T>> {
        let response = self.execute_raw(request).await?;
        normalize_list(response.status, &response.body)
    }

    /// Runs one logical request through dispatch, retry and refresh.
    ///
    /// # Errors
    ///
    /// * `Network` when no response arrived and retries are exhausted or the
    ///   request is not idempotent.
    /// * `Unauthorized` when a 401 could not be recovered.
    /// * `Server` / `Validation` for any other non-2xx status.
    pub async fn execute_raw(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let url = self.resolve(request)?;
        let mut recovery = Recovery::new(
            self.inner.config.retry,
            request.idempotent,
            request.refreshable,
        );

        loop {
            let generation = self.inner.latch.generation();
            let attempt = recovery.begin_attempt();
            debug!(
                method = %request.method,
                path = %request.target(),
                attempt,
                "Dispatching request"
            );

            let result = self.dispatch(request, url.clone()).await;
            let outcome = match &result {
                Attempt::Response { status, .. } => Outcome::from_status(*status),
                Attempt::Transport(_) => Outcome::Transport,
            };

            match (recovery.next_step(&outcome), result) {
                (Step::Succeed, Attempt::Response { status, body }) => {
                    return Ok(RawResponse {
                        status: status.as_u16(),
                        body,
                    });
                }
                (Step::Refresh, _) => {
                    debug!(path = %request.target(), "Access token rejected, refreshing");
                    let outcome = self
                        .inner
                        .latch
                        .refresh(generation, || self.refresh_access_token())
                        .await;
                    if !outcome.should_replay() {
                        return Err(Error::Unauthorized(
                            "Session expired, please log in again".to_string(),
                        ));
                    }
                }
                (Step::Backoff, Attempt::Transport(reason)) => {
                    warn!(
                        path = %request.target(),
                        attempt,
                        %reason,
                        "Network failure, retrying in {:?}",
                        recovery.delay()
                    );
                    tokio::time::sleep(recovery.delay()).await;
                }
                (Step::FailNetwork, Attempt::Transport(reason)) => {
                    warn!(
                        path = %request.target(),
                        attempts = recovery.attempts(),
                        %reason,
                        "Giving up after network failure"
                    );
                    return Err(Error::Network(reason));
                }
                (Step::FailUnauthorized | Step::FailStatus, Attempt::Response { status, body }) => {
                    return Err(error_from_status(status.as_u16(), &body));
                }
                (step, _) => {
                    return Err(Error::Unknown(format!(
                        "inconsistent recovery step {step:?} for {}",
                        request.target()
                    )));
                }
            }
        }
    }

    /// Full URL of a request, query included.
    fn resolve(&self, request: &RequestDescriptor) -> Result<Url> {
        let mut url = self
            .inner
            .config
            .endpoint_with(&request.path, &request.segments)?;
        if !request.query.is_empty() {
            url.set_query(Some(&request.query.to_query_string()));
        }
        Ok(url)
    }

    /// Sends one physical attempt.
    async fn dispatch(&self, request: &RequestDescriptor, url: Url) -> Attempt {
        let mut builder = self.inner.http.request(request.method.clone(), url);

        if let Some(value) = self.bearer() {
            builder = builder.header(AUTHORIZATION, value);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart { .. } => match request.body.to_form() {
                Ok(Some(form)) => builder.multipart(form),
                Ok(None) => builder,
                Err(e) => return Attempt::Transport(e.to_string()),
            },
        };

        match builder.send().await {
            Ok(response) => {
                let status = response.status();
                match response.bytes().await {
                    Ok(body) => Attempt::Response {
                        status,
                        body: body.to_vec(),
                    },
                    Err(e) => Attempt::Transport(e.to_string()),
                }
            }
            Err(e) => Attempt::Transport(e.to_string()),
        }
    }

    /// Authorization header for the current access token, if any.
    ///
    /// A storage failure is logged and the request goes out unauthenticated.
    fn bearer(&self) -> Option<HeaderValue> {
        match self.inner.credentials.access_token() {
            Ok(Some(token)) => HeaderValue::from_str(&format!("Bearer {token}")).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read access token: {e}");
                None
            }
        }
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// On any failure the stored credential is cleared (forced logout).
    async fn refresh_access_token(&self) -> bool {
        match self.try_refresh().await {
            Ok(()) => {
                info!("Access token refreshed");
                true
            }
            Err(e) => {
                warn!("Token refresh failed, clearing session: {e}");
                if let Err(clear_err) = self.inner.credentials.clear() {
                    warn!("Failed to clear credentials: {clear_err}");
                }
                false
            }
        }
    }

    async fn try_refresh(&self) -> Result<()> {
        let refresh_token = self
            .inner
            .credentials
            .refresh_token()?
            .ok_or_else(|| Error::Unauthorized("No refresh token available".to_string()))?;

        let url = self.inner.config.endpoint(REFRESH_PATH)?;
        let response = self
            .inner
            .http
            .post(url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(error_from_status(status.as_u16(), &body));
        }

        let payload = parse_refresh_payload(&body)?;
        match payload.refresh_token {
            Some(rotated) => self.inner.credentials.store(
                &SessionCredential::new(payload.token).with_refresh_token(rotated),
            )?,
            None => self.inner.credentials.set_access_token(&payload.token)?,
        }
        Ok(())
    }
}

/// Accepts the refresh payload wrapped in an envelope or bare.
pub(crate) fn parse_refresh_payload(body: &[u8]) -> Result<RefreshPayload> {
    let value: Value = serde_json::from_slice(body)?;
    let payload = match value.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => value,
    };
    Ok(serde_json::from_value(payload)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;

    #[test]
    fn test_refresh_payload_shapes() {
        let wrapped =
            parse_refresh_payload(br#"{"success": true, "data": {"token": "a"}}"#).unwrap();
        assert_eq!(wrapped.token, "a");

        let bare = parse_refresh_payload(br#"{"token": "b", "refreshToken": "r"}"#).unwrap();
        assert_eq!(bare.token, "b");
        assert_eq!(bare.refresh_token.as_deref(), Some("r"));

        assert!(parse_refresh_payload(br#"{"data": {}}"#).is_err());
    }

    #[test]
    fn test_bearer_header() {
        let store = Arc::new(MemoryCredentialStore::with_credential(SessionCredential::new(
            "abc",
        )));
        let client =
            ApiClient::new(ApiConfig::new("http://localhost:5000/api").unwrap(), store).unwrap();
        assert_eq!(client.bearer().unwrap(), "Bearer abc");
    }

    #[test]
    fn test_no_bearer_without_token() {
        let client = ApiClient::new(
            ApiConfig::new("http://localhost:5000/api").unwrap(),
            Arc::new(MemoryCredentialStore::new()),
        )
        .unwrap();
        assert!(client.bearer().is_none());
    }
}
