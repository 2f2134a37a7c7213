//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{Error, FieldError, Result};
use crate::retry::RetryPolicy;

/// API base URL used by development builds.
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:5000/api";

/// API base URL used by release builds.
pub const PRODUCTION_BASE_URL: &str = "https://api.motor-projects.com/api";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build mode that selects the default base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Local development server.
    Development,
    /// Production API.
    Production,
}

impl BuildMode {
    /// Returns the mode of the current build.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Default base URL for this mode.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

/// Configuration for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are joined beneath it.
    pub base_url: Url,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Retry policy for idempotent requests.
    pub retry: RetryPolicy,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl ApiConfig {
    /// Creates a configuration for the given base URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base(base_url.as_ref())?,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            user_agent: format!("motodex/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Creates a configuration for the given build mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in URL cannot be parsed.
    pub fn for_mode(mode: BuildMode) -> Result<Self> {
        Self::new(mode.base_url())
    }

    /// Builds a configuration from the environment.
    ///
    /// Reads `MOTODEX_API_URL`, `MOTODEX_TIMEOUT_MS`, `MOTODEX_RETRY_ATTEMPTS`
    /// and `MOTODEX_RETRY_DELAY_MS`, falling back to the current build mode.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("MOTODEX_API_URL") {
            Ok(url) => Self::new(url)?,
            Err(_) => Self::for_mode(BuildMode::current())?,
        };

        if let Some(ms) = env_number("MOTODEX_TIMEOUT_MS")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = env_number("MOTODEX_RETRY_ATTEMPTS")? {
            config.retry.max_retries = u32::try_from(attempts).map_err(|_| {
                Error::InvalidConfig(format!("MOTODEX_RETRY_ATTEMPTS out of range: {attempts}"))
            })?;
        }
        if let Some(ms) = env_number("MOTODEX_RETRY_DELAY_MS")? {
            config.retry.delay = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Sets the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.base_url = normalize_base(base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolves an endpoint path (with or without a leading slash) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Resolves `path`, then appends each of `segments` as one percent-encoded
    /// path segment, so `/`, `?` and `#` inside an id stay part of the id.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error (status 0) for an empty, `.` or `..`
    /// segment, and an error if the joined URL is invalid.
    pub fn endpoint_with(&self, path: &str, segments: &[String]) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        if segments.is_empty() {
            return Ok(url);
        }
        if let Some(bad) = segments
            .iter()
            .find(|s| matches!(s.as_str(), "" | "." | ".."))
        {
            return Err(Error::Validation {
                status: 0,
                message: format!("Invalid identifier {bad:?}"),
                fields: vec![FieldError::new("id", "Identifier is not a valid path segment")],
            });
        }
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Ensures the base URL ends in a slash so `join` keeps its last segment.
fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn env_number(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{name} must be a number, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}
