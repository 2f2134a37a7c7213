//! # motodex-api
//!
//! Resilient REST client for the Motodex motorcycle catalogue.
//!
//! ## Features
//!
//! - **Request pipeline**: base URL resolution, bearer authentication and
//!   repeated-key query serialization for list filters
//! - **Failure recovery**: idempotent requests are retried on connection-level
//!   failure with a fixed delay; a 401 triggers one token refresh and replay
//! - **Single-flight refresh**: concurrent 401s share one refresh call
//! - **Envelope normalization**: `{success, data}` envelopes and bare list
//!   bodies come back as the same typed values
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use motodex_api::{ApiClient, ApiConfig, MemoryCredentialStore};
//! use motodex_api::model::{LoginCredentials, MotorcycleFilters, Pagination};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Arc::new(MemoryCredentialStore::new());
//!     let client = ApiClient::new(ApiConfig::from_env()?, credentials)?;
//!
//!     let auth = client
//!         .auth()
//!         .login(&LoginCredentials::new("rider@example.com", "secret"))
//!         .await?;
//!     println!("Logged in as {}", auth.user.username);
//!
//!     let filters = MotorcycleFilters::new().with_brands(["Honda", "Yamaha"]);
//!     let page = client
//!         .motorcycles()
//!         .list(Some(&filters), Some(Pagination::new(2, 20)?))
//!         .await?;
//!     for bike in &page.items {
//!         println!("{}", bike.display_name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Recovery Rules
//!
//! - Only requests without an HTTP response are retried, and only when the
//!   request is idempotent (`GET` by default)
//! - A 401 on a refreshable request refreshes once; a second 401 is final
//! - A failed refresh clears the credential store (forced logout)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod envelope;
mod error;
pub mod model;
pub mod query;
pub mod refresh;
pub mod request;
pub mod retry;

pub use client::{ApiClient, REFRESH_PATH, RawResponse};
pub use config::{ApiConfig, BuildMode, DEFAULT_TIMEOUT};
pub use credentials::{CredentialStore, MemoryCredentialStore, SessionCredential};
pub use envelope::{ListFilters, ListResponse};
pub use error::{Error, ErrorKind, FieldError, NETWORK_ERROR_MESSAGE, Result};
pub use query::{QueryParams, QueryValue, ToQuery};
pub use request::{RequestBody, RequestDescriptor};
pub use retry::RetryPolicy;
