//! # motodex-core
//!
//! State and local persistence for the Motodex catalogue client.
//!
//! This crate provides:
//! - State containers for the catalogue, session, favorites, reviews, search
//!   and settings
//! - Cache validity flags and latest-wins fetch ordering
//! - Local storage (`SQLite`) and an expiring item cache
//! - System keyring credential storage
//! - Input validation ahead of network calls

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod catalog;
pub mod credentials;
mod error;
pub mod favorites;
pub mod reviews;
pub mod search;
pub mod sequence;
pub mod session;
pub mod settings;
pub mod storage;
pub mod store;
pub mod validation;

pub use cache::{CacheValidity, DEFAULT_TTL_SECS, TtlCache};
pub use catalog::{Catalog, FetchOutcome};
pub use credentials::{CredentialError, CredentialResult, KeyringCredentialStore};
pub use error::{Error, Result, describe};
pub use favorites::Favorites;
pub use reviews::{ReviewSort, ReviewStats, Reviews};
pub use search::{SearchEntry, SearchHistory};
pub use sequence::{FetchSequence, Ticket};
pub use session::AuthSession;
pub use settings::{AppSettings, Settings, SettingsUpdate, Theme};
pub use storage::Storage;
pub use store::Store;
pub use validation::{ValidationError, ValidationResult};
