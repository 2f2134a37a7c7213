//! Typed endpoint groups.
//!
//! Each group borrows the [`ApiClient`](crate::ApiClient) and maps one
//! server route to one method. Reads are built as idempotent `GET`s and go
//! through retry; writes are never retried.

mod auth;
mod favorites;
mod motorcycles;
mod reviews;
mod stats;
mod uploads;

pub use auth::Auth;
pub use favorites::Favorites;
pub use motorcycles::Motorcycles;
pub use reviews::Reviews;
pub use stats::StatsApi;
pub use uploads::Uploads;
