//! Result caching.
//!
//! Two independent mechanisms live here: a validity flag that state
//! containers use to skip redundant fetches, and an expiring key-value cache
//! for discrete items.

mod repository;
mod validity;

pub use repository::{DEFAULT_TTL_SECS, TtlCache};
pub use validity::CacheValidity;
