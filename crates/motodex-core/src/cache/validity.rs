//! Cache validity flag for in-memory collections.

use chrono::{DateTime, Utc};

/// Whether an in-memory collection still reflects its inputs.
///
/// This is a "changed since last fetch" flag, not a TTL: it never expires on
/// its own and only [`invalidate`](Self::invalidate) clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheValidity {
    valid: bool,
    last_fetch: Option<DateTime<Utc>>,
}

impl CacheValidity {
    /// A flag that starts stale.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            valid: false,
            last_fetch: None,
        }
    }

    /// Marks the collection stale. Unconditional.
    pub const fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Marks the collection fresh as of `at`.
    pub const fn mark_fresh(&mut self, at: DateTime<Utc>) {
        self.valid = true;
        self.last_fetch = Some(at);
    }

    /// Marks the collection fresh as of now.
    pub fn touch(&mut self) {
        self.mark_fresh(Utc::now());
    }

    /// Whether the collection can be reused without refetching.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.valid
    }

    /// Time of the last successful fetch, kept across invalidation.
    #[must_use]
    pub const fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_starts_stale() {
        let validity = CacheValidity::new();
        assert!(!validity.is_fresh());
        assert!(validity.last_fetch().is_none());
    }

    #[test]
    fn test_mark_then_invalidate() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single();
        let mut validity = CacheValidity::new();

        if let Some(at) = at {
            validity.mark_fresh(at);
        }
        assert!(validity.is_fresh());

        validity.invalidate();
        assert!(!validity.is_fresh());
        assert_eq!(validity.last_fetch(), at);
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let mut validity = CacheValidity::new();
        validity.invalidate();
        validity.invalidate();
        assert!(!validity.is_fresh());
    }
}
