//! Expiring key-value cache.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::{Result, Storage};

/// Default lifetime of a cached entry, in seconds (24 hours).
pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

/// Cache of JSON values that expire after a fixed lifetime.
///
/// Independent of [`CacheValidity`](super::CacheValidity); used for
/// discrete items such as profile blobs.
#[derive(Debug, Clone)]
pub struct TtlCache {
    pool: SqlitePool,
}

impl TtlCache {
    /// Attach a cache to an existing store's database.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub async fn attach(storage: &Storage) -> Result<Self> {
        let cache = Self {
            pool: storage.pool().clone(),
        };
        cache.initialize().await?;
        Ok(cache)
    }

    /// Create an in-memory cache for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let cache = Self { pool };
        cache.initialize().await?;
        Ok(cache)
    }

    /// The default entry lifetime.
    #[must_use]
    pub fn default_ttl() -> TimeDelta {
        TimeDelta::seconds(DEFAULT_TTL_SECS)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ttl_cache (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                stored_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Cache a value. `ttl` defaults to 24 hours.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database query fails.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<TimeDelta>,
    ) -> Result<()> {
        let now = Utc::now();
        let expires_at = now + ttl.unwrap_or_else(Self::default_ttl);

        sqlx::query(
            r"
            INSERT INTO ttl_cache (key, value, stored_at, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                stored_at = excluded.stored_at,
                expires_at = excluded.expires_at
            ",
        )
        .bind(key)
        .bind(serde_json::to_string(value)?)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read a cached value. Expired entries are deleted and read as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the value does not
    /// deserialize as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let row = sqlx::query(r"SELECT value, expires_at FROM ttl_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: String = row.get("expires_at");
        let expired = DateTime::parse_from_rfc3339(&expires_at)
            .map_or(true, |at| at.with_timezone(&Utc) <= Utc::now());
        if expired {
            debug!(key, "Cache entry expired");
            self.clear(Some(key)).await?;
            return Ok(None);
        }

        let value: String = row.get("value");
        Ok(Some(serde_json::from_str(&value)?))
    }

    /// Remove one entry, or every entry when `key` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn clear(&self, key: Option<&str>) -> Result<()> {
        match key {
            Some(key) => {
                sqlx::query(r"DELETE FROM ttl_cache WHERE key = ?")
                    .bind(key)
                    .execute(&self.pool)
                    .await?;
            }
            None => {
                sqlx::query(r"DELETE FROM ttl_cache")
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }

    /// Delete every expired entry and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn purge_expired(&self) -> Result<u64> {
        let rows = sqlx::query(r"SELECT key, expires_at FROM ttl_cache")
            .fetch_all(&self.pool)
            .await?;

        let now = Utc::now();
        let mut removed = 0;
        for row in rows {
            let expires_at: String = row.get("expires_at");
            let expired = DateTime::parse_from_rfc3339(&expires_at)
                .map_or(true, |at| at.with_timezone(&Utc) <= now);
            if expired {
                let key: String = row.get("key");
                self.clear(Some(&key)).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_entry_is_returned() {
        let cache = TtlCache::in_memory().await.unwrap();
        cache.set("profile", &"rider", None).await.unwrap();

        let value: Option<String> = cache.get("profile").await.unwrap();
        assert_eq!(value.as_deref(), Some("rider"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed() {
        let cache = TtlCache::in_memory().await.unwrap();
        cache
            .set("profile", &"rider", Some(TimeDelta::zero()))
            .await
            .unwrap();

        let value: Option<String> = cache.get("profile").await.unwrap();
        assert!(value.is_none());
        assert_eq!(cache.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_and_clear() {
        let cache = TtlCache::in_memory().await.unwrap();
        cache.set("old", &1, Some(TimeDelta::seconds(-5))).await.unwrap();
        cache.set("new", &2, None).await.unwrap();

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert_eq!(cache.get::<i32>("new").await.unwrap(), Some(2));

        cache.clear(None).await.unwrap();
        assert!(cache.get::<i32>("new").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attach_shares_database() {
        let storage = Storage::in_memory().await.unwrap();
        let cache = TtlCache::attach(&storage).await.unwrap();
        cache.set("k", &"v", None).await.unwrap();

        let again = TtlCache::attach(&storage).await.unwrap();
        assert_eq!(again.get::<String>("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_default_ttl_is_a_day() {
        assert_eq!(TtlCache::default_ttl().num_hours(), 24);
    }
}
