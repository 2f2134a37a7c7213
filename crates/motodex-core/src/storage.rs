//! Persistent key-value storage.
//!
//! Small serialized blobs (the logged-in user, search history, app
//! settings) live in one `SQLite` table keyed by name.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::Result;

/// Key of the serialized logged-in user.
pub const USER_KEY: &str = "user";

/// Key of the serialized search history.
pub const SEARCH_HISTORY_KEY: &str = "search_history";

/// Key of the serialized app settings.
pub const APP_SETTINGS_KEY: &str = "app_settings";

/// Key set once the app has been launched.
pub const FIRST_LAUNCH_KEY: &str = "first_launch_done";

/// Key-value store backed by `SQLite`.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and table if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let storage = Self { pool };
        storage.initialize().await?;
        Ok(storage)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let storage = Self { pool };
        storage.initialize().await?;
        Ok(storage)
    }

    pub(crate) const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(r"SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    /// Write a raw value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(key, "Stored value");
        Ok(())
    }

    /// Delete a value. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query(r"DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete several values.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Read and deserialize a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored value is not valid JSON for `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the query fails.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let storage = Storage::in_memory().await.unwrap();
        assert!(storage.get("k").await.unwrap().is_none());

        storage.set("k", "one").await.unwrap();
        storage.set("k", "two").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let storage = Storage::in_memory().await.unwrap();
        storage
            .set_json(SEARCH_HISTORY_KEY, &vec!["honda", "ducati"])
            .await
            .unwrap();

        let history: Vec<String> = storage.get_json(SEARCH_HISTORY_KEY).await.unwrap().unwrap();
        assert_eq!(history, vec!["honda", "ducati"]);
    }

    #[tokio::test]
    async fn test_multi_remove() {
        let storage = Storage::in_memory().await.unwrap();
        storage.set(USER_KEY, "{}").await.unwrap();
        storage.set(APP_SETTINGS_KEY, "{}").await.unwrap();

        storage
            .multi_remove(&[USER_KEY, APP_SETTINGS_KEY, "missing"])
            .await
            .unwrap();
        assert!(storage.get(USER_KEY).await.unwrap().is_none());
        assert!(storage.get(APP_SETTINGS_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_error() {
        let storage = Storage::in_memory().await.unwrap();
        storage.set(USER_KEY, "not json").await.unwrap();
        assert!(storage.get_json::<Vec<String>>(USER_KEY).await.is_err());
    }
}
