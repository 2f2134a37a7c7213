//! Saved motorcycles of the signed-in user.

use chrono::{DateTime, Utc};
use motodex_api::ApiClient;
use motodex_api::model::Favorite;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::Result;
use crate::cache::CacheValidity;
use crate::catalog::FetchOutcome;
use crate::error::describe;

/// Favorites state container.
#[derive(Debug, Clone, Default)]
pub struct Favorites {
    items: Vec<Favorite>,
    is_loading: bool,
    is_submitting: bool,
    error: Option<String>,
    cache: CacheValidity,
}

impl Favorites {
    /// Creates an empty, stale list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved motorcycles, most recently added first.
    #[must_use]
    pub fn items(&self) -> &[Favorite] {
        &self.items
    }

    /// A list fetch is running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// A mutation is running.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Last error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validity of the list.
    #[must_use]
    pub const fn cache(&self) -> &CacheValidity {
        &self.cache
    }

    /// Time of the last successful sync with the server.
    #[must_use]
    pub const fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.cache.last_fetch()
    }

    /// Whether `motorcycle_id` is in the local list.
    #[must_use]
    pub fn contains(&self, motorcycle_id: &str) -> bool {
        self.items.iter().any(|f| f.motorcycle_id == motorcycle_id)
    }

    /// Forces the next fetch to hit the network.
    pub const fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Clears the last error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Drops all local state, for example after sign-out.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Loads the list unless it is fresh and `force` is false.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn fetch(&mut self, client: &ApiClient, force: bool) -> Result<FetchOutcome> {
        if !force && self.cache.is_fresh() {
            debug!("Favorites are fresh, skipping fetch");
            return Ok(FetchOutcome::Cached);
        }

        self.is_loading = true;
        self.error = None;
        let result = client.favorites().list().await;
        self.is_loading = false;

        match result {
            Ok(items) => {
                self.items = items;
                self.cache.touch();
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                self.error = Some(describe(&err, "Failed to fetch favorites"));
                Err(err.into())
            }
        }
    }

    /// Saves a motorcycle.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn add(
        &mut self,
        client: &ApiClient,
        motorcycle_id: &str,
        notes: Option<&str>,
    ) -> Result<&Favorite> {
        self.begin();
        let result = client.favorites().add(motorcycle_id, notes).await;
        self.is_submitting = false;

        match result {
            Ok(favorite) => Ok(self.insert(favorite)),
            Err(err) => Err(self.fail(err, "Failed to add to favorites")),
        }
    }

    /// Removes a saved motorcycle.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn remove(&mut self, client: &ApiClient, motorcycle_id: &str) -> Result<()> {
        self.begin();
        let result = client.favorites().remove(motorcycle_id).await;
        self.is_submitting = false;

        match result {
            Ok(()) => {
                self.items.retain(|f| f.motorcycle_id != motorcycle_id);
                Ok(())
            }
            Err(err) => Err(self.fail(err, "Failed to remove from favorites")),
        }
    }

    /// Asks the server whether a motorcycle is saved. Failures read as `false`.
    pub async fn check(&self, client: &ApiClient, motorcycle_id: &str) -> bool {
        client.favorites().is_favorite(motorcycle_id).await
    }

    /// Replaces the notes on a saved motorcycle.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn update_notes(
        &mut self,
        client: &ApiClient,
        motorcycle_id: &str,
        notes: &str,
    ) -> Result<&Favorite> {
        self.begin();
        let result = client.favorites().update(motorcycle_id, notes).await;
        self.is_submitting = false;

        match result {
            Ok(updated) => Ok(self.replace(updated)),
            Err(err) => Err(self.fail(err, "Failed to update favorite notes")),
        }
    }

    /// Saves several motorcycles concurrently.
    ///
    /// Successful additions are applied even when some fail; the first
    /// failure in input order is returned.
    ///
    /// # Errors
    ///
    /// Returns the first API error if any request fails.
    pub async fn add_many(
        &mut self,
        client: &ApiClient,
        motorcycle_ids: &[String],
    ) -> Result<usize> {
        self.begin();
        let mut tasks = JoinSet::new();
        for (index, id) in motorcycle_ids.iter().enumerate() {
            let client = client.clone();
            let id = id.clone();
            tasks.spawn(async move { (index, client.favorites().add(&id, None).await) });
        }
        let results = collect_ordered(tasks, motorcycle_ids.len()).await;
        self.is_submitting = false;

        let mut added = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(favorite) => {
                    self.insert(favorite);
                    added += 1;
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(self.fail(err, "Failed to add favorites")),
            None => Ok(added),
        }
    }

    /// Removes several motorcycles concurrently.
    ///
    /// Successful removals are applied even when some fail; the first
    /// failure in input order is returned.
    ///
    /// # Errors
    ///
    /// Returns the first API error if any request fails.
    pub async fn remove_many(
        &mut self,
        client: &ApiClient,
        motorcycle_ids: &[String],
    ) -> Result<usize> {
        self.begin();
        let mut tasks = JoinSet::new();
        for (index, id) in motorcycle_ids.iter().enumerate() {
            let client = client.clone();
            let id = id.clone();
            tasks.spawn(async move {
                let result = client.favorites().remove(&id).await.map(|()| id);
                (index, result)
            });
        }
        let results = collect_ordered(tasks, motorcycle_ids.len()).await;
        self.is_submitting = false;

        let mut removed = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(id) => {
                    self.items.retain(|f| f.motorcycle_id != id);
                    removed += 1;
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(self.fail(err, "Failed to remove favorites")),
            None => Ok(removed),
        }
    }

    fn begin(&mut self) {
        self.is_submitting = true;
        self.error = None;
    }

    fn fail(&mut self, err: motodex_api::Error, fallback: &str) -> crate::Error {
        self.error = Some(describe(&err, fallback));
        err.into()
    }

    fn insert(&mut self, favorite: Favorite) -> &Favorite {
        let index = match self
            .items
            .iter()
            .position(|f| f.motorcycle_id == favorite.motorcycle_id)
        {
            Some(index) => index,
            None => {
                self.items.insert(0, favorite);
                0
            }
        };
        &self.items[index]
    }

    fn replace(&mut self, updated: Favorite) -> &Favorite {
        match self
            .items
            .iter()
            .position(|f| f.motorcycle_id == updated.motorcycle_id)
        {
            Some(index) => {
                self.items[index] = updated;
                &self.items[index]
            }
            None => {
                self.items.insert(0, updated);
                &self.items[0]
            }
        }
    }
}

/// Drains `tasks` and returns their results in spawn order.
async fn collect_ordered<T: 'static>(
    mut tasks: JoinSet<(usize, motodex_api::Result<T>)>,
    len: usize,
) -> Vec<motodex_api::Result<T>> {
    let mut slots: Vec<Option<motodex_api::Result<T>>> = (0..len).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!("Favorite task failed to complete: {e}"),
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| Err(motodex_api::Error::Unknown("task aborted".to_string())))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use motodex_api::{ApiConfig, MemoryCredentialStore, RetryPolicy, SessionCredential};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> ApiClient {
        let config = ApiConfig::new(format!("{}/api", server.uri()))
            .unwrap()
            .with_retry_policy(RetryPolicy::none());
        let store = MemoryCredentialStore::with_credential(SessionCredential::new("token"));
        ApiClient::new(config, Arc::new(store)).unwrap()
    }

    fn favorite(id: &str) -> serde_json::Value {
        json!({"_id": format!("f-{id}"), "userId": "u1", "motorcycleId": id})
    }

    async fn mount_add(server: &MockServer, id: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/favorites"))
            .and(wiremock::matchers::body_partial_json(json!({"motorcycleId": id})))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(json!({"success": status < 400, "data": favorite(id)})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_skips_when_fresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/favorites"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": [favorite("m1")]})),
            )
            .expect(2)
            .mount(&server)
            .await;
        let client = client(&server);

        let mut favorites = Favorites::new();
        assert_eq!(
            favorites.fetch(&client, false).await.unwrap(),
            FetchOutcome::Applied
        );
        assert_eq!(
            favorites.fetch(&client, false).await.unwrap(),
            FetchOutcome::Cached
        );
        assert!(favorites.last_sync().is_some());

        favorites.invalidate();
        favorites.fetch(&client, false).await.unwrap();
        assert!(favorites.contains("m1"));
    }

    #[tokio::test]
    async fn test_add_inserts_once_at_front() {
        let server = MockServer::start().await;
        mount_add(&server, "m1", 200).await;
        mount_add(&server, "m2", 200).await;
        let client = client(&server);

        let mut favorites = Favorites::new();
        favorites.add(&client, "m1", None).await.unwrap();
        favorites.add(&client, "m2", Some("weekend")).await.unwrap();
        favorites.add(&client, "m1", None).await.unwrap();

        let ids: Vec<_> = favorites
            .items()
            .iter()
            .map(|f| f.motorcycle_id.as_str())
            .collect();
        assert_eq!(ids, vec!["m2", "m1"]);
        assert!(!favorites.is_submitting());
    }

    #[tokio::test]
    async fn test_remove_failure_keeps_item() {
        let server = MockServer::start().await;
        mount_add(&server, "m1", 200).await;
        Mock::given(method("DELETE"))
            .and(path("/api/favorites/m1"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Favorite not found"})),
            )
            .mount(&server)
            .await;
        let client = client(&server);

        let mut favorites = Favorites::new();
        favorites.add(&client, "m1", None).await.unwrap();
        assert!(favorites.remove(&client, "m1").await.is_err());

        assert!(favorites.contains("m1"));
        assert_eq!(favorites.error(), Some("Favorite not found"));
    }

    #[tokio::test]
    async fn test_add_many_applies_successes() {
        let server = MockServer::start().await;
        mount_add(&server, "m1", 200).await;
        mount_add(&server, "m2", 500).await;
        mount_add(&server, "m3", 200).await;
        let client = client(&server);

        let mut favorites = Favorites::new();
        let ids = ["m1", "m2", "m3"].map(String::from);
        let err = favorites.add_many(&client, &ids).await.unwrap_err();

        assert!(err.as_api().is_some());
        assert!(favorites.contains("m1"));
        assert!(!favorites.contains("m2"));
        assert!(favorites.contains("m3"));
    }

    #[tokio::test]
    async fn test_remove_many() {
        let server = MockServer::start().await;
        mount_add(&server, "m1", 200).await;
        mount_add(&server, "m2", 200).await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(2)
            .mount(&server)
            .await;
        let client = client(&server);

        let mut favorites = Favorites::new();
        let ids = ["m1", "m2"].map(String::from);
        assert_eq!(favorites.add_many(&client, &ids).await.unwrap(), 2);
        assert_eq!(favorites.remove_many(&client, &ids).await.unwrap(), 2);
        assert!(favorites.items().is_empty());
    }
}
