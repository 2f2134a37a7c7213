//! Application store.
//!
//! Owns the API client and every state container, and implements the
//! actions that touch more than one of them.

use std::sync::Arc;

use motodex_api::model::{Motorcycle, NewReview, Review, Stats};
use motodex_api::{ApiClient, ApiConfig, CredentialStore};
use tracing::{debug, info, warn};

use crate::Result;
use crate::cache::TtlCache;
use crate::catalog::Catalog;
use crate::credentials::KeyringCredentialStore;
use crate::favorites::Favorites;
use crate::reviews::Reviews;
use crate::search::SearchHistory;
use crate::session::AuthSession;
use crate::settings::Settings;
use crate::storage::Storage;

const STATS_CACHE_KEY: &str = "stats";

fn motorcycle_cache_key(id: &str) -> String {
    format!("motorcycle:{id}")
}

/// Client plus all state containers.
#[derive(Debug)]
pub struct Store {
    client: ApiClient,
    cache: TtlCache,
    /// Authentication session.
    pub session: AuthSession,
    /// Motorcycle catalogue.
    pub catalog: Catalog,
    /// Saved motorcycles.
    pub favorites: Favorites,
    /// Reviews.
    pub reviews: Reviews,
    /// Search input and history.
    pub search: SearchHistory,
    /// App settings.
    pub settings: Settings,
}

impl Store {
    /// Builds a store over an existing client and storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cache cannot be initialized.
    pub async fn new(client: ApiClient, storage: Storage) -> Result<Self> {
        let cache = TtlCache::attach(&storage).await?;
        Ok(Self {
            client,
            cache,
            session: AuthSession::new(storage.clone()),
            catalog: Catalog::new(),
            favorites: Favorites::new(),
            reviews: Reviews::new(),
            search: SearchHistory::new(storage.clone()),
            settings: Settings::new(storage),
        })
    }

    /// Opens the on-disk database and keeps tokens in the system keyring.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the client
    /// cannot be built.
    pub async fn open(config: ApiConfig, database_path: &str) -> Result<Self> {
        let profile = config.base_url.host_str().unwrap_or("default").to_string();
        let credentials: Arc<dyn CredentialStore> = Arc::new(KeyringCredentialStore::new(profile));
        let client = ApiClient::new(config, credentials)?;
        let storage = Storage::new(database_path).await?;
        Self::new(client, storage).await
    }

    /// The API client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Loads persisted state and restores the session.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be read.
    pub async fn start(&mut self) -> Result<bool> {
        self.settings.load().await?;
        self.search.load().await?;
        let purged = self.cache.purge_expired().await?;
        debug!(purged, "Store started");
        self.session.restore(&self.client).await
    }

    /// One motorcycle, served from the item cache when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the cache fails.
    pub async fn motorcycle(&mut self, id: &str) -> Result<&Motorcycle> {
        let key = motorcycle_cache_key(id);
        if let Some(cached) = self.cache.get::<Motorcycle>(&key).await? {
            debug!(id, "Serving motorcycle from cache");
            return Ok(self.catalog.select(cached));
        }

        let fetched = self.catalog.fetch_by_id(&self.client, id).await?.clone();
        self.cache.set(&key, &fetched, None).await?;
        Ok(self.catalog.select(fetched))
    }

    /// Catalogue statistics, served from the item cache when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the cache fails.
    pub async fn stats(&self) -> Result<Stats> {
        if let Some(cached) = self.cache.get(STATS_CACHE_KEY).await? {
            return Ok(cached);
        }

        let stats = self.client.stats().overview().await?;
        self.cache.set(STATS_CACHE_KEY, &stats, None).await?;
        Ok(stats)
    }

    /// Saves a motorcycle and records it on the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or storage fails.
    pub async fn add_favorite(&mut self, motorcycle_id: &str, notes: Option<&str>) -> Result<()> {
        self.favorites
            .add(&self.client, motorcycle_id, notes)
            .await?;
        self.session.add_favorite_to_user(motorcycle_id);
        self.session.persist_user().await
    }

    /// Removes a saved motorcycle from the server and the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or storage fails.
    pub async fn remove_favorite(&mut self, motorcycle_id: &str) -> Result<()> {
        self.favorites.remove(&self.client, motorcycle_id).await?;
        self.session.remove_favorite_from_user(motorcycle_id);
        self.session.persist_user().await
    }

    /// Submits a review, records it on the user and refreshes the rating
    /// shown in the catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or storage fails.
    pub async fn submit_review(&mut self, review: &NewReview) -> Result<Review> {
        let created = self.reviews.submit(&self.client, review).await?.clone();
        self.session.add_review_to_user(&created.id);
        self.session.persist_user().await?;

        if self.reviews.motorcycle_id() == Some(review.motorcycle_id.as_str()) {
            let stats = self.reviews.stats();
            let count = u32::try_from(self.reviews.total()).unwrap_or(u32::MAX);
            self.catalog
                .update_rating(&review.motorcycle_id, stats.average, count);
        }
        if let Err(e) = self
            .cache
            .clear(Some(&motorcycle_cache_key(&review.motorcycle_id)))
            .await
        {
            warn!("Failed to evict cached motorcycle: {e}");
        }

        Ok(created)
    }

    /// Signs out and drops all per-user state.
    ///
    /// # Errors
    ///
    /// Returns an error if local credentials or storage cannot be cleared.
    pub async fn logout(&mut self) -> Result<()> {
        let result = self.session.logout(&self.client).await;
        self.favorites.clear();
        self.reviews.clear();
        self.cache.clear(None).await?;
        info!("Cleared per-user state");
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use motodex_api::model::LoginCredentials;
    use motodex_api::{MemoryCredentialStore, RetryPolicy};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn store(server: &MockServer) -> Store {
        let config = ApiConfig::new(format!("{}/api", server.uri()))
            .unwrap()
            .with_retry_policy(RetryPolicy::none());
        let client = ApiClient::new(config, Arc::new(MemoryCredentialStore::new())).unwrap();
        Store::new(client, Storage::in_memory().await.unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_motorcycle_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/motorcycles/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"_id": "m1", "brand": "KTM", "model": "Duke", "year": 2024, "category": "naked"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = store(&server).await;
        assert_eq!(store.motorcycle("m1").await.unwrap().model, "Duke");
        assert_eq!(store.motorcycle("m1").await.unwrap().model, "Duke");
        assert_eq!(store.catalog.selected().unwrap().id, "m1");
    }

    #[tokio::test]
    async fn test_add_favorite_updates_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "user": {"_id": "u1", "username": "rider", "email": "rider@example.com"},
                    "token": "t"
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/favorites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"_id": "f1", "motorcycleId": "m1"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let mut store = store(&server).await;
        let client = store.client().clone();
        store
            .session
            .login(&client, &LoginCredentials::new("rider@example.com", "pw123456"))
            .await
            .unwrap();

        store.add_favorite("m1", None).await.unwrap();
        assert!(store.favorites.contains("m1"));
        assert_eq!(store.session.user().unwrap().favorites, vec!["m1"]);

        store.logout().await.unwrap();
        assert!(store.favorites.items().is_empty());
        assert!(!store.session.is_authenticated());
    }
}
