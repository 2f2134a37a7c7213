//! Favorite endpoints.

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Result;
use crate::model::{Favorite, FavoriteCheck};
use crate::request::RequestDescriptor;

/// `/favorites` routes.
#[derive(Debug, Clone, Copy)]
pub struct Favorites<'a> {
    client: &'a ApiClient,
}

impl<'a> Favorites<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The user's favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn list(&self) -> Result<Vec<Favorite>> {
        self.client
            .execute(&RequestDescriptor::get("/favorites"))
            .await
    }

    /// Saves a motorcycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn add(&self, motorcycle_id: &str, notes: Option<&str>) -> Result<Favorite> {
        let request = RequestDescriptor::post("/favorites")
            .json(&json!({ "motorcycleId": motorcycle_id, "notes": notes }))?;
        self.client.execute(&request).await
    }

    /// Removes a saved motorcycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove(&self, motorcycle_id: &str) -> Result<()> {
        self.client
            .execute_unit(&RequestDescriptor::delete("/favorites").segment(motorcycle_id))
            .await
    }

    /// Replaces the notes on a saved motorcycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update(&self, motorcycle_id: &str, notes: &str) -> Result<Favorite> {
        let request = RequestDescriptor::put("/favorites")
            .segment(motorcycle_id)
            .json(&json!({ "notes": notes }))?;
        self.client.execute(&request).await
    }

    /// Whether a motorcycle is saved. Any failure reads as "not saved".
    pub async fn is_favorite(&self, motorcycle_id: &str) -> bool {
        let request = RequestDescriptor::get("/favorites/check").segment(motorcycle_id);
        match self.client.execute::<FavoriteCheck>(&request).await {
            Ok(check) => check.is_favorite,
            Err(e) => {
                debug!(motorcycle_id, "Favorite check failed, assuming not saved: {e}");
                false
            }
        }
    }
}
