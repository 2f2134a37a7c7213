//! Favorites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Motorcycle;

/// A motorcycle saved by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    /// Server identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Owner id.
    #[serde(default)]
    pub user_id: String,
    /// Saved motorcycle id.
    pub motorcycle_id: String,
    /// Embedded motorcycle, when the server populates it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motorcycle: Option<Motorcycle>,
    /// When the favorite was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
    /// User notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of the favorite check endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCheck {
    /// Whether the motorcycle is saved.
    pub is_favorite: bool,
}
