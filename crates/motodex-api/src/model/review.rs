//! Reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-aspect scores of a review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewScores {
    /// Overall score.
    pub overall: f64,
    /// Performance score.
    pub performance: f64,
    /// Comfort score.
    pub comfort: f64,
    /// Reliability score.
    pub reliability: f64,
    /// Value-for-money score.
    pub value: f64,
    /// Styling score.
    pub styling: f64,
}

impl ReviewScores {
    /// The same score for every aspect.
    #[must_use]
    pub fn uniform(score: u8) -> Self {
        let score = f64::from(score);
        Self {
            overall: score,
            performance: score,
            comfort: score,
            reliability: score,
            value: score,
            styling: score,
        }
    }
}

/// Author summary embedded in a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    /// Display name.
    pub username: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Ownership details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    /// How long the reviewer has owned the bike.
    pub duration: String,
    /// Distance ridden.
    pub mileage: u32,
    /// Primary use.
    pub use_case: String,
}

/// Helpful votes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Helpful {
    /// Vote count.
    pub count: u32,
    /// Ids of users who voted.
    #[serde(default)]
    pub users: Vec<String>,
}

/// A review of a motorcycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Server identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Reviewed motorcycle.
    pub motorcycle_id: String,
    /// Author id.
    #[serde(default)]
    pub user_id: String,
    /// Author summary.
    #[serde(default)]
    pub user: ReviewAuthor,
    /// Scores.
    pub rating: ReviewScores,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Positive points.
    #[serde(default)]
    pub pros: Vec<String>,
    /// Negative points.
    #[serde(default)]
    pub cons: Vec<String>,
    /// Ownership details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Ownership>,
    /// Helpful votes.
    #[serde(default)]
    pub helpful: Helpful,
    /// Verified owner.
    #[serde(default)]
    pub verified: bool,
    /// Attached image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Whether `user_id` has marked this review helpful.
    #[must_use]
    pub fn is_helpful_for(&self, user_id: &str) -> bool {
        self.helpful.users.iter().any(|u| u == user_id)
    }
}

/// Body for submitting a review.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// Reviewed motorcycle.
    pub motorcycle_id: String,
    /// Scores.
    pub rating: ReviewScores,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Positive points.
    pub pros: Vec<String>,
    /// Negative points.
    pub cons: Vec<String>,
    /// Ownership details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Ownership>,
    /// Attached image URLs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Partial review update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    /// New scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<ReviewScores>,
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New positive points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pros: Option<Vec<String>>,
    /// New negative points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cons: Option<Vec<String>>,
}

/// One page of reviews for a motorcycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewPage {
    /// Reviews on this page.
    pub reviews: Vec<Review>,
    /// Total reviews for the motorcycle.
    pub total: u64,
}
