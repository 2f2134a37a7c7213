//! Reviews of the motorcycle being viewed and of the signed-in user.

use std::cmp::Ordering;

use motodex_api::ApiClient;
use motodex_api::model::{DEFAULT_PAGE_SIZE, NewReview, Review, ReviewUpdate};
use tracing::debug;

use crate::Result;
use crate::catalog::FetchOutcome;
use crate::error::describe;

/// Aggregate of the loaded reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReviewStats {
    /// Mean overall score, 0 when there are no reviews.
    pub average: f64,
    /// Number of reviews counted.
    pub total_count: usize,
    /// Count of reviews per rounded overall score, index 0 is one star.
    pub distribution: [u32; 5],
}

impl ReviewStats {
    /// Computes stats over `reviews`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut stats = Self {
            total_count: reviews.len(),
            ..Self::default()
        };
        if reviews.is_empty() {
            return stats;
        }

        let mut sum = 0.0;
        for review in reviews {
            let overall = review.rating.overall;
            sum += overall;
            let stars = overall.round().clamp(1.0, 5.0) as usize;
            stats.distribution[stars - 1] += 1;
        }
        stats.average = sum / reviews.len() as f64;
        stats
    }
}

/// Display order for reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewSort {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Highest overall score first.
    HighestRated,
    /// Lowest overall score first.
    LowestRated,
    /// Most helpful votes first.
    MostHelpful,
}

impl ReviewSort {
    fn compare(self, a: &Review, b: &Review) -> Ordering {
        match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::HighestRated => b.rating.overall.total_cmp(&a.rating.overall),
            Self::LowestRated => a.rating.overall.total_cmp(&b.rating.overall),
            Self::MostHelpful => b.helpful.count.cmp(&a.helpful.count),
        }
    }
}

/// Reviews state container.
#[derive(Debug, Clone)]
pub struct Reviews {
    motorcycle_id: Option<String>,
    reviews: Vec<Review>,
    mine: Vec<Review>,
    total: u64,
    page: u32,
    page_size: u32,
    is_loading: bool,
    is_submitting: bool,
    error: Option<String>,
}

impl Default for Reviews {
    fn default() -> Self {
        Self::new()
    }
}

impl Reviews {
    /// Creates an empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            motorcycle_id: None,
            reviews: Vec::new(),
            mine: Vec::new(),
            total: 0,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            is_loading: false,
            is_submitting: false,
            error: None,
        }
    }

    /// Motorcycle whose reviews are loaded.
    #[must_use]
    pub fn motorcycle_id(&self) -> Option<&str> {
        self.motorcycle_id.as_deref()
    }

    /// Loaded reviews in server order.
    #[must_use]
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Loaded reviews in the given order.
    #[must_use]
    pub fn sorted(&self, sort: ReviewSort) -> Vec<&Review> {
        let mut sorted: Vec<_> = self.reviews.iter().collect();
        sorted.sort_by(|a, b| sort.compare(a, b));
        sorted
    }

    /// Reviews written by the signed-in user.
    #[must_use]
    pub fn mine(&self) -> &[Review] {
        &self.mine
    }

    /// Total reviews the server holds for the motorcycle.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Last page loaded, 0 before the first fetch.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Whether the server holds more reviews than are loaded.
    #[must_use]
    pub fn has_more(&self) -> bool {
        (self.reviews.len() as u64) < self.total
    }

    /// A fetch is running.
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

    /// Aggregate of the loaded reviews.
    #[must_use]
    pub fn stats(&self) -> ReviewStats {
        ReviewStats::from_reviews(&self.reviews)
    }

    /// Clears the last error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Drops all loaded reviews.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Loads a page of reviews for a motorcycle.
    ///
    /// Page 1, or a different motorcycle, replaces the list; later pages
    /// append.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn fetch(
        &mut self,
        client: &ApiClient,
        motorcycle_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<&[Review]> {
        let page = page.max(1);
        let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };
        self.is_loading = true;
        self.error = None;

        let result = client
            .reviews()
            .for_motorcycle(motorcycle_id, page, limit)
            .await;
        self.is_loading = false;

        let response = match result {
            Ok(response) => response,
            Err(err) => return Err(self.fail(err, "Failed to fetch reviews")),
        };

        let same_motorcycle = self.motorcycle_id.as_deref() == Some(motorcycle_id);
        if page == 1 || !same_motorcycle {
            self.reviews = response.reviews;
        } else {
            self.reviews.extend(response.reviews);
        }
        self.motorcycle_id = Some(motorcycle_id.to_string());
        self.total = response.total;
        self.page = page;
        self.page_size = limit;
        debug!(motorcycle_id, page, loaded = self.reviews.len(), "Loaded reviews");

        Ok(&self.reviews)
    }

    /// Loads the next page for the current motorcycle.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn load_more(&mut self, client: &ApiClient) -> Result<FetchOutcome> {
        let Some(motorcycle_id) = self.motorcycle_id.clone() else {
            return Ok(FetchOutcome::Exhausted);
        };
        if !self.has_more() {
            return Ok(FetchOutcome::Exhausted);
        }

        let next = self.page + 1;
        self.fetch(client, &motorcycle_id, next, self.page_size)
            .await?;
        Ok(FetchOutcome::Applied)
    }

    /// Submits a review. The request is never retried.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn submit(&mut self, client: &ApiClient, review: &NewReview) -> Result<&Review> {
        self.begin();
        let result = client.reviews().submit(review).await;
        self.is_submitting = false;

        let created = match result {
            Ok(created) => created,
            Err(err) => return Err(self.fail(err, "Failed to submit review")),
        };

        self.mine.insert(0, created.clone());
        if self.motorcycle_id.as_deref() == Some(created.motorcycle_id.as_str()) {
            self.reviews.insert(0, created);
            self.total += 1;
            Ok(&self.reviews[0])
        } else {
            Ok(&self.mine[0])
        }
    }

    /// Edits a review.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn update(
        &mut self,
        client: &ApiClient,
        review_id: &str,
        update: &ReviewUpdate,
    ) -> Result<&Review> {
        self.begin();
        let result = client.reviews().update(review_id, update).await;
        self.is_submitting = false;

        let updated = match result {
            Ok(updated) => updated,
            Err(err) => return Err(self.fail(err, "Failed to update review")),
        };

        if let Some(slot) = self.mine.iter_mut().find(|r| r.id == review_id) {
            *slot = updated.clone();
        }
        match self.reviews.iter().position(|r| r.id == review_id) {
            Some(index) => {
                self.reviews[index] = updated;
                Ok(&self.reviews[index])
            }
            None => {
                self.mine.retain(|r| r.id != updated.id);
                self.mine.insert(0, updated);
                Ok(&self.mine[0])
            }
        }
    }

    /// Deletes a review.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn delete(&mut self, client: &ApiClient, review_id: &str) -> Result<()> {
        self.begin();
        let result = client.reviews().delete(review_id).await;
        self.is_submitting = false;

        if let Err(err) = result {
            return Err(self.fail(err, "Failed to delete review"));
        }

        let before = self.reviews.len();
        self.reviews.retain(|r| r.id != review_id);
        if self.reviews.len() < before {
            self.total = self.total.saturating_sub(1);
        }
        self.mine.retain(|r| r.id != review_id);
        Ok(())
    }

    /// Flips `user_id`'s helpful vote on a review and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn toggle_helpful(
        &mut self,
        client: &ApiClient,
        review_id: &str,
        user_id: &str,
    ) -> Result<bool> {
        let was_helpful = self
            .reviews
            .iter()
            .find(|r| r.id == review_id)
            .is_some_and(|r| r.is_helpful_for(user_id));

        self.error = None;
        let result = if was_helpful {
            client.reviews().unmark_helpful(review_id).await
        } else {
            client.reviews().mark_helpful(review_id).await
        };
        if let Err(err) = result {
            return Err(self.fail(err, "Failed to update helpful vote"));
        }

        let helpful = !was_helpful;
        if let Some(review) = self.reviews.iter_mut().find(|r| r.id == review_id) {
            if helpful {
                review.helpful.users.push(user_id.to_string());
                review.helpful.count += 1;
            } else {
                review.helpful.users.retain(|u| u != user_id);
                review.helpful.count = review.helpful.count.saturating_sub(1);
            }
        }
        Ok(helpful)
    }

    /// Loads the signed-in user's reviews.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn fetch_mine(&mut self, client: &ApiClient) -> Result<&[Review]> {
        self.is_loading = true;
        self.error = None;
        let result = client.reviews().mine().await;
        self.is_loading = false;

        match result {
            Ok(mine) => {
                self.mine = mine;
                Ok(&self.mine)
            }
            Err(err) => Err(self.fail(err, "Failed to fetch your reviews")),
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
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use motodex_api::model::ReviewScores;
    use motodex_api::{ApiConfig, MemoryCredentialStore, RetryPolicy, SessionCredential};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> ApiClient {
        let config = ApiConfig::new(format!("{}/api", server.uri()))
            .unwrap()
            .with_retry_policy(RetryPolicy::none());
        let store = MemoryCredentialStore::with_credential(SessionCredential::new("token"));
        ApiClient::new(config, Arc::new(store)).unwrap()
    }

    fn review_json(id: &str, overall: f64) -> serde_json::Value {
        json!({
            "_id": id,
            "motorcycleId": "m1",
            "rating": {
                "overall": overall, "performance": overall, "comfort": overall,
                "reliability": overall, "value": overall, "styling": overall
            },
            "title": "Great bike",
            "content": "Loved every mile",
            "helpful": {"count": 1, "users": ["someone"]}
        })
    }

    fn review(id: &str, overall: f64) -> Review {
        serde_json::from_value(review_json(id, overall)).unwrap()
    }

    async fn mount_page(server: &MockServer, page: u32, ids: &[&str], total: u64) {
        let reviews: Vec<_> = ids.iter().map(|id| review_json(id, 4.0)).collect();
        Mock::given(method("GET"))
            .and(path("/api/motorcycles/m1/reviews"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"reviews": reviews, "total": total}
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_stats() {
        let reviews = vec![review("a", 5.0), review("b", 4.0), review("c", 3.4)];
        let stats = ReviewStats::from_reviews(&reviews);

        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.distribution, [0, 0, 1, 1, 1]);
        assert!((stats.average - 4.133).abs() < 0.01);
        assert_eq!(ReviewStats::from_reviews(&[]).average, 0.0);
    }

    #[test]
    fn test_sorted() {
        let mut reviews = Reviews::new();
        reviews.reviews = vec![review("low", 2.0), review("high", 5.0)];
        reviews.reviews[0].helpful.count = 9;

        let ids = |sort| {
            reviews
                .sorted(sort)
                .into_iter()
                .map(|r| r.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(ReviewSort::HighestRated), vec!["high", "low"]);
        assert_eq!(ids(ReviewSort::LowestRated), vec!["low", "high"]);
        assert_eq!(ids(ReviewSort::MostHelpful), vec!["low", "high"]);
    }

    #[tokio::test]
    async fn test_pages_append() {
        let server = MockServer::start().await;
        mount_page(&server, 1, &["r1", "r2"], 3).await;
        mount_page(&server, 2, &["r3"], 3).await;
        let client = client(&server);

        let mut reviews = Reviews::new();
        reviews.fetch(&client, "m1", 1, 2).await.unwrap();
        assert!(reviews.has_more());

        assert_eq!(
            reviews.load_more(&client).await.unwrap(),
            FetchOutcome::Applied
        );
        assert_eq!(reviews.reviews().len(), 3);
        assert!(!reviews.has_more());
        assert_eq!(
            reviews.load_more(&client).await.unwrap(),
            FetchOutcome::Exhausted
        );
    }

    #[tokio::test]
    async fn test_submit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/motorcycles/m1/reviews"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let config = ApiConfig::new(format!("{}/api", server.uri()))
            .unwrap()
            .with_retry_policy(RetryPolicy::new(3, std::time::Duration::from_millis(1)));
        let client = ApiClient::new(config, Arc::new(MemoryCredentialStore::new())).unwrap();

        let mut reviews = Reviews::new();
        let new_review = NewReview {
            motorcycle_id: "m1".to_string(),
            rating: ReviewScores::uniform(4),
            title: "Solid".to_string(),
            content: "Does everything well".to_string(),
            pros: Vec::new(),
            cons: Vec::new(),
            ownership: None,
            images: Vec::new(),
        };
        assert!(reviews.submit(&client, &new_review).await.is_err());
        assert_eq!(reviews.error(), Some("Failed to submit review"));
    }

    #[tokio::test]
    async fn test_toggle_helpful() {
        let server = MockServer::start().await;
        mount_page(&server, 1, &["r1"], 1).await;
        Mock::given(method("POST"))
            .and(path("/api/reviews/r1/helpful"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/reviews/r1/helpful"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        let client = client(&server);

        let mut reviews = Reviews::new();
        reviews.fetch(&client, "m1", 1, 10).await.unwrap();

        assert!(reviews.toggle_helpful(&client, "r1", "u1").await.unwrap());
        assert_eq!(reviews.reviews()[0].helpful.count, 2);
        assert!(!reviews.toggle_helpful(&client, "r1", "u1").await.unwrap());
        assert_eq!(reviews.reviews()[0].helpful.count, 1);
    }

    #[tokio::test]
    async fn test_delete_adjusts_total() {
        let server = MockServer::start().await;
        mount_page(&server, 1, &["r1", "r2"], 2).await;
        Mock::given(method("DELETE"))
            .and(path("/api/reviews/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;
        let client = client(&server);

        let mut reviews = Reviews::new();
        reviews.fetch(&client, "m1", 1, 10).await.unwrap();
        reviews.delete(&client, "r1").await.unwrap();

        assert_eq!(reviews.total(), 1);
        assert_eq!(reviews.reviews()[0].id, "r2");
    }
}
