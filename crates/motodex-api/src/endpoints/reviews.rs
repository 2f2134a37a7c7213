//! Review endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::model::{NewReview, Review, ReviewPage, ReviewUpdate};
use crate::request::RequestDescriptor;

/// Review routes.
#[derive(Debug, Clone, Copy)]
pub struct Reviews<'a> {
    client: &'a ApiClient,
}

impl<'a> Reviews<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of reviews for a motorcycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn for_motorcycle(
        &self,
        motorcycle_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<ReviewPage> {
        let request = RequestDescriptor::get("/motorcycles")
            .segment(motorcycle_id)
            .segment("reviews")
            .query("page", page)
            .query("limit", limit);
        self.client.execute(&request).await
    }

    /// Submits a review. Never retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn submit(&self, review: &NewReview) -> Result<Review> {
        let request = RequestDescriptor::post("/motorcycles")
            .segment(review.motorcycle_id.as_str())
            .segment("reviews")
            .json(review)?;
        self.client.execute(&request).await
    }

    /// Edits a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update(&self, review_id: &str, update: &ReviewUpdate) -> Result<Review> {
        let request = RequestDescriptor::put("/reviews")
            .segment(review_id)
            .json(update)?;
        self.client.execute(&request).await
    }

    /// Deletes a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, review_id: &str) -> Result<()> {
        self.client
            .execute_unit(&RequestDescriptor::delete("/reviews").segment(review_id))
            .await
    }

    /// Marks a review helpful.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn mark_helpful(&self, review_id: &str) -> Result<()> {
        self.client
            .execute_unit(
                &RequestDescriptor::post("/reviews")
                    .segment(review_id)
                    .segment("helpful"),
            )
            .await
    }

    /// Withdraws a helpful mark.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn unmark_helpful(&self, review_id: &str) -> Result<()> {
        self.client
            .execute_unit(
                &RequestDescriptor::delete("/reviews")
                    .segment(review_id)
                    .segment("helpful"),
            )
            .await
    }

    /// Reviews written by the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn mine(&self) -> Result<Vec<Review>> {
        self.client
            .execute(&RequestDescriptor::get("/reviews/my-reviews"))
            .await
    }
}
