//! Catalogue statistics endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::model::{BrandCount, CategoryCount, Stats};
use crate::request::RequestDescriptor;

/// `/stats` routes.
#[derive(Debug, Clone, Copy)]
pub struct StatsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StatsApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Catalogue-wide counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn overview(&self) -> Result<Stats> {
        self.client.execute(&RequestDescriptor::get("/stats")).await
    }

    /// Motorcycles per brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn brands(&self) -> Result<Vec<BrandCount>> {
        self.client
            .execute(&RequestDescriptor::get("/stats/brands"))
            .await
    }

    /// Motorcycles per category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn categories(&self) -> Result<Vec<CategoryCount>> {
        self.client
            .execute(&RequestDescriptor::get("/stats/categories"))
            .await
    }
}
