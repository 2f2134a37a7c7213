//! Motorcycle catalogue endpoints.

use crate::client::ApiClient;
use crate::envelope::ListResponse;
use crate::error::Result;
use crate::model::{Motorcycle, MotorcycleFilters, Pagination};
use crate::request::RequestDescriptor;

/// `/motorcycles` routes.
#[derive(Debug, Clone, Copy)]
pub struct Motorcycles<'a> {
    client: &'a ApiClient,
}

impl<'a> Motorcycles<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Lists motorcycles matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn list(
        &self,
        filters: Option<&MotorcycleFilters>,
        pagination: Option<Pagination>,
    ) -> Result<ListResponse<Motorcycle>> {
        let request = RequestDescriptor::get("/motorcycles")
            .query_from(filters)
            .query_from(pagination.as_ref());
        self.client.execute_list(&request).await
    }

    /// Fetches one motorcycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn get(&self, id: &str) -> Result<Motorcycle> {
        self.client
            .execute(&RequestDescriptor::get("/motorcycles").segment(id))
            .await
    }

    /// Free-text search, optionally narrowed by filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn search(
        &self,
        query: &str,
        filters: Option<&MotorcycleFilters>,
    ) -> Result<ListResponse<Motorcycle>> {
        // The query string already carries `search`; drop a duplicate facet.
        let filters = filters.map(|f| MotorcycleFilters {
            search: None,
            ..f.clone()
        });
        let request = RequestDescriptor::get("/motorcycles/search")
            .query("search", query)
            .query_from(filters.as_ref());
        self.client.execute_list(&request).await
    }

    /// Recommendations, optionally relative to one motorcycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn recommendations(&self, id: Option<&str>) -> Result<Vec<Motorcycle>> {
        let request = match id {
            Some(id) => RequestDescriptor::get("/motorcycles")
                .segment(id)
                .segment("recommendations"),
            None => RequestDescriptor::get("/motorcycles/recommendations"),
        };
        self.client.execute(&request).await
    }

    /// Trending motorcycles.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn trending(&self) -> Result<Vec<Motorcycle>> {
        self.client
            .execute(&RequestDescriptor::get("/motorcycles/trending"))
            .await
    }

    /// Most recently added motorcycles.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after recovery.
    pub async fn latest(&self) -> Result<Vec<Motorcycle>> {
        self.client
            .execute(&RequestDescriptor::get("/motorcycles/latest"))
            .await
    }
}
