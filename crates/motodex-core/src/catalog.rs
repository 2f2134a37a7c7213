//! Motorcycle catalogue state.
//!
//! Holds the current listing, its filters and pagination, the selected
//! motorcycle and the background carousels (recommendations, trending,
//! latest). List fetches are split into [`Catalog::begin_fetch`] and
//! [`Catalog::complete_fetch`] so callers that share the catalogue behind a
//! lock can run the request without holding it; only the response to the
//! latest request is ever applied.

use motodex_api::model::{
    AvailableFilters, DEFAULT_PAGE_SIZE, Motorcycle, MotorcycleFilters, Pagination, PaginationInfo,
};
use motodex_api::{ApiClient, ListResponse};
use tracing::{debug, warn};

use crate::Result;
use crate::cache::CacheValidity;
use crate::error::describe;
use crate::sequence::{FetchSequence, Ticket};

/// What a list fetch did to the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied.
    Applied,
    /// The listing was fresh; no request was sent.
    Cached,
    /// There was nothing more to load.
    Exhausted,
    /// A newer request superseded this one; the response was dropped.
    Discarded,
}

/// How a page is merged into the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Replace the listing.
    Replace,
    /// Append to the listing.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ListKind {
    Browse,
    Search(String),
}

/// A dispatched list request awaiting its response.
#[derive(Debug, Clone)]
pub struct ListRequest {
    ticket: Ticket,
    kind: ListKind,
    mode: MergeMode,
    filters: MotorcycleFilters,
    pagination: Pagination,
}

impl ListRequest {
    /// Page this request asks for.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// How the response will be merged.
    #[must_use]
    pub const fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn send(&self, client: &ApiClient) -> motodex_api::Result<ListResponse<Motorcycle>> {
        let filters = (!self.filters.is_empty()).then_some(&self.filters);
        match &self.kind {
            ListKind::Browse => {
                client
                    .motorcycles()
                    .list(filters, Some(self.pagination))
                    .await
            }
            ListKind::Search(query) => client.motorcycles().search(query, filters).await,
        }
    }

    const fn fallback_message(&self) -> &'static str {
        match (&self.kind, self.mode) {
            (ListKind::Search(_), _) => "Search failed",
            (ListKind::Browse, MergeMode::Append) => "Failed to load more motorcycles",
            (ListKind::Browse, MergeMode::Replace) => "Failed to fetch motorcycles",
        }
    }
}

/// Motorcycle catalogue state container.
#[derive(Debug, Clone)]
pub struct Catalog {
    motorcycles: Vec<Motorcycle>,
    pagination: PaginationInfo,
    /// Cursor of the last browse response applied.
    loaded: Option<Pagination>,
    selected: Option<Motorcycle>,
    recommendations: Vec<Motorcycle>,
    trending: Vec<Motorcycle>,
    latest: Vec<Motorcycle>,
    filters: MotorcycleFilters,
    available_filters: AvailableFilters,
    page_size: u32,
    is_loading: bool,
    is_loading_more: bool,
    is_refreshing: bool,
    error: Option<String>,
    cache: CacheValidity,
    sequence: FetchSequence,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Creates an empty catalogue with the default page size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates an empty catalogue with a custom page size.
    #[must_use]
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            motorcycles: Vec::new(),
            pagination: PaginationInfo::default(),
            loaded: None,
            selected: None,
            recommendations: Vec::new(),
            trending: Vec::new(),
            latest: Vec::new(),
            filters: MotorcycleFilters::default(),
            available_filters: AvailableFilters::default(),
            page_size: Pagination::first(page_size).limit(),
            is_loading: false,
            is_loading_more: false,
            is_refreshing: false,
            error: None,
            cache: CacheValidity::new(),
            sequence: FetchSequence::new(),
        }
    }

    /// Current listing.
    #[must_use]
    pub fn motorcycles(&self) -> &[Motorcycle] {
        &self.motorcycles
    }

    /// Pagination of the current listing.
    #[must_use]
    pub const fn pagination(&self) -> &PaginationInfo {
        &self.pagination
    }

    /// Motorcycle opened in detail view.
    #[must_use]
    pub const fn selected(&self) -> Option<&Motorcycle> {
        self.selected.as_ref()
    }

    /// Recommended motorcycles.
    #[must_use]
    pub fn recommendations(&self) -> &[Motorcycle] {
        &self.recommendations
    }

    /// Trending motorcycles.
    #[must_use]
    pub fn trending(&self) -> &[Motorcycle] {
        &self.trending
    }

    /// Latest motorcycles.
    #[must_use]
    pub fn latest(&self) -> &[Motorcycle] {
        &self.latest
    }

    /// Active filter set.
    #[must_use]
    pub const fn filters(&self) -> &MotorcycleFilters {
        &self.filters
    }

    /// Facet values offered by the server.
    #[must_use]
    pub const fn available_filters(&self) -> &AvailableFilters {
        &self.available_filters
    }

    /// A first-page or detail fetch is running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// A next-page fetch is running.
    #[must_use]
    pub const fn is_loading_more(&self) -> bool {
        self.is_loading_more
    }

    /// A pull-to-refresh fetch is running.
    #[must_use]
    pub const fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }

    /// Last error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validity of the current listing.
    #[must_use]
    pub const fn cache(&self) -> &CacheValidity {
        &self.cache
    }

    /// Replaces the filter set.
    pub fn set_filters(&mut self, filters: MotorcycleFilters) {
        self.filters = filters;
        self.invalidate();
    }

    /// Overlays the facets set in `partial` onto the filter set.
    pub fn update_filters(&mut self, partial: MotorcycleFilters) {
        self.filters.merge(partial);
        self.invalidate();
    }

    /// Clears every facet.
    pub fn clear_filters(&mut self) {
        self.filters = MotorcycleFilters::default();
        self.invalidate();
    }

    /// Drops the listing and returns to page 1.
    pub fn reset_pagination(&mut self) {
        self.motorcycles.clear();
        self.pagination = PaginationInfo::default();
        self.loaded = None;
        self.invalidate();
    }

    /// Forces the next fetch to hit the network.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
        self.sequence.supersede();
        self.is_loading = false;
        self.is_loading_more = false;
        self.is_refreshing = false;
    }

    /// Clears the last error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Opens `motorcycle` in the detail view.
    pub fn select(&mut self, motorcycle: Motorcycle) -> &Motorcycle {
        self.selected.insert(motorcycle)
    }

    /// Closes the detail view.
    pub fn clear_selected(&mut self) {
        self.selected = None;
    }

    /// Starts a list fetch.
    ///
    /// Returns `None` when the listing is fresh for the requested page and
    /// limit and `refresh` is false. A refresh always asks for page 1.
    pub fn begin_fetch(
        &mut self,
        pagination: Option<Pagination>,
        refresh: bool,
    ) -> Option<ListRequest> {
        let requested = pagination.unwrap_or_else(|| Pagination::first(self.page_size));
        if !refresh && self.cache.is_fresh() && self.loaded == Some(requested) {
            debug!(
                page = requested.page(),
                limit = requested.limit(),
                "Listing is fresh, skipping fetch"
            );
            return None;
        }

        let pagination = if refresh {
            Pagination::first(requested.limit())
        } else {
            requested
        };
        let mode = if pagination.page() > 1 {
            MergeMode::Append
        } else {
            MergeMode::Replace
        };

        if refresh {
            self.is_refreshing = true;
        } else if mode == MergeMode::Append {
            self.is_loading_more = true;
        } else {
            self.is_loading = true;
        }
        self.error = None;

        Some(ListRequest {
            ticket: self.sequence.issue(),
            kind: ListKind::Browse,
            mode,
            filters: self.filters.clone(),
            pagination,
        })
    }

    /// Starts a fetch of the page after the current one.
    ///
    /// Returns `None` when the server reported no further page.
    pub fn begin_load_more(&mut self) -> Option<ListRequest> {
        if !self.pagination.has_next {
            return None;
        }

        let limit = self.loaded.map_or(self.page_size, |loaded| loaded.limit());
        let pagination = Pagination::new(self.pagination.current_page.max(1), limit)
            .ok()?
            .next();
        self.is_loading_more = true;
        self.error = None;

        Some(ListRequest {
            ticket: self.sequence.issue(),
            kind: ListKind::Browse,
            mode: MergeMode::Append,
            filters: self.filters.clone(),
            pagination,
        })
    }

    /// Starts a free-text search over the active filters.
    pub fn begin_search(&mut self, query: &str) -> ListRequest {
        self.is_loading = true;
        self.error = None;

        ListRequest {
            ticket: self.sequence.issue(),
            kind: ListKind::Search(query.to_string()),
            mode: MergeMode::Replace,
            filters: self.filters.clone(),
            pagination: Pagination::first(self.page_size),
        }
    }

    /// Applies the response to `request` if it is still the latest.
    ///
    /// # Errors
    ///
    /// Returns the API error when the latest request failed; the error
    /// message is also recorded on the catalogue.
    pub fn complete_fetch(
        &mut self,
        request: ListRequest,
        result: motodex_api::Result<ListResponse<Motorcycle>>,
    ) -> Result<FetchOutcome> {
        if !self.sequence.is_latest(request.ticket) {
            debug!(page = request.pagination.page(), "Dropping superseded listing response");
            return Ok(FetchOutcome::Discarded);
        }

        self.is_loading = false;
        self.is_loading_more = false;
        self.is_refreshing = false;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.error = Some(describe(&err, request.fallback_message()));
                return Err(err.into());
            }
        };

        match request.mode {
            MergeMode::Replace => self.motorcycles = response.items,
            MergeMode::Append => self.motorcycles.extend(response.items),
        }
        self.pagination = response.pagination;
        if let Some(available) = response.filters.available {
            self.available_filters = available;
        }
        self.error = None;

        // Search results do not reflect the browse filters.
        match request.kind {
            ListKind::Browse => {
                self.loaded = Some(request.pagination);
                self.cache.touch();
            }
            ListKind::Search(_) => {
                self.loaded = None;
                self.cache.invalidate();
            }
        }

        Ok(FetchOutcome::Applied)
    }

    /// Fetches a page of the listing.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn fetch(
        &mut self,
        client: &ApiClient,
        pagination: Option<Pagination>,
        refresh: bool,
    ) -> Result<FetchOutcome> {
        let Some(request) = self.begin_fetch(pagination, refresh) else {
            return Ok(FetchOutcome::Cached);
        };
        let result = request.send(client).await;
        self.complete_fetch(request, result)
    }

    /// Appends the next page.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn load_more(&mut self, client: &ApiClient) -> Result<FetchOutcome> {
        let Some(request) = self.begin_load_more() else {
            return Ok(FetchOutcome::Exhausted);
        };
        let result = request.send(client).await;
        self.complete_fetch(request, result)
    }

    /// Replaces the listing with search results.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn search(&mut self, client: &ApiClient, query: &str) -> Result<FetchOutcome> {
        let request = self.begin_search(query);
        let result = request.send(client).await;
        self.complete_fetch(request, result)
    }

    /// Loads one motorcycle into the detail view.
    ///
    /// # Errors
    ///
    /// Returns the API error if the request fails.
    pub async fn fetch_by_id(&mut self, client: &ApiClient, id: &str) -> Result<&Motorcycle> {
        self.is_loading = true;
        self.error = None;

        let result = client.motorcycles().get(id).await;
        self.is_loading = false;
        match result {
            Ok(motorcycle) => Ok(self.select(motorcycle)),
            Err(err) => {
                self.error = Some(describe(&err, "Failed to fetch motorcycle details"));
                Err(err.into())
            }
        }
    }

    /// Refreshes recommendations. Failures are logged and ignored.
    pub async fn fetch_recommendations(&mut self, client: &ApiClient, id: Option<&str>) {
        match client.motorcycles().recommendations(id).await {
            Ok(recommendations) => self.recommendations = recommendations,
            Err(e) => warn!("Failed to load recommendations: {e}"),
        }
    }

    /// Refreshes trending motorcycles. Failures are logged and ignored.
    pub async fn fetch_trending(&mut self, client: &ApiClient) {
        match client.motorcycles().trending().await {
            Ok(trending) => self.trending = trending,
            Err(e) => warn!("Failed to load trending motorcycles: {e}"),
        }
    }

    /// Refreshes the latest motorcycles. Failures are logged and ignored.
    pub async fn fetch_latest(&mut self, client: &ApiClient) {
        match client.motorcycles().latest().await {
            Ok(latest) => self.latest = latest,
            Err(e) => warn!("Failed to load latest motorcycles: {e}"),
        }
    }

    /// Updates the rating summary of a motorcycle wherever it is shown.
    pub fn update_rating(&mut self, id: &str, overall: f64, reviews: u32) {
        let listed = self
            .motorcycles
            .iter_mut()
            .chain(self.recommendations.iter_mut())
            .chain(self.selected.iter_mut());
        for motorcycle in listed.filter(|m| m.id == id) {
            motorcycle.set_rating(overall, reviews);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use motodex_api::model::Rating;
    use motodex_api::{ApiConfig, ListFilters, MemoryCredentialStore, RetryPolicy};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn bike(id: &str) -> Motorcycle {
        serde_json::from_value(json!({
            "_id": id,
            "brand": "Honda",
            "model": "CB500F",
            "year": 2024,
            "category": "naked"
        }))
        .unwrap()
    }

    fn page(ids: &[&str], current: u32, has_next: bool) -> ListResponse<Motorcycle> {
        ListResponse {
            items: ids.iter().map(|id| bike(id)).collect(),
            pagination: PaginationInfo {
                current_page: current,
                total_pages: 3,
                total_items: 60,
                has_next,
                has_prev: current > 1,
            },
            filters: ListFilters::default(),
        }
    }

    fn client(server: &MockServer) -> ApiClient {
        let config = ApiConfig::new(format!("{}/api", server.uri()))
            .unwrap()
            .with_retry_policy(RetryPolicy::none());
        ApiClient::new(config, Arc::new(MemoryCredentialStore::new())).unwrap()
    }

    #[test]
    fn test_filter_change_invalidates_after_fetch() {
        let mut catalog = Catalog::new();
        catalog.set_filters(MotorcycleFilters::new().with_brands(["Honda"]));

        let request = catalog.begin_fetch(None, false).unwrap();
        catalog
            .complete_fetch(request, Ok(page(&["a"], 1, true)))
            .unwrap();
        assert!(catalog.cache().is_fresh());

        catalog.set_filters(MotorcycleFilters::new().with_brands(["Yamaha"]));
        assert!(!catalog.cache().is_fresh());
    }

    #[test]
    fn test_every_filter_mutation_invalidates() {
        let mut catalog = Catalog::new();
        let fresh = |catalog: &mut Catalog| {
            let request = catalog.begin_fetch(None, true).unwrap();
            catalog
                .complete_fetch(request, Ok(page(&["a"], 1, false)))
                .unwrap();
            assert!(catalog.cache().is_fresh());
        };

        fresh(&mut catalog);
        catalog.update_filters(MotorcycleFilters {
            electric: Some(true),
            ..MotorcycleFilters::default()
        });
        assert!(!catalog.cache().is_fresh());

        fresh(&mut catalog);
        catalog.clear_filters();
        assert!(!catalog.cache().is_fresh());

        fresh(&mut catalog);
        catalog.reset_pagination();
        assert!(!catalog.cache().is_fresh());
        assert!(catalog.motorcycles().is_empty());
    }

    #[test]
    fn test_fresh_listing_skips_fetch() {
        let mut catalog = Catalog::new();
        let request = catalog.begin_fetch(None, false).unwrap();
        catalog
            .complete_fetch(request, Ok(page(&["a"], 1, true)))
            .unwrap();

        assert!(catalog.begin_fetch(None, false).is_none());
        assert!(catalog.begin_fetch(None, true).is_some());
    }

    #[test]
    fn test_different_limit_is_not_fresh() {
        let mut catalog = Catalog::new();
        let request = catalog.begin_fetch(None, false).unwrap();
        catalog
            .complete_fetch(request, Ok(page(&["a"], 1, true)))
            .unwrap();

        let same = Pagination::new(1, DEFAULT_PAGE_SIZE).unwrap();
        assert!(catalog.begin_fetch(Some(same), false).is_none());

        let wider = Pagination::new(1, 50).unwrap();
        let request = catalog.begin_fetch(Some(wider), false).unwrap();
        assert_eq!(request.pagination().limit(), 50);
        catalog
            .complete_fetch(request, Ok(page(&["a", "b"], 1, true)))
            .unwrap();
        assert!(catalog.begin_fetch(Some(wider), false).is_none());

        let more = catalog.begin_load_more().unwrap();
        assert_eq!(more.pagination().page(), 2);
        assert_eq!(more.pagination().limit(), 50);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut catalog = Catalog::new();
        let slow = catalog.begin_fetch(None, false).unwrap();
        catalog.set_filters(MotorcycleFilters::new().with_brands(["Ducati"]));
        let fast = catalog.begin_fetch(None, false).unwrap();

        let applied = catalog
            .complete_fetch(fast, Ok(page(&["ducati"], 1, false)))
            .unwrap();
        let dropped = catalog
            .complete_fetch(slow, Ok(page(&["honda"], 1, false)))
            .unwrap();

        assert_eq!(applied, FetchOutcome::Applied);
        assert_eq!(dropped, FetchOutcome::Discarded);
        assert_eq!(catalog.motorcycles()[0].id, "ducati");
    }

    #[test]
    fn test_stale_error_does_not_clobber_state() {
        let mut catalog = Catalog::new();
        let slow = catalog.begin_fetch(None, false).unwrap();
        let fast = catalog.begin_fetch(None, true).unwrap();
        catalog
            .complete_fetch(fast, Ok(page(&["a"], 1, false)))
            .unwrap();

        let outcome = catalog
            .complete_fetch(slow, Err(motodex_api::Error::Network("timeout".to_string())))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Discarded);
        assert!(catalog.error().is_none());
    }

    #[test]
    fn test_load_more_appends() {
        let mut catalog = Catalog::with_page_size(2);
        let request = catalog.begin_fetch(None, false).unwrap();
        catalog
            .complete_fetch(request, Ok(page(&["a", "b"], 1, true)))
            .unwrap();

        let more = catalog.begin_load_more().unwrap();
        assert_eq!(more.pagination().page(), 2);
        assert_eq!(more.pagination().limit(), 2);
        assert!(catalog.is_loading_more());
        catalog
            .complete_fetch(more, Ok(page(&["c", "d"], 2, false)))
            .unwrap();

        let ids: Vec<_> = catalog.motorcycles().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert!(catalog.begin_load_more().is_none());
    }

    #[test]
    fn test_refresh_forces_first_page() {
        let mut catalog = Catalog::new();
        let request = catalog
            .begin_fetch(Some(Pagination::new(3, 10).unwrap()), true)
            .unwrap();
        assert_eq!(request.pagination().page(), 1);
        assert_eq!(request.pagination().limit(), 10);
        assert_eq!(request.mode(), MergeMode::Replace);
        assert!(catalog.is_refreshing());
    }

    #[test]
    fn test_failure_records_error() {
        let mut catalog = Catalog::new();
        let request = catalog.begin_fetch(None, false).unwrap();
        let err = catalog
            .complete_fetch(request, Err(motodex_api::Error::server(500, "")))
            .unwrap_err();

        assert!(err.as_api().is_some());
        assert_eq!(catalog.error(), Some("Failed to fetch motorcycles"));
        assert!(!catalog.is_loading());
    }

    #[test]
    fn test_update_rating_everywhere() {
        let mut catalog = Catalog::new();
        let request = catalog.begin_fetch(None, false).unwrap();
        catalog
            .complete_fetch(request, Ok(page(&["a", "b"], 1, false)))
            .unwrap();
        catalog.selected = Some(bike("a"));

        catalog.update_rating("a", 4.5, 10);

        let expected = Some(Rating {
            overall: 4.5,
            reviews: 10,
        });
        assert_eq!(catalog.motorcycles()[0].rating, expected);
        assert_eq!(catalog.selected().unwrap().rating, expected);
        assert!(catalog.motorcycles()[1].rating.is_none());
    }

    #[tokio::test]
    async fn test_fetch_then_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/motorcycles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "motorcycles": [{"_id": "m1", "brand": "Honda", "model": "X", "year": 2024, "category": "sport"}],
                "pagination": {"currentPage": 1, "totalPages": 1, "totalItems": 1, "hasNext": false, "hasPrev": false},
                "filters": {"available": {
                    "brands": ["Honda"],
                    "categories": ["sport"],
                    "priceRange": {"min": 0, "max": 20000},
                    "powerRange": {"min": 0, "max": 200}
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let mut catalog = Catalog::new();

        assert_eq!(
            catalog.fetch(&client, None, false).await.unwrap(),
            FetchOutcome::Applied
        );
        assert_eq!(
            catalog.fetch(&client, None, false).await.unwrap(),
            FetchOutcome::Cached
        );
        assert_eq!(catalog.available_filters().brands, vec!["Honda"]);
    }

    #[tokio::test]
    async fn test_background_fetch_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/motorcycles/trending"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client(&server);
        let mut catalog = Catalog::new();
        catalog.fetch_trending(&client).await;

        assert!(catalog.trending().is_empty());
        assert!(catalog.error().is_none());
    }
}
