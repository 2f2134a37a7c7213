//! Search input, history and suggestions.
//!
//! History is persisted to [`Storage`] under [`SEARCH_HISTORY_KEY`]; recent
//! searches are rebuilt from it on load. The validity flag tracks whether
//! the in-memory history matches what is stored.

use chrono::{DateTime, Utc};
use motodex_api::model::MotorcycleFilters;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::cache::CacheValidity;
use crate::storage::{SEARCH_HISTORY_KEY, Storage};

/// Maximum number of history entries kept.
pub const MAX_HISTORY: usize = 50;

/// Maximum number of recent searches kept.
pub const MAX_RECENT: usize = 10;

/// Maximum number of suggestions offered.
pub const MAX_SUGGESTIONS: usize = 8;

/// Searches offered before the user has typed anything.
pub const POPULAR_SEARCHES: [&str; 8] = [
    "Yamaha R1",
    "Honda CBR1000RR",
    "Kawasaki Ninja",
    "Ducati Panigale",
    "BMW S1000RR",
    "Suzuki GSX-R",
    "KTM Duke",
    "Harley Davidson",
];

const SUGGESTED_BRANDS: [&str; 10] = [
    "Yamaha",
    "Honda",
    "Kawasaki",
    "Suzuki",
    "Ducati",
    "BMW",
    "KTM",
    "Harley-Davidson",
    "Triumph",
    "Aprilia",
];

const SUGGESTED_CATEGORIES: [&str; 9] = [
    "Sport",
    "Cruiser",
    "Touring",
    "Standard",
    "Adventure",
    "Dual-Sport",
    "Dirt Bike",
    "Electric",
    "Scooter",
];

/// One executed search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    /// Local identifier.
    pub id: String,
    /// Trimmed query text.
    pub query: String,
    /// Filters active for the search.
    #[serde(default)]
    pub filters: MotorcycleFilters,
    /// Number of results returned.
    #[serde(default)]
    pub result_count: u64,
    /// When the search ran.
    pub timestamp: DateTime<Utc>,
}

impl SearchEntry {
    fn matches(&self, query: &str, filters: &MotorcycleFilters) -> bool {
        self.query.to_lowercase() == query.to_lowercase() && self.filters == *filters
    }
}

/// Search state container.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    storage: Storage,
    query: String,
    filters: MotorcycleFilters,
    history: Vec<SearchEntry>,
    recent: Vec<String>,
    suggestions: Vec<String>,
    cache: CacheValidity,
    issued_ids: u64,
}

impl SearchHistory {
    /// Creates empty search state persisting to `storage`.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            query: String::new(),
            filters: MotorcycleFilters::default(),
            history: Vec::new(),
            recent: Vec::new(),
            suggestions: Vec::new(),
            cache: CacheValidity::new(),
            issued_ids: 0,
        }
    }

    /// Current query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current search filters.
    #[must_use]
    pub const fn filters(&self) -> &MotorcycleFilters {
        &self.filters
    }

    /// History, newest first.
    #[must_use]
    pub fn history(&self) -> &[SearchEntry] {
        &self.history
    }

    /// Recent query strings, newest first.
    #[must_use]
    pub fn recent(&self) -> &[String] {
        &self.recent
    }

    /// Suggestions for the last input passed to
    /// [`generate_suggestions`](Self::generate_suggestions).
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Popular searches.
    #[must_use]
    pub const fn popular(&self) -> &'static [&'static str] {
        &POPULAR_SEARCHES
    }

    /// Whether the in-memory history matches storage.
    #[must_use]
    pub const fn cache(&self) -> &CacheValidity {
        &self.cache
    }

    /// Sets the query text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Replaces the search filters.
    pub fn set_filters(&mut self, filters: MotorcycleFilters) {
        self.filters = filters;
    }

    /// Overlays the facets set in `partial` onto the search filters.
    pub fn update_filters(&mut self, partial: MotorcycleFilters) {
        self.filters.merge(partial);
    }

    /// Clears query, filters and suggestions. History is kept.
    pub fn reset(&mut self) {
        self.query.clear();
        self.filters = MotorcycleFilters::default();
        self.suggestions.clear();
    }

    /// Records an executed search.
    ///
    /// A blank query is ignored. An entry with the same query (ignoring
    /// case) and filters is replaced and moved to the front.
    pub fn record(
        &mut self,
        query: &str,
        filters: MotorcycleFilters,
        result_count: u64,
    ) -> Option<&SearchEntry> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.history.retain(|entry| !entry.matches(query, &filters));
        let entry = SearchEntry {
            id: self.next_id(),
            query: query.to_string(),
            filters,
            result_count,
            timestamp: Utc::now(),
        };
        self.history.insert(0, entry);
        self.history.truncate(MAX_HISTORY);
        self.add_recent(query);
        self.cache.invalidate();

        self.history.first()
    }

    /// Removes one history entry.
    pub fn remove(&mut self, id: &str) {
        self.history.retain(|entry| entry.id != id);
        self.cache.invalidate();
    }

    /// Clears history and recent searches.
    pub fn clear(&mut self) {
        self.history.clear();
        self.recent.clear();
        self.cache.invalidate();
    }

    /// Moves `query` to the front of the recent searches.
    pub fn add_recent(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.recent.retain(|recent| recent != query);
        self.recent.insert(0, query.to_string());
        self.recent.truncate(MAX_RECENT);
    }

    /// Removes `query` from the recent searches.
    pub fn remove_recent(&mut self, query: &str) {
        self.recent.retain(|recent| recent != query);
    }

    /// Makes a history entry the current search.
    pub fn restore_from_history(&mut self, id: &str) -> Option<&SearchEntry> {
        let entry = self.history.iter().find(|entry| entry.id == id)?;
        self.query.clone_from(&entry.query);
        self.filters = entry.filters.clone();
        Some(entry)
    }

    /// Rebuilds suggestions for `input`.
    ///
    /// Candidates come from history, recent searches, popular searches,
    /// brands and categories, in that order, matched case-insensitively by
    /// substring. Blank input clears the suggestions.
    pub fn generate_suggestions(&mut self, input: &str) -> &[String] {
        self.suggestions.clear();
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return &self.suggestions;
        }

        let candidates = self
            .history
            .iter()
            .map(|entry| entry.query.as_str())
            .chain(self.recent.iter().map(String::as_str))
            .chain(POPULAR_SEARCHES)
            .chain(SUGGESTED_BRANDS)
            .chain(SUGGESTED_CATEGORIES);

        let mut suggestions: Vec<String> = Vec::new();
        for candidate in candidates {
            if suggestions.len() == MAX_SUGGESTIONS {
                break;
            }
            if candidate.to_lowercase().contains(&needle)
                && !suggestions.iter().any(|s| s == candidate)
            {
                suggestions.push(candidate.to_string());
            }
        }

        self.suggestions = suggestions;
        &self.suggestions
    }

    /// Loads history from storage and rebuilds recent searches from it.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or the stored history is
    /// malformed.
    pub async fn load(&mut self) -> Result<()> {
        let history: Vec<SearchEntry> = self
            .storage
            .get_json(SEARCH_HISTORY_KEY)
            .await?
            .unwrap_or_default();

        let mut recent: Vec<String> = Vec::new();
        for entry in history.iter().take(MAX_RECENT) {
            if !recent.contains(&entry.query) {
                recent.push(entry.query.clone());
            }
        }

        debug!(entries = history.len(), "Loaded search history");
        self.history = history;
        self.recent = recent;
        self.cache.touch();
        Ok(())
    }

    /// Writes history to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub async fn persist(&mut self) -> Result<()> {
        self.storage
            .set_json(SEARCH_HISTORY_KEY, &self.history)
            .await?;
        self.cache.touch();
        Ok(())
    }

    fn next_id(&mut self) -> String {
        self.issued_ids += 1;
        format!("{}_{}", Utc::now().timestamp_millis(), self.issued_ids)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn search() -> SearchHistory {
        SearchHistory::new(Storage::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_record_dedupes_case_insensitively() {
        let mut search = search().await;
        search.record("Ninja", MotorcycleFilters::default(), 3);
        search.record("yamaha", MotorcycleFilters::default(), 5);
        search.record("ninja", MotorcycleFilters::default(), 4);

        let queries: Vec<_> = search.history().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["ninja", "yamaha"]);
        assert_eq!(search.history()[0].result_count, 4);
    }

    #[tokio::test]
    async fn test_different_filters_are_distinct() {
        let mut search = search().await;
        search.record("ninja", MotorcycleFilters::default(), 3);
        search.record("ninja", MotorcycleFilters::new().with_brands(["Kawasaki"]), 2);

        assert_eq!(search.history().len(), 2);
        assert_eq!(search.recent(), ["ninja"]);
    }

    #[tokio::test]
    async fn test_caps() {
        let mut search = search().await;
        for i in 0..60 {
            search.record(&format!("query {i}"), MotorcycleFilters::default(), 0);
        }

        assert_eq!(search.history().len(), MAX_HISTORY);
        assert_eq!(search.recent().len(), MAX_RECENT);
        assert_eq!(search.history()[0].query, "query 59");
        assert_eq!(search.recent()[0], "query 59");
    }

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let mut search = search().await;
        assert!(search.record("   ", MotorcycleFilters::default(), 0).is_none());
        assert!(search.history().is_empty());
    }

    #[tokio::test]
    async fn test_suggestions() {
        let mut search = search().await;
        search.record("Honda Africa Twin", MotorcycleFilters::default(), 1);

        let suggestions = search.generate_suggestions("hon").to_vec();
        assert_eq!(
            suggestions,
            vec!["Honda Africa Twin", "Honda CBR1000RR", "Honda"]
        );

        assert!(search.generate_suggestions("a").len() <= MAX_SUGGESTIONS);
        assert!(search.generate_suggestions("  ").is_empty());
    }

    #[tokio::test]
    async fn test_restore_from_history() {
        let mut search = search().await;
        let filters = MotorcycleFilters::new().with_categories(["touring"]);
        let id = search.record("gold wing", filters.clone(), 1).unwrap().id.clone();
        search.reset();

        search.restore_from_history(&id).unwrap();
        assert_eq!(search.query(), "gold wing");
        assert_eq!(search.filters(), &filters);
    }

    #[tokio::test]
    async fn test_persist_and_load() {
        let storage = Storage::in_memory().await.unwrap();
        let mut search = SearchHistory::new(storage.clone());
        search.record("ducati", MotorcycleFilters::default(), 7);
        search.record("bmw", MotorcycleFilters::default(), 2);
        assert!(!search.cache().is_fresh());

        search.persist().await.unwrap();
        assert!(search.cache().is_fresh());

        let mut restored = SearchHistory::new(storage);
        restored.load().await.unwrap();
        assert_eq!(restored.history(), search.history());
        assert_eq!(restored.recent(), ["bmw", "ducati"]);
    }
}
