//! Listing filters and pagination parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::query::{QueryParams, ToQuery};

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Sort key for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// By price.
    Price,
    /// By power.
    Power,
    /// By model year.
    Year,
    /// By rating.
    Rating,
    /// By popularity.
    Popularity,
}

impl SortBy {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Power => "power",
            Self::Year => "year",
            Self::Rating => "rating",
            Self::Popularity => "popularity",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Facet filters for motorcycle listings.
///
/// Compared structurally, so two filter sets with the same facets are the same cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorcycleFilters {
    /// Brands to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<Vec<String>>,
    /// Categories to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    /// Minimum price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    /// Maximum price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// Minimum power.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_power: Option<f64>,
    /// Maximum power.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_power: Option<f64>,
    /// Free-text search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Sort key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    /// Sort direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// Only models in stock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    /// Only featured models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    /// Only electric models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric: Option<bool>,
}

impl MotorcycleFilters {
    /// Creates an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to the given brands.
    #[must_use]
    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brand = Some(brands.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts to the given categories.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the price bounds.
    #[must_use]
    pub const fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Sets the sort key and direction.
    #[must_use]
    pub const fn sorted(mut self, by: SortBy, order: SortOrder) -> Self {
        self.sort_by = Some(by);
        self.sort_order = Some(order);
        self
    }

    /// Returns true when no facet is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays every facet set in `partial` onto `self`.
    pub fn merge(&mut self, partial: Self) {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if partial.$field.is_some() {
                    self.$field = partial.$field;
                })*
            };
        }
        overlay!(
            brand, category, min_price, max_price, min_power, max_power, search, sort_by,
            sort_order, in_stock, featured, electric
        );
    }
}

impl ToQuery for MotorcycleFilters {
    fn append_to(&self, params: &mut QueryParams) {
        params
            .push_opt("brand", self.brand.as_ref())
            .push_opt("category", self.category.as_ref())
            .push_opt("minPrice", self.min_price)
            .push_opt("maxPrice", self.max_price)
            .push_opt("minPower", self.min_power)
            .push_opt("maxPower", self.max_power)
            .push_opt("search", self.search.as_ref())
            .push_opt("sortBy", self.sort_by.map(SortBy::as_str))
            .push_opt("sortOrder", self.sort_order.map(SortOrder::as_str))
            .push_opt("inStock", self.in_stock)
            .push_opt("featured", self.featured)
            .push_opt("electric", self.electric);
    }
}

/// Page cursor for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Creates a cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` is 0 or `limit` is 0.
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page == 0 {
            return Err(Error::InvalidConfig("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(Error::InvalidConfig("limit must be positive".to_string()));
        }
        Ok(Self { page, limit })
    }

    /// First page with the given size (a zero size falls back to the default).
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: if limit == 0 { DEFAULT_PAGE_SIZE } else { limit },
        }
    }

    /// Page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// The following page with the same size.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            limit: self.limit,
        }
    }
}

impl ToQuery for Pagination {
    fn append_to(&self, params: &mut QueryParams) {
        params.push("page", self.page).push("limit", self.limit);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_serialize_in_order() {
        let filters = MotorcycleFilters::new()
            .with_brands(["Honda", "Yamaha"])
            .with_price_range(Some(5000.0), None)
            .sorted(SortBy::Price, SortOrder::Asc);
        let mut params = QueryParams::new();
        params.extend_from(&filters);
        assert_eq!(
            params.to_query_string(),
            "brand=Honda&brand=Yamaha&minPrice=5000&sortBy=price&sortOrder=asc"
        );
    }

    #[test]
    fn test_empty_filters_add_nothing() {
        let mut params = QueryParams::new();
        params.extend_from(&MotorcycleFilters::new());
        assert!(params.is_empty());
        assert!(MotorcycleFilters::new().is_empty());
    }

    #[test]
    fn test_merge_overlays_set_fields() {
        let mut filters = MotorcycleFilters::new()
            .with_brands(["Honda"])
            .with_categories(["sport"]);
        filters.merge(MotorcycleFilters {
            brand: Some(vec!["Ducati".to_string()]),
            electric: Some(true),
            ..MotorcycleFilters::default()
        });
        assert_eq!(filters.brand, Some(vec!["Ducati".to_string()]));
        assert_eq!(filters.category, Some(vec!["sport".to_string()]));
        assert_eq!(filters.electric, Some(true));
    }

    #[test]
    fn test_structural_equality() {
        let a = MotorcycleFilters::new().with_brands(["KTM"]);
        let b = MotorcycleFilters::new().with_brands(["KTM".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_pagination_bounds() {
        assert!(Pagination::new(0, 10).is_err());
        assert!(Pagination::new(1, 0).is_err());
        let page = Pagination::new(2, 5).unwrap();
        assert_eq!(page.next().page(), 3);
        assert_eq!(Pagination::first(0).limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_pagination_query() {
        let mut params = QueryParams::new();
        params.extend_from(&Pagination::new(2, 5).unwrap());
        assert_eq!(params.to_query_string(), "page=2&limit=5");
    }
}
