//! Motorcycle catalogue records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A motorcycle in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Motorcycle {
    /// Server identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: u16,
    /// Category (sport, touring, ...).
    pub category: String,
    /// Price information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Engine specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<Engine>,
    /// Performance figures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
    /// Images.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Feature list.
    #[serde(default)]
    pub features: Vec<String>,
    /// Aggregated rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    /// Publication status.
    #[serde(default)]
    pub status: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Display name computed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Motorcycle {
    /// Display name, falling back to "brand model year".
    #[must_use]
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .unwrap_or_else(|| format!("{} {} {}", self.brand, self.model, self.year))
    }

    /// Overwrites the rating summary, creating it if absent.
    pub fn set_rating(&mut self, overall: f64, reviews: u32) {
        let rating = self.rating.get_or_insert_with(Rating::default);
        rating.overall = overall;
        rating.reviews = reviews;
    }
}

/// Price information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Manufacturer's suggested retail price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msrp: Option<f64>,
    /// ISO currency code.
    pub currency: String,
}

/// Engine specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engine {
    /// Engine layout.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Displacement in cc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement: Option<f64>,
    /// Cooling type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling: Option<String>,
    /// Fuel system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_system: Option<String>,
}

/// Performance figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// Peak power.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
    /// Peak torque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torque: Option<Torque>,
    /// Top speed in km/h.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_speed: Option<f64>,
}

/// Peak power.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Power {
    /// Horsepower.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<f64>,
    /// Kilowatts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kw: Option<f64>,
    /// Engine speed at peak.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f64>,
}

/// Peak torque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Torque {
    /// Newton metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<f64>,
    /// Pound-feet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lbft: Option<f64>,
    /// Engine speed at peak.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f64>,
}

/// Image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alternative text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Image role (gallery, thumbnail, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Aggregated rating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Overall score.
    pub overall: f64,
    /// Number of reviews.
    pub reviews: u32,
}

/// Pagination metadata returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Page that was returned (1-based).
    pub current_page: u32,
    /// Total pages available.
    pub total_pages: u32,
    /// Total matching items.
    pub total_items: u64,
    /// Whether a following page exists.
    pub has_next: bool,
    /// Whether a preceding page exists.
    pub has_prev: bool,
}

impl Default for PaginationInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

/// Numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

/// Facet values the server offers for the current listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableFilters {
    /// Known brands.
    #[serde(default)]
    pub brands: Vec<String>,
    /// Known categories.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Price range across the catalogue.
    pub price_range: Range,
    /// Power range across the catalogue.
    pub power_range: Range,
}

impl Default for AvailableFilters {
    fn default() -> Self {
        Self {
            brands: Vec::new(),
            categories: Vec::new(),
            price_range: Range {
                min: 0.0,
                max: 100_000.0,
            },
            power_range: Range { min: 0.0, max: 500.0 },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{
            "_id": "1",
            "brand": "Honda",
            "model": "CBR600RR",
            "year": 2024,
            "category": "sport",
            "status": "active",
            "rating": {"overall": 4.5, "reviews": 12}
        }"#;
        let bike: Motorcycle = serde_json::from_str(json).unwrap();
        assert_eq!(bike.id, "1");
        assert_eq!(bike.display_name(), "Honda CBR600RR 2024");
        assert!(bike.images.is_empty());
        assert_eq!(bike.rating.unwrap().reviews, 12);
        assert!(bike.created_at.is_none());
    }

    #[test]
    fn test_timestamps_parse() {
        let bike: Motorcycle = serde_json::from_str(
            r#"{"_id": "3", "brand": "KTM", "model": "390 Duke", "year": 2024,
                "category": "naked", "createdAt": "2024-03-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(
            bike.created_at.unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
    }

    #[test]
    fn test_set_rating_creates_summary() {
        let mut bike: Motorcycle = serde_json::from_str(
            r#"{"_id": "2", "brand": "BMW", "model": "R1250GS", "year": 2023, "category": "adventure"}"#,
        )
        .unwrap();
        bike.set_rating(4.8, 3);
        assert_eq!(
            bike.rating,
            Some(Rating {
                overall: 4.8,
                reviews: 3
            })
        );
    }

    #[test]
    fn test_pagination_info_camel_case() {
        let info: PaginationInfo = serde_json::from_str(
            r#"{"currentPage": 2, "totalPages": 5, "totalItems": 42, "hasNext": true, "hasPrev": true}"#,
        )
        .unwrap();
        assert_eq!(info.current_page, 2);
        assert_eq!(info.total_items, 42);
    }
}
