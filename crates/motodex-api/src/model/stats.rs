//! Catalogue statistics and upload results.

use serde::{Deserialize, Serialize};

/// Catalogue-wide counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    /// Motorcycles in the catalogue.
    pub total_motorcycles: u64,
    /// Distinct brands.
    pub total_brands: u64,
    /// Distinct categories.
    pub total_categories: u64,
    /// Registered users.
    pub total_users: u64,
    /// Published reviews.
    pub total_reviews: u64,
}

/// Motorcycles per brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandCount {
    /// Brand name.
    pub brand: String,
    /// Motorcycle count.
    pub count: u64,
}

/// Motorcycles per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Motorcycle count.
    pub count: u64,
}

/// A file to upload in a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Creates a JPEG part, the format the mobile uploads use.
    #[must_use]
    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

/// Body returned by single-file uploads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedUrl {
    /// Public URL of the upload.
    pub url: String,
}

/// Body returned by multi-file uploads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedUrls {
    /// Public URLs in upload order.
    pub urls: Vec<String>,
}
