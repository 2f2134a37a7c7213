//! Response envelope normalization.
//!
//! Single-resource endpoints wrap their payload as
//! `{ success, data?, message?, error? }` while list endpoints return
//! `{ items, pagination, filters }` bare. Both shapes are collapsed into a
//! plain `Result` here so nothing downstream branches on endpoint shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, FieldError, Result};
use crate::model::{AvailableFilters, MotorcycleFilters, PaginationInfo};

/// Envelope used by single-resource endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the server considers the call successful.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Payload.
    #[serde(default)]
    pub data: Option<T>,
    /// Informational or error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Error description.
    #[serde(default)]
    pub error: Option<String>,
}

const fn default_success() -> bool {
    true
}

/// Filters echoed by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFilters {
    /// Filters the server applied.
    #[serde(default)]
    pub applied: Option<MotorcycleFilters>,
    /// Facet values available for further filtering.
    #[serde(default)]
    pub available: Option<AvailableFilters>,
}

/// A page of records from a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Records in server order.
    #[serde(alias = "motorcycles")]
    pub items: Vec<T>,
    /// Pagination metadata.
    #[serde(default)]
    pub pagination: PaginationInfo,
    /// Applied and available filters.
    #[serde(default)]
    pub filters: ListFilters,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Error description.
    #[serde(default)]
    pub error: Option<String>,
    /// Field-level messages.
    #[serde(default)]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorBody {
    /// Parses an error body, tolerating empty or non-JSON payloads.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Server message; `message` wins over `error`.
    #[must_use]
    pub fn text(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_default()
    }
}

/// Converts a non-2xx response into the error taxonomy.
#[must_use]
pub fn error_from_status(status: u16, body: &[u8]) -> Error {
    let parsed = ErrorBody::parse(body);
    let message = parsed.text();

    match (status, parsed.errors) {
        (401, _) => Error::Unauthorized(if message.is_empty() {
            "Authentication required".to_string()
        } else {
            message
        }),
        (400..=499, Some(fields)) if !fields.is_empty() => Error::Validation {
            status,
            message,
            fields,
        },
        _ => Error::server(status, message),
    }
}

/// Unwraps a single-resource envelope from a 2xx body.
///
/// An empty body or a missing `data` field is accepted when `T` can be
/// built from `null` (e.g. `()` or `Option<_>`).
///
/// # Errors
///
/// Returns `Server` for `success: false`, `Unknown` for malformed bodies or
/// a missing payload.
pub fn normalize_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return from_null();
    }

    let envelope: ApiEnvelope<Value> = serde_json::from_slice(body)?;
    if !envelope.success {
        let message = envelope
            .message
            .or(envelope.error)
            .unwrap_or_default();
        return Err(Error::server(status, message));
    }

    match envelope.data {
        Some(Value::Null) | None => from_null(),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}

/// Parses a list body, accepting it bare or wrapped in an envelope.
///
/// # Errors
///
/// Returns `Server` for `success: false`, `Unknown` for malformed bodies.
pub fn normalize_list<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<ListResponse<T>> {
    let value: Value = serde_json::from_slice(body)?;
    if value.get("success").is_some() {
        return normalize_envelope(status, body);
    }
    Ok(serde_json::from_value(value)?)
}

fn from_null<T: DeserializeOwned>() -> Result<T> {
    serde_json::from_value(Value::Null)
        .map_err(|_| Error::Unknown("response is missing its data payload".to_string()))
}
