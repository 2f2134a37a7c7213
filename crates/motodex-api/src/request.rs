//! Request descriptors.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::error::Result;
use crate::model::FilePart;
use crate::query::{QueryParams, ToQuery};

/// Body of a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON body.
    Json(serde_json::Value),
    /// Multipart form: file fields followed by text fields.
    Multipart {
        /// `(field name, file)` pairs.
        files: Vec<(String, FilePart)>,
        /// `(field name, value)` pairs.
        fields: Vec<(String, String)>,
    },
}

impl RequestBody {
    /// Builds a fresh multipart form; forms are single-use, so replays rebuild them.
    ///
    /// # Errors
    ///
    /// Returns an error if a part's MIME type is invalid.
    pub fn to_form(&self) -> Result<Option<Form>> {
        let Self::Multipart { files, fields } = self else {
            return Ok(None);
        };

        let mut form = Form::new();
        for (name, file) in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime_type)?;
            form = form.part(name.clone(), part);
        }
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        Ok(Some(form))
    }
}

/// One logical API call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Fixed path relative to the base URL.
    pub path: String,
    /// Caller-supplied segments appended after `path`, each encoded whole.
    pub segments: Vec<String>,
    /// Query parameters.
    pub query: QueryParams,
    /// Request body.
    pub body: RequestBody,
    /// Safe to repeat after a connection-level failure.
    pub idempotent: bool,
    /// A 401 may be recovered by refreshing the access token.
    pub refreshable: bool,
}

impl RequestDescriptor {
    fn new(method: Method, path: impl Into<String>, idempotent: bool) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: QueryParams::new(),
            body: RequestBody::Empty,
            idempotent,
            refreshable: true,
        }
    }

    /// An idempotent `GET`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, true)
    }

    /// A non-idempotent `POST`.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path, false)
    }

    /// A non-idempotent `PUT`.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path, false)
    }

    /// A non-idempotent `DELETE`.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path, false)
    }

    /// Appends one path segment, typically a resource id.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Overrides the idempotency flag.
    #[must_use]
    pub const fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    /// Disables refresh-and-replay on 401 (credential endpoints).
    #[must_use]
    pub const fn without_refresh(mut self) -> Self {
        self.refreshable = false;
        self
    }

    /// Appends one query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl Into<crate::query::QueryValue>) -> Self {
        self.query.push(key, value);
        self
    }

    /// Appends the parameters of `source`, if any.
    #[must_use]
    pub fn query_from(mut self, source: Option<&impl ToQuery>) -> Self {
        if let Some(source) = source {
            self.query.extend_from(source);
        }
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Sets a multipart body.
    #[must_use]
    pub fn multipart(
        mut self,
        files: Vec<(String, FilePart)>,
        fields: Vec<(String, String)>,
    ) -> Self {
        self.body = RequestBody::Multipart { files, fields };
        self
    }

    /// Path with segments and the encoded query appended, for logging.
    #[must_use]
    pub fn target(&self) -> String {
        let mut target = self.path.clone();
        for segment in &self.segments {
            target.push('/');
            target.push_str(segment);
        }
        if !self.query.is_empty() {
            target.push('?');
            target.push_str(&self.query.to_query_string());
        }
        target
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{MotorcycleFilters, Pagination};

    #[test]
    fn test_get_is_idempotent() {
        assert!(RequestDescriptor::get("/motorcycles").idempotent);
        assert!(!RequestDescriptor::post("/favorites").idempotent);
        assert!(!RequestDescriptor::delete("/reviews/1").idempotent);
    }

    #[test]
    fn test_target_includes_query() {
        let filters = MotorcycleFilters::new().with_brands(["Honda"]);
        let request = RequestDescriptor::get("/motorcycles")
            .query_from(Some(&filters))
            .query_from(Some(&Pagination::new(2, 5).unwrap()));
        assert_eq!(request.target(), "/motorcycles?brand=Honda&page=2&limit=5");
    }

    #[test]
    fn test_segments_follow_path() {
        let request = RequestDescriptor::post("/reviews")
            .segment("r1")
            .segment("helpful");
        assert_eq!(request.path, "/reviews");
        assert_eq!(request.segments, ["r1", "helpful"]);
        assert_eq!(request.target(), "/reviews/r1/helpful");
    }

    #[test]
    fn test_json_body() {
        let request = RequestDescriptor::post("/auth/forgot-password")
            .json(&serde_json::json!({"email": "a@b.co"}))
            .unwrap();
        assert_eq!(
            request.body,
            RequestBody::Json(serde_json::json!({"email": "a@b.co"}))
        );
    }

    #[test]
    fn test_form_only_for_multipart() {
        assert!(RequestBody::Empty.to_form().unwrap().is_none());
        let body = RequestBody::Multipart {
            files: vec![("avatar".to_string(), FilePart::jpeg("a.jpg", vec![1, 2]))],
            fields: vec![],
        };
        assert!(body.to_form().unwrap().is_some());
    }
}
