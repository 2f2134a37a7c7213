//! Query parameter serialization.
//!
//! List values are written as repeated keys (`brand=Honda&brand=Ducati`),
//! one pair per element, which is what the catalogue server expects for
//! array filters.

use url::form_urlencoded;

/// A scalar or list query value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// String value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// List value, expanded to repeated keys.
    List(Vec<String>),
}

impl QueryValue {
    fn scalar(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::List(_) => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<&[String]> for QueryValue {
    fn from(value: &[String]) -> Self {
        Self::List(value.to_vec())
    }
}

impl From<&Vec<String>> for QueryValue {
    fn from(value: &Vec<String>) -> Self {
        Self::List(value.clone())
    }
}

/// Types that contribute query parameters.
pub trait ToQuery {
    /// Appends this value's parameters.
    fn append_to(&self, params: &mut QueryParams);
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value; lists expand to one pair per element.
    pub fn push(&mut self, key: &str, value: impl Into<QueryValue>) -> &mut Self {
        match value.into() {
            QueryValue::List(items) => {
                for item in items {
                    self.pairs.push((key.to_string(), item));
                }
            }
            scalar => {
                if let Some(text) = scalar.scalar() {
                    self.pairs.push((key.to_string(), text));
                }
            }
        }
        self
    }

    /// Appends a value when present.
    pub fn push_opt<V: Into<QueryValue>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Appends everything `source` contributes.
    pub fn extend_from(&mut self, source: &impl ToQuery) -> &mut Self {
        source.append_to(self);
        self
    }

    /// Returns true when no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of key/value pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// All pairs in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Every value recorded for `key`, in order.
    #[must_use]
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// First value recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Encodes the parameters as `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Parses an encoded query string, keeping order and repeated keys.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scalars() {
        let mut params = QueryParams::new();
        params
            .push("page", 2_u32)
            .push("minPrice", 15000.0)
            .push("electric", true)
            .push("search", "cbr 600");
        assert_eq!(
            params.to_query_string(),
            "page=2&minPrice=15000&electric=true&search=cbr+600"
        );
    }

    #[test]
    fn test_lists_use_repeated_keys() {
        let mut params = QueryParams::new();
        params.push("brand", vec!["Honda".to_string(), "Ducati".to_string()]);
        assert_eq!(params.to_query_string(), "brand=Honda&brand=Ducati");
    }

    #[test]
    fn test_push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt::<u32>("limit", None).push_opt("page", Some(1_u32));
        assert_eq!(params.to_query_string(), "page=1");
    }

    #[test]
    fn test_empty_list_adds_nothing() {
        let mut params = QueryParams::new();
        params.push("category", Vec::<String>::new());
        assert!(params.is_empty());
    }

    #[test]
    fn test_parse_leading_question_mark() {
        let params = QueryParams::parse("?brand=BMW&page=3");
        assert_eq!(params.get("page"), Some("3"));
        assert_eq!(params.values("brand"), vec!["BMW"]);
    }

    proptest! {
        #[test]
        fn prop_list_round_trip(items in proptest::collection::vec(".*", 0..8)) {
            let mut params = QueryParams::new();
            params.push("sortBy", "price");
            params.push("brand", items.clone());
            params.push("page", 1_u32);

            let encoded = params.to_query_string();
            let parsed = QueryParams::parse(&encoded);

            prop_assert_eq!(parsed.values("brand").len(), items.len());
            let decoded: Vec<String> = parsed
                .values("brand")
                .into_iter()
                .map(String::from)
                .collect();
            prop_assert_eq!(decoded, items);
        }
    }
}
