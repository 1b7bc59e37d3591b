//! Query-string assembly.
//!
//! # Design
//! Each request type implements `EncodeQuery` and writes its fields one by
//! one, so the mapping from field to parameter is visible in code rather
//! than discovered at runtime. Values with their own mini-grammar implement
//! `QueryValue`.
//!
//! Parameters are kept sorted by key and a later `set` replaces an earlier
//! one, which is what lets the endpoint builders override any request field
//! with the API key and output format.

use std::collections::BTreeMap;

use url::Url;

use crate::error::ApiError;

/// A value that serializes to a single query parameter.
pub trait QueryValue {
    fn to_query_value(&self) -> Result<String, ApiError>;
}

/// A request that serializes to a set of query parameters.
pub trait EncodeQuery {
    fn encode_query(&self, params: &mut QueryParams) -> Result<(), ApiError>;
}

/// Ordered parameter map with set-replaces semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode `value` under `key`. Fails without touching the map.
    pub fn encode<V: QueryValue + ?Sized>(&mut self, key: &str, value: &V) -> Result<(), ApiError> {
        let encoded = value.to_query_value()?;
        self.set(key, encoded);
        Ok(())
    }

    /// Encode `value` under `key` when present, omit the key otherwise.
    pub fn encode_opt<V: QueryValue>(&mut self, key: &str, value: Option<&V>) -> Result<(), ApiError> {
        match value {
            Some(v) => self.encode(key, v),
            None => Ok(()),
        }
    }

    pub fn set_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.set(key, v);
        }
    }

    /// Emit `true` when the flag is set; omit the key otherwise.
    pub fn set_flag(&mut self, key: &str, flag: bool) {
        if flag {
            self.set(key, "true");
        }
    }

    /// Emit the flag in both states. For parameters whose service default is `true`.
    pub fn set_bool(&mut self, key: &str, flag: bool) {
        self.set(key, if flag { "true" } else { "false" });
    }

    /// Emit a limit, clamping negative values to zero.
    pub fn set_limit(&mut self, key: &str, limit: Option<i32>) {
        if let Some(n) = limit {
            self.set(key, n.max(0).to_string());
        }
    }

    /// Comma-join a list; omit the key when the list is empty.
    pub fn set_list(&mut self, key: &str, items: &[String]) {
        if !items.is_empty() {
            self.set(key, items.join(","));
        }
    }

    /// Build `{base}/{path}?{params}`.
    pub fn to_url(&self, base: &str, path: &str) -> Result<String, ApiError> {
        let mut url = Url::parse(&format!("{base}/{path}"))
            .map_err(|e| ApiError::Encoding(format!("invalid URL {base}/{path}: {e}")))?;
        if !self.pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(self.iter());
        }
        Ok(url.into())
    }
}

/// Coordinates always use six decimals.
pub(crate) fn coord(value: f64) -> String {
    format!("{value:.6}")
}
