//! Data-source collaborator interface.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SourceError;

/// A single record: field name to value.
pub type Row = serde_json::Map<String, Value>;

/// Records returned by one call, in source order.
pub type RowSet = Vec<Row>;

/// A fully materialized request against one source collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    /// Target source.
    pub source: String,
    /// Target collection.
    pub collection: String,
    /// Query parameters, ordered by name.
    pub params: BTreeMap<String, String>,
}

impl SourceRequest {
    /// Create a request without parameters.
    pub fn new(source: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            collection: collection.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Look up a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Fetches raw payloads from a data source.
///
/// Implementations own transport, credentials and status mapping. A 401-class
/// response must surface as [`SourceError::Unauthorized`].
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch the raw response payload for a request.
    async fn fetch(&self, request: &SourceRequest) -> Result<Value, SourceError>;
}
