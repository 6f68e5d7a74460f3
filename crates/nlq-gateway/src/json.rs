//! JSON response types for the HTTP gateway.

use nlq_core::SourceSchema;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Number of registered sources.
    pub sources: usize,
    /// Cached result sets, expired ones included.
    pub cache_entries: usize,
    /// Cache hit rate since start (0.0 to 1.0).
    pub cache_hit_rate: f64,
}

/// Registry listing.
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    /// Registered sources with their collections and fields.
    pub sources: Vec<SourceSchema>,
}
