//! Result cache for fetched row sets.
//!
//! Entries are keyed by source, collection and the sorted request parameters,
//! and live for a fixed TTL. Expiry is checked on access only; an expired
//! entry is evicted by the lookup that finds it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::source::{RowSet, SourceRequest};

/// Default time-to-live for cached results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Normalized cache key for one call.
///
/// Parameters are sorted by name, so two requests that differ only in the
/// order their parameters were added produce the same key.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CacheKey {
    source: String,
    collection: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    /// Create a key from a source, collection and parameters in any order.
    pub fn new<I, K, V>(source: impl Into<String>, collection: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            source: source.into(),
            collection: collection.into(),
            params: params.into_iter().collect(),
        }
    }

    /// Create the key for a materialized request.
    pub fn for_request(request: &SourceRequest) -> Self {
        Self {
            source: request.source.clone(),
            collection: request.collection.clone(),
            params: request
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Source part of the key.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Collection part of the key.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    rows: RowSet,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
}

impl CacheStats {
    /// Get hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    /// Get miss count, including lookups that found an expired entry.
    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    /// Get the number of entries evicted on expiry.
    pub fn expirations(&self) -> u64 {
        self.expirations.load(AtomicOrdering::Relaxed)
    }

    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

/// Time-bounded cache of fetched row sets, shared by concurrent dispatches.
///
/// Concurrent writers to the same key are allowed; the last write wins.
/// There is no size bound.
#[derive(Debug)]
pub struct ResultCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    stats: CacheStats,
}

impl ResultCache {
    /// Create a cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            stats: CacheStats::default(),
        }
    }

    /// The entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the cached rows for a key, if present and not expired.
    pub fn get(&self, key: &CacheKey) -> Option<RowSet> {
        let now = Instant::now();

        // The map guard must be released before an expired entry is removed.
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                self.stats.hits.fetch_add(1, AtomicOrdering::Relaxed);
                return Some(entry.rows.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            let ttl = self.ttl;
            if self
                .entries
                .remove_if(key, |_, entry| !entry.is_fresh(now, ttl))
                .is_some()
            {
                self.stats.expirations.fetch_add(1, AtomicOrdering::Relaxed);
            }
        }

        self.stats.misses.fetch_add(1, AtomicOrdering::Relaxed);
        None
    }

    /// Store rows under a key, replacing any previous entry.
    pub fn put(&self, key: CacheKey, rows: RowSet) {
        self.entries.insert(
            key,
            CacheEntry {
                rows,
                stored_at: Instant::now(),
            },
        );
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}
