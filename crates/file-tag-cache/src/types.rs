//! Cache types

use serde::{Deserialize, Serialize};

/// One stored unit: the value with its tags and expiration
///
/// Entries are always encoded and replaced whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T = serde_json::Value> {
    pub value: T,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unix timestamp in seconds; `None` never expires
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl<T> CacheEntry<T> {
    /// Stale once the clock has moved strictly past `expires_at`
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries evicted on read because they had expired
    pub expired: u64,
}
