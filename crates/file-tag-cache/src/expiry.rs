//! Lazy expiration
//!
//! Staleness is only checked when an entry is read. Nothing sweeps the
//! namespace, so an expired entry that is never read again stays on disk
//! until the next read or clear.

use crate::clock::Clock;
use crate::error::Result;
use crate::store::EntryStore;
use crate::tags::TagIndex;
use crate::types::CacheEntry;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct ExpiryPolicy {
    clock: Arc<dyn Clock>,
}

impl ExpiryPolicy {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now().timestamp()
    }

    /// Absolute expiration for a TTL; zero or overflowing TTLs never expire
    pub(crate) fn expires_at(&self, ttl: Option<Duration>) -> Option<i64> {
        let ttl = ttl.filter(|t| !t.is_zero())?;
        // Partial seconds round up
        let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
        i64::try_from(secs)
            .ok()
            .and_then(|secs| self.now().checked_add(secs))
    }

    /// Return `entry` if still fresh, otherwise evict it and return `None`
    ///
    /// Eviction removes `key` from every tag list the entry names, then
    /// deletes the entry itself.
    pub(crate) fn check(
        &self,
        key: &str,
        entry: CacheEntry,
        store: &EntryStore,
        tags: &TagIndex,
    ) -> Result<Option<CacheEntry>> {
        let now = self.now();
        if !entry.is_expired(now) {
            return Ok(Some(entry));
        }

        debug!(key = %key, expires_at = ?entry.expires_at, now, "Cache entry expired");
        for tag in &entry.tags {
            tags.remove_key(tag, key)?;
        }
        store.remove(key)?;
        Ok(None)
    }
}
