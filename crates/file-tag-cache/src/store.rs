//! Entry persistence

use crate::error::Result;
use crate::namespace::Namespace;
use crate::types::CacheEntry;
use serde::Serialize;
use tracing::warn;

/// Reads and writes whole entries, one record per key
#[derive(Clone)]
pub(crate) struct EntryStore {
    namespace: Namespace,
}

impl EntryStore {
    pub(crate) fn new(namespace: Namespace) -> Self {
        Self { namespace }
    }

    /// Load the entry for `key`; missing and undecodable records are both `None`
    pub(crate) fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let Some(bytes) = self.namespace.read(key)? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(key = %key, error = %e, "Undecodable cache entry, treating as miss");
                Ok(None)
            }
        }
    }

    pub(crate) fn save<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) -> Result<()> {
        let bytes = serde_json::to_vec(entry)?;
        self.namespace.store(key, &bytes)
    }

    pub(crate) fn remove(&self, key: &str) -> Result<()> {
        self.namespace.remove(key)
    }

    pub(crate) fn clear(&self) -> Result<()> {
        self.namespace.reset()
    }
}
