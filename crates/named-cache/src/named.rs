//! Cache front-end for callers holding raw names

use crate::sanitize::sanitize;
use file_tag_cache::{CacheConfig, CachePool};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// A cache that accepts arbitrary names and applies one fixed TTL
///
/// Names are sanitized before they reach the pool. Failures are logged and
/// reported as "nothing found" or `false`, so reads never distinguish a miss
/// from a broken cache.
#[derive(Clone)]
pub struct NamedCache {
    pool: CachePool,
    ttl: Option<Duration>,
}

impl NamedCache {
    pub fn new(pool: CachePool, ttl: Option<Duration>) -> Self {
        Self { pool, ttl }
    }

    /// Open a local-disk cache with the namespace and TTL from `config`
    pub fn open(config: &CacheConfig) -> file_tag_cache::Result<Self> {
        Ok(Self::new(CachePool::open(config)?, config.ttl()))
    }

    pub fn pool(&self) -> &CachePool {
        &self.pool
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn has(&self, name: &str) -> bool {
        let key = sanitize(name);
        self.pool.has(&key).unwrap_or_else(|e| {
            warn!(name, key = %key, error = %e, "Cache lookup failed");
            false
        })
    }

    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let key = sanitize(name);
        self.pool.get(&key).unwrap_or_else(|e| {
            warn!(name, key = %key, error = %e, "Cache read failed");
            None
        })
    }

    /// Store `value` under `name` with the cache's TTL
    pub fn set<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> bool {
        let key = sanitize(name);
        match self.pool.set(&key, value, self.ttl) {
            Ok(()) => true,
            Err(e) => {
                warn!(name, key = %key, error = %e, "Cache write failed");
                false
            }
        }
    }

    pub fn delete(&self, name: &str) -> bool {
        let key = sanitize(name);
        match self.pool.delete(&key) {
            Ok(()) => true,
            Err(e) => {
                warn!(name, key = %key, error = %e, "Cache delete failed");
                false
            }
        }
    }

    pub fn clear(&self) -> bool {
        match self.pool.clear() {
            Ok(()) => true,
            Err(e) => {
                warn!(namespace = %self.pool.namespace(), error = %e, "Cache clear failed");
                false
            }
        }
    }

    /// Values for several names, keyed by the names as given
    pub fn get_multiple<T: DeserializeOwned>(&self, names: &[&str]) -> BTreeMap<String, Option<T>> {
        names
            .iter()
            .map(|name| (name.to_string(), self.get(name)))
            .collect()
    }

    /// Store several values; `true` only if every write succeeded
    pub fn set_multiple<T: Serialize>(&self, values: &[(&str, T)]) -> bool {
        values
            .iter()
            .fold(true, |ok, (name, value)| self.set(name, value) && ok)
    }

    pub fn delete_multiple(&self, names: &[&str]) -> bool {
        names.iter().fold(true, |ok, name| self.delete(name) && ok)
    }
}
