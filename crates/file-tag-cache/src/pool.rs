//! Tag-aware cache pool over a storage backend

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::expiry::ExpiryPolicy;
use crate::key::{tag_record, validate_key};
use crate::namespace::Namespace;
use crate::storage::{LocalStorage, Storage};
use crate::store::EntryStore;
use crate::tags::TagIndex;
use crate::types::{CacheEntry, CacheStats};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A key/value cache persisted as one file per key inside a namespace
///
/// Entries can carry tags; every tag keeps a list of its keys so the whole
/// group can be invalidated at once. Expired entries are evicted when read.
///
/// All operations block on the underlying storage. Several pools may share a
/// namespace, in which case concurrent writers to the same tag can lose tag
/// list updates.
#[derive(Clone)]
pub struct CachePool {
    namespace: Namespace,
    store: EntryStore,
    tags: TagIndex,
    expiry: ExpiryPolicy,
    default_ttl: Option<Duration>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    expired: Arc<AtomicU64>,
}

impl CachePool {
    /// Create a pool over `storage`, creating the `namespace` folder if needed
    pub fn new(storage: Arc<dyn Storage>, namespace: &str) -> Result<Self> {
        Self::with_clock(storage, namespace, Arc::new(SystemClock))
    }

    pub fn with_clock(
        storage: Arc<dyn Storage>,
        namespace: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let namespace = Namespace::open(storage, namespace)?;
        info!(namespace = %namespace.folder(), "Cache pool initialized");
        Ok(Self {
            store: EntryStore::new(namespace.clone()),
            tags: TagIndex::new(namespace.clone()),
            namespace,
            expiry: ExpiryPolicy::new(clock),
            default_ttl: None,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            expired: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Open a pool on the local disk as described by `config`
    ///
    /// The configured TTL becomes the pool's default TTL.
    pub fn open(config: &CacheConfig) -> Result<Self> {
        let storage = Arc::new(LocalStorage::new(config.cache_dir.clone()));
        Ok(Self::new(storage, &config.namespace)?.with_default_ttl(config.ttl()))
    }

    /// TTL applied to writes that do not pass one
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// The same storage, clock and default TTL, pointed at another folder
    ///
    /// Statistics start from zero for the new pool.
    pub fn with_namespace(&self, namespace: &str) -> Result<Self> {
        let namespace = self.namespace.sibling(namespace)?;
        info!(namespace = %namespace.folder(), "Cache pool initialized");
        Ok(Self {
            store: EntryStore::new(namespace.clone()),
            tags: TagIndex::new(namespace.clone()),
            namespace,
            expiry: self.expiry.clone(),
            default_ttl: self.default_ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            expired: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn namespace(&self) -> &str {
        self.namespace.folder()
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Load the full entry for `key`, evicting it if it has expired
    pub fn fetch(&self, key: &str) -> Result<Option<CacheEntry>> {
        validate_key(key)?;

        let Some(entry) = self.store.load(key)? else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
            return Ok(None);
        };

        match self.expiry.check(key, entry, &self.store, &self.tags)? {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                Ok(Some(entry))
            }
            None => {
                self.expired.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        Ok(self.fetch(key)?.is_some())
    }

    /// Get the value stored under `key`
    ///
    /// A value that no longer decodes as `T` is reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(entry) = self.fetch(key)? else {
            return Ok(None);
        };
        match serde_json::from_value(entry.value) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Cached value has unexpected shape, treating as miss");
                Ok(None)
            }
        }
    }

    /// Store `value` under `key`
    ///
    /// A `None` TTL falls back to the pool's default TTL. A zero TTL, or
    /// `None` on a pool without a default, never expires.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.set_with_tags(key, value, &[], ttl)
    }

    /// Store `value` under `key` and register it with every tag in `tags`
    ///
    /// The entry replaces any previous one whole. Tags the previous entry had
    /// but the new one does not no longer list `key`.
    pub fn set_with_tags<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        tags: &[&str],
        ttl: Option<Duration>,
    ) -> Result<()> {
        validate_key(key)?;
        let mut unique_tags: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            tag_record(tag)?;
            if !unique_tags.iter().any(|t| t == tag) {
                unique_tags.push(tag.to_string());
            }
        }

        let previous = self.store.load(key)?;
        let entry = CacheEntry {
            value,
            tags: unique_tags,
            expires_at: self.expiry.expires_at(ttl.or(self.default_ttl)),
        };
        self.store.save(key, &entry)?;

        if let Some(previous) = previous {
            for tag in previous.tags.iter().filter(|t| !entry.tags.contains(*t)) {
                self.tags.remove_key(tag, key)?;
            }
        }
        for tag in &entry.tags {
            if !self.tags.list_keys(tag)?.iter().any(|k| k == key) {
                self.tags.append_key(tag, key)?;
            }
        }

        debug!(key = %key, tags = ?entry.tags, expires_at = ?entry.expires_at, "Cached value");
        Ok(())
    }

    /// Delete `key` and drop it from its tag lists; deleting a missing key succeeds
    pub fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        if let Some(entry) = self.store.load(key)? {
            for tag in &entry.tags {
                self.tags.remove_key(tag, key)?;
            }
        }
        self.store.remove(key)?;
        debug!(key = %key, "Deleted cache entry");
        Ok(())
    }

    /// Wipe every entry and tag list in the namespace
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }

    /// Look up several keys; every key is validated before any is read
    pub fn get_multiple<T, K>(&self, keys: &[K]) -> Result<BTreeMap<String, Option<T>>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        for key in keys {
            validate_key(key.as_ref())?;
        }
        let mut found = BTreeMap::new();
        for key in keys {
            found.insert(key.as_ref().to_string(), self.get(key.as_ref())?);
        }
        Ok(found)
    }

    /// Store several values with one TTL
    ///
    /// Writes happen key by key: a storage failure part way through leaves
    /// the earlier keys written.
    pub fn set_multiple<T, K>(&self, values: &[(K, T)], ttl: Option<Duration>) -> Result<()>
    where
        T: Serialize,
        K: AsRef<str>,
    {
        for (key, _) in values {
            validate_key(key.as_ref())?;
        }
        for (key, value) in values {
            self.set(key.as_ref(), value, ttl)?;
        }
        Ok(())
    }

    pub fn delete_multiple<K: AsRef<str>>(&self, keys: &[K]) -> Result<()> {
        for key in keys {
            validate_key(key.as_ref())?;
        }
        for key in keys {
            self.delete(key.as_ref())?;
        }
        Ok(())
    }

    /// Keys currently registered under `tag`
    pub fn tag_keys(&self, tag: &str) -> Result<Vec<String>> {
        self.tags.list_keys(tag)
    }

    /// Delete every entry carrying `tag`, then the tag list itself
    pub fn invalidate_tag(&self, tag: &str) -> Result<()> {
        let keys = self.tags.list_keys(tag)?;
        for key in &keys {
            self.delete(key)?;
        }
        self.tags.remove_index(tag)?;
        info!(namespace = %self.namespace(), tag, entries = keys.len(), "Invalidated cache tag");
        Ok(())
    }

    pub fn invalidate_tags(&self, tags: &[&str]) -> Result<()> {
        for tag in tags {
            self.invalidate_tag(tag)?;
        }
        Ok(())
    }

    /// Get current cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}
