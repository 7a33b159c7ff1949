//! Invalidating cached API responses across namespaces

use crate::error::{NamedCacheError, Result};
use crate::sanitize::sanitize;
use file_tag_cache::{CachePool, LocalStorage, Storage};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Generate the cache key an API client uses for a request
///
/// The key is the lowercased method name, a dot, and the SHA-256 of the
/// JSON-encoded parameters, e.g. `getclients.9f86d0...`.
pub fn request_token<P: Serialize + ?Sized>(method: &str, params: &P) -> Result<String> {
    let encoded = serde_json::to_vec(params)?;
    let digest = Sha256::digest(&encoded);
    Ok(format!("{}.{}", method.to_lowercase(), hex::encode(digest)))
}

/// Whether `a` and `b` name the same folder or one contains the other
fn overlaps(a: &str, b: &str) -> bool {
    a == b || a.starts_with(&format!("{b}/")) || b.starts_with(&format!("{a}/"))
}

/// Removes cached entries from a set of namespaces sharing one storage root
///
/// Namespaces must be disjoint: clearing a folder wipes everything below it,
/// so `cache` and `cache/whmcs` cannot be managed side by side.
pub struct CacheDisposer {
    pools: BTreeMap<String, CachePool>,
}

impl CacheDisposer {
    pub fn new(storage: Arc<dyn Storage>, namespaces: &[&str]) -> Result<Self> {
        for (i, a) in namespaces.iter().enumerate() {
            if let Some(b) = namespaces[i + 1..].iter().find(|b| overlaps(a, b)) {
                return Err(NamedCacheError::OverlappingNamespace(
                    a.to_string(),
                    b.to_string(),
                ));
            }
        }

        let mut pools = BTreeMap::new();
        for namespace in namespaces {
            let pool = CachePool::new(storage.clone(), namespace)?;
            pools.insert(namespace.to_string(), pool);
        }
        Ok(Self { pools })
    }

    /// Dispose of caches kept on the local disk under `cache_dir`
    pub fn open(cache_dir: impl Into<PathBuf>, namespaces: &[&str]) -> Result<Self> {
        Self::new(Arc::new(LocalStorage::new(cache_dir)), namespaces)
    }

    pub fn pool(&self, namespace: &str) -> Result<&CachePool> {
        self.pools
            .get(namespace)
            .ok_or_else(|| NamedCacheError::UnknownNamespace(namespace.to_string()))
    }

    /// Drop the cached response for one request
    pub fn remove_request<P: Serialize + ?Sized>(
        &self,
        namespace: &str,
        method: &str,
        params: &P,
    ) -> Result<()> {
        let key = sanitize(&request_token(method, params)?);
        self.pool(namespace)?.delete(&key)?;
        info!(namespace, key = %key, "Removed cached request");
        Ok(())
    }

    pub fn clear(&self, namespace: &str) -> Result<()> {
        self.pool(namespace)?.clear()?;
        Ok(())
    }

    pub fn clear_all(&self) -> Result<()> {
        for pool in self.pools.values() {
            pool.clear()?;
        }
        Ok(())
    }
}
