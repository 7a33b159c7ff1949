//! Cache configuration

use std::path::PathBuf;
use std::time::Duration;

/// Where a pool keeps its files and how long entries live by default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Storage root holding every namespace
    pub cache_dir: PathBuf,
    /// Folder below `cache_dir`, e.g. `cache/whmcs`
    pub namespace: String,
    /// Default TTL; `None` keeps entries until deleted
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache"),
            namespace: "cache".to_string(),
            ttl_secs: Some(24 * 60 * 60), // 24 hours
        }
    }
}

impl CacheConfig {
    /// Load from `CACHE_DIR`, `CACHE_NAMESPACE` and `CACHE_TTL_SECS`
    ///
    /// Unset or unparsable variables fall back to the defaults. A TTL of `0`
    /// disables expiration.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let cache_dir = var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let namespace = var("CACHE_NAMESPACE")
            .map(|s| s.trim_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.namespace);

        let ttl_secs = match var("CACHE_TTL_SECS").and_then(|s| s.parse::<u64>().ok()) {
            Some(0) => None,
            Some(secs) => Some(secs),
            None => defaults.ttl_secs,
        };

        Self {
            cache_dir,
            namespace,
            ttl_secs,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}
