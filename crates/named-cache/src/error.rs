//! Error types for named caches

use file_tag_cache::CacheError;
use std::fmt;

#[derive(Debug)]
pub enum NamedCacheError {
    UnknownNamespace(String),
    /// Two namespaces where one is, or lives inside, the other
    OverlappingNamespace(String, String),
    Cache(CacheError),
}

impl fmt::Display for NamedCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedCacheError::UnknownNamespace(ns) => write!(f, "Unknown cache namespace: {}", ns),
            NamedCacheError::OverlappingNamespace(a, b) => {
                write!(f, "Cache namespaces overlap: {} and {}", a, b)
            }
            NamedCacheError::Cache(err) => write!(f, "Cache error: {}", err),
        }
    }
}

impl std::error::Error for NamedCacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NamedCacheError::Cache(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CacheError> for NamedCacheError {
    fn from(err: CacheError) -> Self {
        NamedCacheError::Cache(err)
    }
}

impl From<serde_json::Error> for NamedCacheError {
    fn from(err: serde_json::Error) -> Self {
        NamedCacheError::Cache(CacheError::from(err))
    }
}

pub type Result<T> = std::result::Result<T, NamedCacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_namespace_display() {
        let err = NamedCacheError::UnknownNamespace("cache/nope".to_string());
        assert_eq!(format!("{}", err), "Unknown cache namespace: cache/nope");
    }

    #[test]
    fn test_overlapping_namespace_display() {
        let err = NamedCacheError::OverlappingNamespace(
            "cache".to_string(),
            "cache/whmcs".to_string(),
        );
        assert_eq!(
            format!("{}", err),
            "Cache namespaces overlap: cache and cache/whmcs"
        );
    }

    #[test]
    fn test_cache_error_display() {
        let err = NamedCacheError::from(CacheError::InvalidKey("a/b".to_string()));
        assert!(format!("{}", err).starts_with("Cache error: Invalid key \"a/b\""));
    }

    #[test]
    fn test_error_is_debug() {
        let err = NamedCacheError::UnknownNamespace("x".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("UnknownNamespace"));
    }
}
