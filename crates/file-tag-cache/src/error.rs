//! Error types for the file tag cache

use std::fmt;

/// Failures reported by a [`Storage`](crate::Storage) implementation
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    AlreadyExists(String),
    Io {
        path: String,
        source: Box<std::io::Error>,
    },
}

impl StorageError {
    pub(crate) fn io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
            _ => StorageError::Io {
                path: path.to_string(),
                source: Box::new(err),
            },
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(path) => write!(f, "File not found: {}", path),
            StorageError::AlreadyExists(path) => write!(f, "File already exists: {}", path),
            StorageError::Io { path, source } => write!(f, "IO error on {}: {}", path, source),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Errors surfaced by [`CachePool`](crate::CachePool)
#[derive(Debug)]
pub enum CacheError {
    InvalidKey(String),
    InvalidNamespace(String),
    Serialization(String),
    Storage(StorageError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::InvalidKey(key) => write!(
                f,
                "Invalid key \"{}\". Valid keys must match [a-zA-Z0-9_.! ]",
                key
            ),
            CacheError::InvalidNamespace(folder) => write!(
                f,
                "Invalid namespace \"{}\". Use slash-separated segments without leading or trailing slashes",
                folder
            ),
            CacheError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            CacheError::Storage(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for CacheError {
    fn from(err: StorageError) -> Self {
        CacheError::Storage(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_key_display() {
        let err = CacheError::InvalidKey("a/b".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid key \"a/b\". Valid keys must match [a-zA-Z0-9_.! ]"
        );
    }

    #[test]
    fn test_io_kind_mapping() {
        let not_found = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(
            StorageError::io("ns/k", not_found),
            StorageError::NotFound(p) if p == "ns/k"
        ));

        let exists = std::io::Error::from(std::io::ErrorKind::AlreadyExists);
        assert!(matches!(
            StorageError::io("ns/k", exists),
            StorageError::AlreadyExists(_)
        ));

        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = StorageError::io("ns/k", denied);
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_storage_error_wraps_into_cache_error() {
        let err: CacheError = StorageError::NotFound("ns/k".to_string()).into();
        assert_eq!(format!("{}", err), "Storage error: File not found: ns/k");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_is_debug() {
        let err = CacheError::Serialization("eof".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Serialization"));
    }
}
