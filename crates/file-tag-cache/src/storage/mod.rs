//! Byte-oriented file storage used by the cache pool
//!
//! Paths are relative, slash-separated strings such as `cache/whmcs/key`.
//! Implementations decide how they map onto real locations.

mod local;
#[cfg(test)]
pub(crate) mod memory;

pub use local::LocalStorage;

use crate::error::StorageError;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Access marker applied to files and directories when they are created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

/// Raw storage capability consumed by [`CachePool`](crate::CachePool)
pub trait Storage: Send + Sync {
    /// Read the full contents at `path`, or `NotFound`
    fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Create a new file. Fails with `AlreadyExists` if `path` is taken.
    fn write(&self, path: &str, contents: &[u8], visibility: Visibility) -> StorageResult<()>;

    /// Replace an existing file. Fails with `NotFound` if `path` is absent.
    fn update(&self, path: &str, contents: &[u8], visibility: Visibility) -> StorageResult<()>;

    fn delete(&self, path: &str) -> StorageResult<()>;

    fn has(&self, path: &str) -> bool;

    fn create_dir(&self, path: &str, visibility: Visibility) -> StorageResult<()>;

    /// Remove a directory and everything below it
    fn delete_dir(&self, path: &str) -> StorageResult<()>;
}
