//! Named records inside one cache folder

use crate::error::{CacheError, Result, StorageError};
use crate::key::validate_namespace;
use crate::storage::{Storage, Visibility};
use std::sync::Arc;
use tracing::{debug, info};

/// Storage access scoped to a single folder such as `cache/whmcs`
///
/// Record names are joined to the folder as `<folder>/<name>` and must already
/// be validated by the caller.
#[derive(Clone)]
pub(crate) struct Namespace {
    storage: Arc<dyn Storage>,
    folder: String,
    visibility: Visibility,
}

impl Namespace {
    /// Open `folder`, creating it if needed
    pub(crate) fn open(storage: Arc<dyn Storage>, folder: &str) -> Result<Self> {
        validate_namespace(folder)?;
        let namespace = Self {
            storage,
            folder: folder.to_string(),
            visibility: Visibility::Private,
        };
        namespace.storage.create_dir(&namespace.folder, namespace.visibility)?;
        Ok(namespace)
    }

    /// Open another folder on the same storage
    pub(crate) fn sibling(&self, folder: &str) -> Result<Self> {
        Self::open(self.storage.clone(), folder)
    }

    pub(crate) fn folder(&self) -> &str {
        &self.folder
    }

    pub(crate) fn path(&self, name: &str) -> String {
        format!("{}/{}", self.folder, name)
    }

    /// Raw bytes of a record, `None` when it does not exist
    pub(crate) fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match self.storage.read(&self.path(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(CacheError::Storage(e)),
        }
    }

    pub(crate) fn exists(&self, name: &str) -> bool {
        self.storage.has(&self.path(name))
    }

    /// Create or overwrite a record
    ///
    /// A record created by another writer between the existence check and
    /// our write is overwritten with an update instead.
    pub(crate) fn store(&self, name: &str, contents: &[u8]) -> Result<()> {
        let path = self.path(name);
        if self.storage.has(&path) {
            self.storage.update(&path, contents, self.visibility)?;
            return Ok(());
        }

        match self.storage.write(&path, contents, self.visibility) {
            Ok(()) => Ok(()),
            Err(StorageError::AlreadyExists(_)) => {
                debug!(path = %path, "Record appeared during write, updating instead");
                self.storage.update(&path, contents, self.visibility)?;
                Ok(())
            }
            Err(e) => Err(CacheError::Storage(e)),
        }
    }

    /// Create a record only if it is absent
    pub(crate) fn create(&self, name: &str, contents: &[u8]) -> Result<()> {
        match self.storage.write(&self.path(name), contents, self.visibility) {
            Ok(()) | Err(StorageError::AlreadyExists(_)) => Ok(()),
            Err(e) => Err(CacheError::Storage(e)),
        }
    }

    /// Delete a record; a missing record counts as deleted
    pub(crate) fn remove(&self, name: &str) -> Result<()> {
        match self.storage.delete(&self.path(name)) {
            Ok(()) | Err(StorageError::NotFound(_)) => Ok(()),
            Err(e) => Err(CacheError::Storage(e)),
        }
    }

    /// Drop the whole folder and recreate it empty
    pub(crate) fn reset(&self) -> Result<()> {
        match self.storage.delete_dir(&self.folder) {
            Ok(()) | Err(StorageError::NotFound(_)) => {}
            Err(e) => return Err(CacheError::Storage(e)),
        }
        self.storage.create_dir(&self.folder, self.visibility)?;
        info!(namespace = %self.folder, "Cache namespace cleared");
        Ok(())
    }
}
