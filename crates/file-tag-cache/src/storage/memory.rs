//! In-memory storage double for tests

use super::{Storage, StorageResult, Visibility};
use crate::error::StorageError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct MemoryStorage {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    dirs: Mutex<BTreeSet<String>>,
    /// Paths whose writes and updates fail with a permission error
    failing_prefix: Mutex<Option<String>>,
    /// A competing writer that creates `path` right before our next `write` to it
    competing_write: Mutex<Option<(String, Vec<u8>)>>,
}

impl MemoryStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_writes_under(&self, prefix: &str) {
        *self.failing_prefix.lock().unwrap() = Some(prefix.to_string());
    }

    pub(crate) fn race_next_write(&self, path: &str, contents: Vec<u8>) {
        *self.competing_write.lock().unwrap() = Some((path.to_string(), contents));
    }

    pub(crate) fn put_raw(&self, path: &str, contents: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_vec());
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub(crate) fn has_dir(&self, path: &str) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    fn check_writable(&self, path: &str) -> StorageResult<()> {
        match self.failing_prefix.lock().unwrap().as_deref() {
            Some(prefix) if path.starts_with(prefix) => Err(StorageError::io(
                path,
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            )),
            _ => Ok(()),
        }
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn write(&self, path: &str, contents: &[u8], _visibility: Visibility) -> StorageResult<()> {
        self.check_writable(path)?;

        let competing = {
            let mut slot = self.competing_write.lock().unwrap();
            match slot.as_ref() {
                Some((target, _)) if target == path => slot.take(),
                _ => None,
            }
        };

        let mut files = self.files.lock().unwrap();
        if let Some((target, other)) = competing {
            files.insert(target, other);
        }
        if files.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        files.insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn update(&self, path: &str, contents: &[u8], _visibility: Visibility) -> StorageResult<()> {
        self.check_writable(path)?;

        let mut files = self.files.lock().unwrap();
        match files.get_mut(path) {
            Some(existing) => {
                *existing = contents.to_vec();
                Ok(())
            }
            None => Err(StorageError::NotFound(path.to_string())),
        }
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        self.files
            .lock()
            .unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn has(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn create_dir(&self, path: &str, _visibility: Visibility) -> StorageResult<()> {
        self.dirs.lock().unwrap().insert(path.to_string());
        Ok(())
    }

    fn delete_dir(&self, path: &str) -> StorageResult<()> {
        if !self.dirs.lock().unwrap().remove(path) {
            return Err(StorageError::NotFound(path.to_string()));
        }
        let prefix = format!("{}/", path);
        self.files
            .lock()
            .unwrap()
            .retain(|p, _| !p.starts_with(&prefix));
        Ok(())
    }
}
