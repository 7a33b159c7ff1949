//! Local filesystem storage

use super::{Storage, StorageResult, Visibility};
use crate::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Storage rooted at a directory on the local disk
///
/// New files are staged next to their target and then linked into place, so
/// `write` is an atomic create and `update` an atomic replace. Readers never
/// observe a partially written file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Write `contents` to a unique sibling of `target` and return its path
    fn stage(
        &self,
        path: &str,
        target: &Path,
        contents: &[u8],
        visibility: Visibility,
    ) -> StorageResult<PathBuf> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(path, e))?;
        }

        // `~` never appears in a valid cache key, so staged names cannot collide with entries
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let staged = target.with_file_name(format!(
            ".{}.~{}.{}",
            file_name,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let result = fs::write(&staged, contents)
            .and_then(|_| apply_visibility(&staged, visibility, false));
        if let Err(e) = result {
            let _ = fs::remove_file(&staged);
            return Err(StorageError::io(path, e));
        }

        Ok(staged)
    }
}

impl Storage for LocalStorage {
    fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        fs::read(self.resolve(path)).map_err(|e| StorageError::io(path, e))
    }

    fn write(&self, path: &str, contents: &[u8], visibility: Visibility) -> StorageResult<()> {
        let target = self.resolve(path);
        let staged = self.stage(path, &target, contents, visibility)?;

        // hard_link refuses to replace an existing file
        let linked = fs::hard_link(&staged, &target);
        let _ = fs::remove_file(&staged);
        linked.map_err(|e| StorageError::io(path, e))?;

        debug!(path, bytes = contents.len(), "Wrote file");
        Ok(())
    }

    fn update(&self, path: &str, contents: &[u8], visibility: Visibility) -> StorageResult<()> {
        let target = self.resolve(path);
        if !target.is_file() {
            return Err(StorageError::NotFound(path.to_string()));
        }

        let staged = self.stage(path, &target, contents, visibility)?;
        if let Err(e) = fs::rename(&staged, &target) {
            let _ = fs::remove_file(&staged);
            return Err(StorageError::io(path, e));
        }

        debug!(path, bytes = contents.len(), "Updated file");
        Ok(())
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        fs::remove_file(self.resolve(path)).map_err(|e| StorageError::io(path, e))
    }

    fn has(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn create_dir(&self, path: &str, visibility: Visibility) -> StorageResult<()> {
        let dir = self.resolve(path);
        fs::create_dir_all(&dir)
            .and_then(|_| apply_visibility(&dir, visibility, true))
            .map_err(|e| StorageError::io(path, e))
    }

    fn delete_dir(&self, path: &str) -> StorageResult<()> {
        fs::remove_dir_all(self.resolve(path)).map_err(|e| StorageError::io(path, e))
    }
}

#[cfg(unix)]
fn apply_visibility(path: &Path, visibility: Visibility, is_dir: bool) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = match (visibility, is_dir) {
        (Visibility::Private, false) => 0o600,
        (Visibility::Private, true) => 0o700,
        (Visibility::Public, false) => 0o644,
        (Visibility::Public, true) => 0o755,
    };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_visibility(_path: &Path, _visibility: Visibility, _is_dir: bool) -> std::io::Result<()> {
    Ok(())
}
