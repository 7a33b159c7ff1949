//! Key validation and storage name derivation

use crate::error::{CacheError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Prefix of the records holding tag membership lists
pub const TAG_PREFIX: &str = "tag!";

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.! ]+$").unwrap());

/// Whether `key` may be used as a file name inside a namespace
pub fn is_valid_key(key: &str) -> bool {
    // "." and ".." pass the character check but name directories
    KEY_RE.is_match(key) && key != "." && key != ".."
}

/// Reject keys that are unsafe as file names or collide with tag records
pub fn validate_key(key: &str) -> Result<()> {
    if !is_valid_key(key) || key.starts_with(TAG_PREFIX) {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Record name for the membership list of `tag`
pub fn tag_record(tag: &str) -> Result<String> {
    let record = format!("{}{}", TAG_PREFIX, tag);
    if tag.is_empty() || !is_valid_key(&record) {
        return Err(CacheError::InvalidKey(tag.to_string()));
    }
    Ok(record)
}

/// Validate a namespace folder like `cache/whmcs`
pub fn validate_namespace(folder: &str) -> Result<()> {
    if folder.split('/').all(is_valid_key) {
        Ok(())
    } else {
        Err(CacheError::InvalidNamespace(folder.to_string()))
    }
}
