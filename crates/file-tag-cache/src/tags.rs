//! Tag membership lists
//!
//! Every tag owns one record (`tag!<name>`) holding the ordered list of keys
//! carrying it. Updates are unlocked read-modify-write cycles: two writers
//! touching the same tag concurrently can lose one of the changes.

use crate::error::Result;
use crate::key::tag_record;
use crate::namespace::Namespace;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct TagIndex {
    namespace: Namespace,
}

impl TagIndex {
    pub(crate) fn new(namespace: Namespace) -> Self {
        Self { namespace }
    }

    /// Keys currently listed under `tag`, creating an empty list if needed
    pub(crate) fn list_keys(&self, tag: &str) -> Result<Vec<String>> {
        let record = tag_record(tag)?;
        if !self.namespace.exists(&record) {
            self.namespace.create(&record, b"[]")?;
        }
        self.load(&record)
    }

    pub(crate) fn append_key(&self, tag: &str, key: &str) -> Result<()> {
        let mut keys = self.list_keys(tag)?;
        keys.push(key.to_string());
        self.write_keys(tag, &keys)
    }

    /// Remove every occurrence of `key`; absent lists are left alone
    pub(crate) fn remove_key(&self, tag: &str, key: &str) -> Result<()> {
        let record = tag_record(tag)?;
        let mut keys = self.load(&record)?;
        let before = keys.len();
        keys.retain(|k| k != key);
        if keys.len() == before {
            return Ok(());
        }
        self.write_keys(tag, &keys)
    }

    /// Replace the whole list for `tag`
    fn write_keys(&self, tag: &str, keys: &[String]) -> Result<()> {
        self.namespace
            .store(&tag_record(tag)?, &serde_json::to_vec(keys)?)
    }

    pub(crate) fn remove_index(&self, tag: &str) -> Result<()> {
        self.namespace.remove(&tag_record(tag)?)
    }

    fn load(&self, record: &str) -> Result<Vec<String>> {
        let Some(bytes) = self.namespace.read(record)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice(&bytes) {
            Ok(keys) => Ok(keys),
            Err(e) => {
                warn!(record, error = %e, "Unreadable tag list, treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::Storage;
    use std::sync::Arc;
    use std::thread;

    fn index() -> (Arc<MemoryStorage>, TagIndex) {
        let storage = Arc::new(MemoryStorage::new());
        let ns = Namespace::open(storage.clone(), "cache").unwrap();
        (storage, TagIndex::new(ns))
    }

    #[test]
    fn test_list_keys_creates_empty_record() {
        let (storage, tags) = index();
        assert!(tags.list_keys("users").unwrap().is_empty());
        assert!(storage.has("cache/tag!users"));
    }

    #[test]
    fn test_append_preserves_order() {
        let (_, tags) = index();
        tags.append_key("users", "b").unwrap();
        tags.append_key("users", "a").unwrap();
        tags.append_key("users", "c").unwrap();
        assert_eq!(tags.list_keys("users").unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_remove_key_drops_all_occurrences() {
        let (_, tags) = index();
        tags.append_key("users", "a").unwrap();
        tags.append_key("users", "b").unwrap();
        tags.append_key("users", "a").unwrap();

        tags.remove_key("users", "a").unwrap();

        assert_eq!(tags.list_keys("users").unwrap(), vec!["b"]);
    }

    #[test]
    fn test_remove_key_from_missing_list_is_noop() {
        let (storage, tags) = index();
        tags.remove_key("nobody", "a").unwrap();
        assert!(!storage.has("cache/tag!nobody"));
    }

    #[test]
    fn test_remove_index() {
        let (storage, tags) = index();
        tags.append_key("users", "a").unwrap();
        tags.remove_index("users").unwrap();
        assert!(!storage.has("cache/tag!users"));
        tags.remove_index("users").unwrap();
    }

    #[test]
    fn test_corrupted_list_reads_as_empty() {
        let (storage, tags) = index();
        storage.put_raw("cache/tag!users", b"not json");
        assert!(tags.list_keys("users").unwrap().is_empty());

        tags.append_key("users", "a").unwrap();
        assert_eq!(tags.list_keys("users").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let (_, tags) = index();
        assert!(matches!(
            tags.append_key("a/b", "k"),
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_rewrite_failure_surfaces() {
        let (storage, tags) = index();
        tags.append_key("users", "a").unwrap();
        storage.fail_writes_under("cache/tag!");

        assert!(matches!(
            tags.remove_key("users", "a"),
            Err(CacheError::Storage(_))
        ));
    }

    #[test]
    fn test_interleaved_appends_lose_first_writer() {
        let storage = Arc::new(MemoryStorage::new());
        let ns = Namespace::open(storage, "cache").unwrap();
        let first = TagIndex::new(ns.clone());
        let second = TagIndex::new(ns);
        first.append_key("hot", "seed").unwrap();

        // Both writers read the list before either writes it back
        let mut seen_by_first = first.list_keys("hot").unwrap();
        let mut seen_by_second = second.list_keys("hot").unwrap();
        seen_by_first.push("a".to_string());
        seen_by_second.push("b".to_string());
        first.write_keys("hot", &seen_by_first).unwrap();
        second.write_keys("hot", &seen_by_second).unwrap();

        let keys = first.list_keys("hot").unwrap();
        assert_eq!(keys, vec!["seed", "b"]);
        assert!(!keys.contains(&"a".to_string()));
    }

    /// Threaded appends may drop updates but never invent keys
    #[test]
    fn test_concurrent_appends_keep_only_written_keys() {
        let (_, tags) = index();
        let writers = 4;
        let per_writer = 50;

        let handles: Vec<_> = (0..writers)
            .map(|w| {
                let tags = tags.clone();
                thread::spawn(move || {
                    for i in 0..per_writer {
                        tags.append_key("hot", &format!("w{w}_{i}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let keys = tags.list_keys("hot").unwrap();
        assert!(!keys.is_empty());
        assert!(keys.len() <= writers * per_writer);
        assert!(keys.iter().all(|k| k.starts_with('w')));
    }
}
