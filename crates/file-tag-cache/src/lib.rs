//! File-backed cache with tags and TTL expiration
//!
//! Stores each entry as a file inside a namespace folder, keeps one list per
//! tag so groups of entries can be invalidated together, and evicts expired
//! entries lazily when they are read.

mod clock;
mod config;
mod error;
mod expiry;
mod key;
mod namespace;
mod pool;
mod storage;
mod store;
mod tags;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result, StorageError};
pub use key::{is_valid_key, validate_key, TAG_PREFIX};
pub use pool::CachePool;
pub use storage::{LocalStorage, Storage, StorageResult, Visibility};
pub use types::{CacheEntry, CacheStats};
