//! Caller-facing caches over `file-tag-cache`
//!
//! API clients cache responses under names they do not control: IP addresses,
//! request fingerprints, remote identifiers. This crate sanitizes those names
//! into valid keys, applies a fixed TTL per cache, and removes cached requests
//! by method and parameters.

mod disposer;
mod error;
mod named;
mod sanitize;

pub use disposer::{request_token, CacheDisposer};
pub use error::{NamedCacheError, Result};
pub use named::NamedCache;
pub use sanitize::sanitize;
