//! In-memory caching for monorail detection and enumeration results.
//!
//! This crate provides the cache layer that keeps workspace navigation responsive:
//! - Absolute expiry computed at write time, enforced lazily on read and by sweeps
//! - Optional invalidation when a watched file's modification time moves forward
//! - Namespaces as a pure key-prefixing convenience with bulk clearing
//! - An optional entry ceiling that evicts the oldest-written entries
//!
//! # Concurrency
//!
//! A writer holds an advisory lock on its key for the duration of the
//! mutation. A concurrent writer on the same key retries a bounded number of
//! times and then fails with [`Error::LockTimeout`] instead of racing the first
//! write. Sweeps and bulk clears take a global lock that waits for all key
//! locks to drain.
//!
//! # Usage
//!
//! ```
//! use monorail_cache::{Cache, CacheConfig};
//! use std::time::Duration;
//!
//! let cache = Cache::new(CacheConfig::default());
//! let packages = cache.namespace("packages");
//! packages.set("/repo", &vec!["@x/ui", "@x/api"], Duration::from_secs(300))?;
//!
//! let names: Option<Vec<String>> = packages.get("/repo");
//! assert_eq!(names.map(|n| n.len()), Some(2));
//! # Ok::<(), monorail_cache::Error>(())
//! ```

mod clock;
mod config;
mod entry;
mod error;
mod lock;
mod namespace;
mod store;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CacheConfig, DEFAULT_LOCK_RETRIES, DEFAULT_LOCK_RETRY_INTERVAL, DEFAULT_SWEEP_INTERVAL,
    DEFAULT_TTL,
};
pub use entry::{CacheEntry, file_mtime};
pub use namespace::{NAMESPACE_SEPARATOR, Namespace};
pub use store::{Cache, CacheStats};
