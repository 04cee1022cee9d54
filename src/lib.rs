//! A bounded key-value cache with least-recently-used eviction.
//!
//! `LruCache` keeps a hash index from key to entry handle and an arena-backed
//! doubly linked list ordered by recency, so `get`, `insert`, `remove` and
//! eviction are all O(1). Two slower variants (`NaiveLru`, `LazyLru`) live in
//! [`baseline`] for comparison, and [`workload`] drives any of them with a
//! reproducible access stream.
//!
//! ```
//! use recency::LruCache;
//!
//! let mut cache = LruCache::new(2).unwrap();
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get("a");
//!
//! assert_eq!(cache.insert("c", 3), Some(("b", 2)));
//! assert_eq!(cache.oldest_key(), Some(&"a"));
//! ```

pub mod baseline;
pub mod cache;
pub mod config;
pub mod entry;
pub mod error;
pub mod index;
pub mod logging;
pub mod order;
pub mod policy;
pub mod stats;
pub mod workload;

pub use cache::LruCache;
pub use entry::{Entry, EntryHandle};
pub use error::{CacheError, ConfigError, InvariantViolation};
pub use policy::{PolicyKind, ReplacementPolicy};
pub use stats::CacheStats;
