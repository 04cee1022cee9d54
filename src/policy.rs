//! Common interface over the production cache and the comparison baselines,
//! so workloads and benchmarks can drive any of them through one type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::baseline::{LazyLru, NaiveLru};
use crate::cache::LruCache;
use crate::error::CacheError;

pub trait ReplacementPolicy<K, V> {
    fn name(&self) -> &'static str;

    /// Look up `key`, counting it as an access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Insert or update `key`. Returns whatever the policy evicted as a
    /// result, which may be nothing, one entry, or a whole batch.
    fn put(&mut self, key: K, value: V) -> Vec<(K, V)>;

    fn remove(&mut self, key: &K) -> Option<V>;

    fn len(&self) -> usize;

    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> ReplacementPolicy<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn name(&self) -> &'static str {
        PolicyKind::Lru.as_str()
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Vec<(K, V)> {
        self.insert(key, value).into_iter().collect()
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        LruCache::capacity(self)
    }
}

/// Selects one of the available cache implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Hash index plus linked recency list, O(1) per operation.
    Lru,
    /// Timestamp per entry, linear scan for the oldest on eviction.
    Naive,
    /// Grow to twice the capacity, then drop everything older than the median.
    LazyBatch,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Lru, PolicyKind::Naive, PolicyKind::LazyBatch];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Lru => "lru",
            PolicyKind::Naive => "naive",
            PolicyKind::LazyBatch => "lazy_batch",
        }
    }

    pub fn build<K, V>(&self, capacity: usize) -> Result<Box<dyn ReplacementPolicy<K, V>>, CacheError>
    where
        K: Eq + Hash + Clone + 'static,
        V: 'static,
    {
        let capacity =
            NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity { capacity })?;
        let cache: Box<dyn ReplacementPolicy<K, V>> = match self {
            PolicyKind::Lru => Box::new(LruCache::with_capacity(capacity)),
            PolicyKind::Naive => Box::new(NaiveLru::with_capacity(capacity)),
            PolicyKind::LazyBatch => Box::new(LazyLru::with_capacity(capacity)),
        };
        Ok(cache)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
