use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use tracing::trace;

use crate::error::CacheError;
use crate::policy::{PolicyKind, ReplacementPolicy};

/// LRU by timestamp scan: O(1) lookups, O(n) inserts once full.
pub struct NaiveLru<K, V> {
    capacity: NonZeroUsize,
    entries: FxHashMap<K, (V, u64)>,
    clock: u64,
}

impl<K, V> NaiveLru<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or(CacheError::InvalidCapacity { capacity })
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        NaiveLru {
            capacity,
            entries: FxHashMap::default(),
            clock: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.tick();
        let (value, stamp) = self.entries.get_mut(key)?;
        *stamp = now;
        Some(value)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let now = self.tick();
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = (value, now);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity.get() {
            self.evict_oldest()
        } else {
            None
        };
        self.entries.insert(key, (value, now));
        evicted
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(value, _)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Key with the smallest access stamp. Scans every entry.
    pub fn oldest_key(&self) -> Option<&K> {
        self.entries
            .iter()
            .min_by_key(|(_, (_, stamp))| *stamp)
            .map(|(key, _)| key)
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let oldest = self.oldest_key()?.clone();
        trace!(scanned = self.entries.len(), "naive scan eviction");
        self.entries
            .remove_entry(&oldest)
            .map(|(key, (value, _))| (key, value))
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl<K, V> ReplacementPolicy<K, V> for NaiveLru<K, V>
where
    K: Eq + Hash + Clone,
{
    fn name(&self) -> &'static str {
        PolicyKind::Naive.as_str()
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        NaiveLru::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Vec<(K, V)> {
        self.insert(key, value).into_iter().collect()
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        NaiveLru::remove(self, key)
    }

    fn len(&self) -> usize {
        NaiveLru::len(self)
    }

    fn capacity(&self) -> usize {
        NaiveLru::capacity(self)
    }
}
