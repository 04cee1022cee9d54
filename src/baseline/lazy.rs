use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::error::CacheError;
use crate::policy::{PolicyKind, ReplacementPolicy};

/// LRU with deferred cleanup.
///
/// Inserts never evict until the map holds twice the capacity. At that point
/// one sweep finds the median access stamp and drops every entry older than
/// it, bringing the size back down to `capacity`. The sweep is O(n), so the
/// cost is O(1) amortized but individual inserts can stall. Between sweeps
/// `len()` may exceed `capacity()`.
pub struct LazyLru<K, V> {
    capacity: NonZeroUsize,
    entries: FxHashMap<K, (V, u64)>,
    clock: u64,
    sweeps: u64,
    last_sweep: usize,
}

impl<K, V> LazyLru<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or(CacheError::InvalidCapacity { capacity })
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        LazyLru {
            capacity,
            entries: FxHashMap::default(),
            clock: 0,
            sweeps: 0,
            last_sweep: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.tick();
        let (value, stamp) = self.entries.get_mut(key)?;
        *stamp = now;
        Some(value)
    }

    /// Insert or update `key`. Returns the batch evicted by a sweep, which is
    /// empty unless this insert reached the sweep threshold.
    pub fn insert(&mut self, key: K, value: V) -> Vec<(K, V)> {
        let now = self.tick();
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = (value, now);
            return Vec::new();
        }

        self.entries.insert(key, (value, now));
        if self.entries.len() >= self.sweep_threshold() {
            self.sweep()
        } else {
            Vec::new()
        }
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

    /// Number of sweeps performed so far.
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Entries dropped by the most recent sweep.
    pub fn last_sweep_size(&self) -> usize {
        self.last_sweep
    }

    pub fn sweep_threshold(&self) -> usize {
        self.capacity.get().saturating_mul(2)
    }

    fn sweep(&mut self) -> Vec<(K, V)> {
        let mut stamps: Vec<u64> = self.entries.values().map(|(_, stamp)| *stamp).collect();
        let mid = stamps.len() / 2;
        let (_, median, _) = stamps.select_nth_unstable(mid);
        let median = *median;

        // Stamps are unique, so exactly `mid` entries fall below the median.
        let stale: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, (_, stamp))| *stamp < median)
            .map(|(key, _)| key.clone())
            .collect();

        let evicted: Vec<(K, V)> = stale
            .into_iter()
            .filter_map(|key| self.entries.remove_entry(&key))
            .map(|(key, (value, _))| (key, value))
            .collect();

        self.sweeps += 1;
        self.last_sweep = evicted.len();
        debug!(
            evicted = evicted.len(),
            remaining = self.entries.len(),
            sweeps = self.sweeps,
            "lazy sweep"
        );
        evicted
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl<K, V> ReplacementPolicy<K, V> for LazyLru<K, V>
where
    K: Eq + Hash + Clone,
{
    fn name(&self) -> &'static str {
        PolicyKind::LazyBatch.as_str()
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LazyLru::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Vec<(K, V)> {
        self.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        LazyLru::remove(self, key)
    }

    fn len(&self) -> usize {
        LazyLru::len(self)
    }

    fn capacity(&self) -> usize {
        LazyLru::capacity(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_eviction_below_threshold() {
        let mut cache = LazyLru::new(3).unwrap();
        for i in 0..5 {
            assert!(cache.insert(i, i).is_empty());
        }
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.sweeps(), 0);
    }

    #[test]
    fn test_sweep_drops_older_half() {
        let mut cache = LazyLru::new(3).unwrap();
        for i in 0..5 {
            cache.insert(i, i * 10);
        }
        // Touch the two oldest so they survive.
        cache.get(&0);
        cache.get(&1);

        let mut evicted = cache.insert(5, 50);
        evicted.sort();
        assert_eq!(evicted, vec![(2, 20), (3, 30), (4, 40)]);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.sweeps(), 1);
        assert_eq!(cache.last_sweep_size(), 3);
        assert_eq!(cache.get(&0), Some(&0));
        assert_eq!(cache.get(&5), Some(&50));
    }

    #[test]
    fn test_capacity_one_sweeps_every_other_insert() {
        let mut cache = LazyLru::new(1).unwrap();
        assert!(cache.insert("a", 1).is_empty());
        assert_eq!(cache.insert("b", 2), vec![("a", 1)]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    #[test]
    fn test_update_does_not_grow() {
        let mut cache = LazyLru::new(1).unwrap();
        cache.insert("a", 1);
        assert!(cache.insert("a", 2).is_empty());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remove(&"a"), Some(2));
    }
}
