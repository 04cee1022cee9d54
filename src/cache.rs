//! The LRU cache controller.
//!
//! `LruCache` owns the entry arena (`OrderList`) and the key index and keeps
//! them in step: every operation resolves the key through the index in O(1),
//! then relinks the entry in the order list in O(1). Inserting a new key into
//! a full cache evicts exactly one entry, the tail.
//!
//! `get` reorders entries, so it takes `&mut self`. Use `peek` for a read that
//! leaves recency alone. The cache has no internal locking; share it across
//! threads by wrapping the whole value in a `Mutex`.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::entry::{Entry, EntryHandle};
use crate::error::{CacheError, InvariantViolation};
use crate::index::Index;
use crate::order::OrderList;
use crate::stats::CacheStats;

/// Upper bound on storage reserved up front, so a huge capacity does not
/// allocate before it is used.
const PREALLOC_LIMIT: usize = 4096;

pub struct LruCache<K, V> {
    capacity: NonZeroUsize,
    index: Index<K>,
    order: OrderList<K, V>,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// ```
    /// use recency::{CacheError, LruCache};
    ///
    /// let cache: LruCache<&str, i32> = LruCache::new(2).unwrap();
    /// assert_eq!(cache.capacity(), 2);
    /// assert_eq!(
    ///     LruCache::<&str, i32>::new(0).err(),
    ///     Some(CacheError::InvalidCapacity { capacity: 0 })
    /// );
    /// ```
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or(CacheError::InvalidCapacity { capacity })
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        let reserve = capacity.get().min(PREALLOC_LIMIT);
        LruCache {
            capacity,
            index: Index::with_capacity(reserve),
            order: OrderList::with_capacity(reserve),
            stats: CacheStats::default(),
        }
    }

    /// Look up `key` and mark it as the most recently used entry.
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(2).unwrap();
    /// cache.insert("a", 1);
    /// cache.insert("b", 2);
    /// assert_eq!(cache.get("a"), Some(&1));
    /// assert_eq!(cache.newest_key(), Some(&"a"));
    /// ```
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.promote(key)?;
        self.order.get(handle).map(Entry::value)
    }

    /// Like `get`, but hands out a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.promote(key)?;
        self.order.get_mut(handle).map(Entry::value_mut)
    }

    /// Read a value without touching recency or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.lookup(key)?;
        self.order.get(handle).map(Entry::value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains(key)
    }

    /// Insert or update `key`, making it the most recently used entry.
    ///
    /// Updating an existing key never evicts. Adding a new key to a full
    /// cache evicts the least recently used entry and returns it.
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(1).unwrap();
    /// assert_eq!(cache.insert("a", 1), None);
    /// assert_eq!(cache.insert("b", 2), Some(("a", 1)));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(handle) = self.index.lookup(&key) {
            if let Some(entry) = self.order.get_mut(handle) {
                entry.replace_value(value);
            }
            self.order.move_to_front(handle);
            self.stats.updates += 1;
            return None;
        }

        let handle = self.order.push_front(key.clone(), value);
        self.index.insert(key, handle);
        self.stats.inserts += 1;

        if self.order.len() <= self.capacity.get() {
            return None;
        }
        let evicted = self.take_oldest()?;
        self.stats.evictions += 1;
        trace!(capacity = self.capacity.get(), "evicted least recently used entry");
        Some(evicted)
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.remove(key)?;
        let entry = self.order.remove(handle)?;
        self.stats.removals += 1;
        Some(entry.into_parts().1)
    }

    /// Remove the least recently used entry.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let pair = self.take_oldest()?;
        self.stats.removals += 1;
        Some(pair)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.order.len() == self.capacity.get()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Key that would be evicted next.
    pub fn oldest_key(&self) -> Option<&K> {
        self.order.peek_back().map(Entry::key)
    }

    pub fn newest_key(&self) -> Option<&K> {
        self.order.peek_front().map(Entry::key)
    }

    /// Change the capacity. Shrinking evicts the oldest entries, which are
    /// returned oldest first.
    pub fn resize(&mut self, capacity: usize) -> Result<Vec<(K, V)>, CacheError> {
        let capacity =
            NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity { capacity })?;
        self.capacity = capacity;

        let mut evicted = Vec::new();
        while self.order.len() > capacity.get() {
            let Some(pair) = self.take_oldest() else {
                break;
            };
            evicted.push(pair);
        }

        if !evicted.is_empty() {
            self.stats.evictions += evicted.len() as u64;
            debug!(
                capacity = capacity.get(),
                evicted = evicted.len(),
                "cache shrunk"
            );
        }
        Ok(evicted)
    }

    pub fn clear(&mut self) {
        debug!(dropped = self.order.len(), "clearing cache");
        self.index.clear();
        self.order.clear();
    }

    /// Entries from newest to oldest. Does not affect recency.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator + '_ {
        self.order.iter().map(|entry| (entry.key(), entry.value()))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.order.iter().map(Entry::key)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Check the structural invariants: index and order list agree in size,
    /// the size is within capacity, the links are consistent in both
    /// directions and every linked entry is indexed under its own key.
    ///
    /// Runs in O(n).
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let slots = self.order.check_links()?;

        if self.index.len() != slots.len() {
            return Err(InvariantViolation::LengthMismatch {
                index: self.index.len(),
                order: slots.len(),
            });
        }
        if slots.len() > self.capacity.get() {
            return Err(InvariantViolation::OverCapacity {
                len: slots.len(),
                capacity: self.capacity.get(),
            });
        }

        for slot in slots {
            let entry = self
                .order
                .entry(slot)
                .ok_or(InvariantViolation::VacantSlotLinked { slot })?;
            if self.index.lookup(entry.key()) != Some(self.order.handle_at(slot)) {
                return Err(InvariantViolation::Unindexed { slot });
            }
        }
        Ok(())
    }

    fn promote<Q>(&mut self, key: &Q) -> Option<EntryHandle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.lookup(key);
        self.stats.record_lookup(handle.is_some());
        let handle = handle?;
        self.order.move_to_front(handle);
        Some(handle)
    }

    fn take_oldest(&mut self) -> Option<(K, V)> {
        let entry = self.order.pop_back()?;
        self.index.remove(entry.key());
        Some(entry.into_parts())
    }
}

impl<K, V> Extend<(K, V)> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.order.iter().map(|entry| (entry.key(), entry.value())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> LruCache<&'static str, i32> {
        LruCache::new(capacity).unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = LruCache::<u8, u8>::new(0);
        assert_eq!(result.err(), Some(CacheError::InvalidCapacity { capacity: 0 }));
    }

    #[test]
    fn test_update_does_not_evict() {
        let mut c = cache(2);
        c.insert("a", 1);
        c.insert("b", 2);

        assert_eq!(c.insert("a", 10), None);
        assert_eq!(c.len(), 2);
        assert_eq!(c.peek("a"), Some(&10));
        assert_eq!(c.newest_key(), Some(&"a"));
        assert_eq!(c.oldest_key(), Some(&"b"));
    }

    #[test]
    fn test_peek_leaves_order_alone() {
        let mut c = cache(2);
        c.insert("a", 1);
        c.insert("b", 2);

        assert_eq!(c.peek("a"), Some(&1));
        assert_eq!(c.insert("c", 3), Some(("a", 1)));
        assert_eq!(c.stats().lookups(), 0);
    }

    #[test]
    fn test_get_mut_promotes() {
        let mut c = cache(2);
        c.insert("a", 1);
        c.insert("b", 2);

        if let Some(v) = c.get_mut("a") {
            *v += 1;
        }
        assert_eq!(c.newest_key(), Some(&"a"));
        assert_eq!(c.insert("c", 3), Some(("b", 2)));
        assert_eq!(c.peek("a"), Some(&2));
    }

    #[test]
    fn test_remove_then_reinsert_reuses_slot() {
        let mut c = cache(3);
        c.insert("a", 1);
        c.insert("b", 2);

        assert_eq!(c.remove("a"), Some(1));
        assert_eq!(c.remove("a"), None);
        c.insert("c", 3);
        c.insert("d", 4);

        assert_eq!(c.keys().copied().collect::<Vec<_>>(), vec!["d", "c", "b"]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_pop_oldest() {
        let mut c = cache(3);
        c.extend([("a", 1), ("b", 2), ("c", 3)]);

        assert_eq!(c.pop_oldest(), Some(("a", 1)));
        assert_eq!(c.oldest_key(), Some(&"b"));
        assert_eq!(c.stats().removals, 1);
        assert_eq!(c.stats().evictions, 0);
    }

    #[test]
    fn test_resize_shrinks_oldest_first() {
        let mut c = cache(4);
        c.extend([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);

        let evicted = c.resize(2).unwrap();
        assert_eq!(evicted, vec![("a", 1), ("b", 2)]);
        assert_eq!(c.capacity(), 2);
        assert!(c.is_full());
        assert!(c.validate().is_ok());

        assert!(c.resize(0).is_err());
        assert_eq!(c.capacity(), 2);

        assert!(c.resize(8).unwrap().is_empty());
        assert!(!c.is_full());
    }

    #[test]
    fn test_clear_resets_entries_not_stats() {
        let mut c = cache(2);
        c.insert("a", 1);
        c.get("a");
        c.clear();

        assert!(c.is_empty());
        assert_eq!(c.oldest_key(), None);
        assert_eq!(c.get("a"), None);
        assert_eq!(c.stats().hits, 1);
        assert_eq!(c.stats().misses, 1);

        c.reset_stats();
        assert_eq!(c.stats(), CacheStats::default());
    }

    #[test]
    fn test_stats_counts() {
        let mut c = cache(1);
        c.insert("a", 1);
        c.insert("a", 2);
        c.insert("b", 3);
        c.get("a");
        c.get("b");
        c.remove("b");

        let stats = c.stats();
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.removals, 1);
    }

    #[test]
    fn test_string_keys_borrowed_lookup() {
        let mut c: LruCache<String, usize> = LruCache::new(2).unwrap();
        c.insert("alpha".to_string(), 5);
        assert_eq!(c.get("alpha"), Some(&5));
        assert!(c.contains("alpha"));
        assert_eq!(c.remove("alpha"), Some(5));
    }

    #[test]
    fn test_iter_both_directions() {
        let mut c = cache(3);
        c.extend([("a", 1), ("b", 2), ("c", 3)]);
        c.get("a");

        let newest_first: Vec<_> = c.iter().map(|(k, _)| *k).collect();
        assert_eq!(newest_first, vec!["a", "c", "b"]);
        let oldest_first: Vec<_> = c.iter().rev().map(|(k, _)| *k).collect();
        assert_eq!(oldest_first, vec!["b", "c", "a"]);
        assert_eq!(c.iter().len(), 3);
    }

    #[test]
    fn test_debug_lists_newest_first() {
        let mut c = cache(2);
        c.insert("a", 1);
        c.insert("b", 2);
        assert_eq!(format!("{:?}", c), r#"{"b": 2, "a": 1}"#);
    }
}
