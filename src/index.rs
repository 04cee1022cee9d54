//! Key → handle lookup.
//!
//! The index never owns entries; it only remembers where each key's entry
//! sits in the `OrderList` arena. It is unbounded: capacity is enforced by
//! the cache that drives it.

use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::hash::Hash;

use crate::entry::EntryHandle;

pub struct Index<K> {
    map: FxHashMap<K, EntryHandle>,
}

impl<K: Eq + Hash> Index<K> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Index {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn lookup<Q>(&self, key: &Q) -> Option<EntryHandle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).copied()
    }

    /// Register `key`. Returns the handle it replaced, if any.
    pub fn insert(&mut self, key: K, handle: EntryHandle) -> Option<EntryHandle> {
        self.map.insert(key, handle)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<EntryHandle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K: Eq + Hash> Default for Index<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_remove() {
        let mut index = Index::new();
        let handle = EntryHandle::new(0, 0);

        assert_eq!(index.insert("a".to_string(), handle), None);
        assert_eq!(index.lookup("a"), Some(handle));
        assert!(index.contains("a"));
        assert_eq!(index.len(), 1);

        assert_eq!(index.remove("a"), Some(handle));
        assert_eq!(index.remove("a"), None);
        assert!(index.is_empty());
    }

    #[test]
    fn test_insert_returns_previous_handle() {
        let mut index = Index::new();
        let old = EntryHandle::new(1, 0);
        let new = EntryHandle::new(1, 1);

        index.insert(7u32, old);
        assert_eq!(index.insert(7, new), Some(old));
        assert_eq!(index.lookup(&7), Some(new));
    }
}
