//! Entry records and the handles that point at them.
//!
//! An `Entry` carries its own `prev`/`next` links (intrusive list), stored as
//! arena slot positions instead of pointers. Outside code only ever sees an
//! `EntryHandle`, which pairs the slot with a generation counter so that a
//! handle to a freed slot can never be confused with whatever lives there now.

/// Stable reference to an entry in an `OrderList` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    pub(crate) slot: usize,
    pub(crate) generation: u32,
}

impl EntryHandle {
    pub(crate) fn new(slot: usize, generation: u32) -> Self {
        EntryHandle { slot, generation }
    }

    /// Arena slot this handle refers to.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A key/value pair plus its position in the recency list.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Entry {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Replace the value, handing back the old one.
    pub fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}
