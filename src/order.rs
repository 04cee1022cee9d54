//! Recency ordering: an arena-backed doubly linked list.
//!
//! Entries live in a `Vec` of slots and link to each other by slot position.
//! Freed slots go on a free list and are reused by later pushes; each reuse
//! bumps the slot's generation so old `EntryHandle`s stop resolving.
//!
//! Head is the most recently used entry, tail the least recently used.

use crate::entry::{Entry, EntryHandle};
use crate::error::InvariantViolation;

struct Slot<K, V> {
    generation: u32,
    entry: Option<Entry<K, V>>,
}

pub struct OrderList<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K, V> OrderList<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-allocate room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        OrderList {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a new entry at the head. O(1).
    pub fn push_front(&mut self, key: K, value: V) -> EntryHandle {
        let mut entry = Entry::new(key, value);
        entry.next = self.head;
        let slot = self.alloc(entry);

        match self.head {
            Some(old_head) => {
                if let Some(node) = self.entry_mut(old_head) {
                    node.prev = Some(slot);
                }
            }
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        self.len += 1;

        EntryHandle::new(slot, self.slots[slot].generation)
    }

    /// Relink an existing entry at the head without moving it in memory.
    ///
    /// Returns `false` if the handle is stale.
    pub fn move_to_front(&mut self, handle: EntryHandle) -> bool {
        let Some(slot) = self.resolve(handle) else {
            return false;
        };
        if self.head == Some(slot) {
            return true;
        }
        self.unlink(slot);
        self.attach_front(slot);
        true
    }

    /// Remove and return the tail (least recently used) entry.
    pub fn pop_back(&mut self) -> Option<Entry<K, V>> {
        let tail = self.tail?;
        self.release(tail)
    }

    /// Unlink an arbitrary entry. O(1).
    pub fn remove(&mut self, handle: EntryHandle) -> Option<Entry<K, V>> {
        let slot = self.resolve(handle)?;
        self.release(slot)
    }

    pub fn peek_front(&self) -> Option<&Entry<K, V>> {
        self.head.and_then(|slot| self.entry(slot))
    }

    pub fn peek_back(&self) -> Option<&Entry<K, V>> {
        self.tail.and_then(|slot| self.entry(slot))
    }

    pub fn front_handle(&self) -> Option<EntryHandle> {
        self.head.map(|slot| self.handle_at(slot))
    }

    pub fn back_handle(&self) -> Option<EntryHandle> {
        self.tail.map(|slot| self.handle_at(slot))
    }

    pub fn get(&self, handle: EntryHandle) -> Option<&Entry<K, V>> {
        let slot = self.resolve(handle)?;
        self.entry(slot)
    }

    pub fn get_mut(&mut self, handle: EntryHandle) -> Option<&mut Entry<K, V>> {
        let slot = self.resolve(handle)?;
        self.entry_mut(slot)
    }

    /// Drop every entry. Slots are kept for reuse and their generations
    /// advance, so handles issued before the clear stay invalid.
    pub fn clear(&mut self) {
        self.free.clear();
        for (pos, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(pos);
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterate from head (newest) to tail (oldest). Reversible.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Walk the list and confirm the forward and backward links agree.
    ///
    /// Returns the occupied slots in head-to-tail order.
    pub(crate) fn check_links(&self) -> Result<Vec<usize>, InvariantViolation> {
        let mut order = Vec::with_capacity(self.len);
        let mut prev = None;
        let mut cursor = self.head;

        while let Some(slot) = cursor {
            if order.len() > self.len {
                return Err(InvariantViolation::Cycle { slot });
            }
            let entry = self
                .entry(slot)
                .ok_or(InvariantViolation::VacantSlotLinked { slot })?;
            if entry.prev != prev {
                return Err(InvariantViolation::BrokenBackLink { slot });
            }
            order.push(slot);
            prev = Some(slot);
            cursor = entry.next;
        }

        if self.tail != prev {
            return Err(InvariantViolation::TailMismatch);
        }
        if order.len() != self.len {
            return Err(InvariantViolation::LengthMismatch {
                index: order.len(),
                order: self.len,
            });
        }
        Ok(order)
    }

    pub(crate) fn handle_at(&self, slot: usize) -> EntryHandle {
        EntryHandle::new(slot, self.slots[slot].generation)
    }

    pub(crate) fn entry(&self, slot: usize) -> Option<&Entry<K, V>> {
        self.slots.get(slot).and_then(|s| s.entry.as_ref())
    }

    fn entry_mut(&mut self, slot: usize) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(slot).and_then(|s| s.entry.as_mut())
    }

    fn resolve(&self, handle: EntryHandle) -> Option<usize> {
        let slot = self.slots.get(handle.slot)?;
        (slot.generation == handle.generation && slot.entry.is_some()).then_some(handle.slot)
    }

    fn alloc(&mut self, entry: Entry<K, V>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot].entry = Some(entry);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                self.slots.len() - 1
            }
        }
    }

    /// Unlink `slot`, free it and hand back its entry.
    fn release(&mut self, slot: usize) -> Option<Entry<K, V>> {
        self.unlink(slot);
        let cell = self.slots.get_mut(slot)?;
        let entry = cell.entry.take()?;
        cell.generation = cell.generation.wrapping_add(1);
        self.free.push(slot);
        self.len -= 1;
        Some(entry)
    }

    fn unlink(&mut self, slot: usize) {
        let Some(entry) = self.entry_mut(slot) else {
            return;
        };
        let (prev, next) = (entry.prev.take(), entry.next.take());

        match prev {
            Some(p) => {
                if let Some(node) = self.entry_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.entry_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn attach_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(entry) = self.entry_mut(slot) {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(node) = self.entry_mut(h) {
                    node.prev = Some(slot);
                }
            }
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }
}

impl<K, V> Default for OrderList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, K, V> {
    list: &'a OrderList<K, V>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.list.entry(self.front?)?;
        self.front = entry.next;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.list.entry(self.back?)?;
        self.back = entry.prev;
        self.remaining -= 1;
        Some(entry)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
