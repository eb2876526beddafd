//! Cache Store Module
//!
//! Main cache engine combining a key index with the recency list and size
//! accounting. `CacheStore` is not synchronized; [`crate::LruCache`] wraps it
//! in a lock for shared use.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, CacheValue, Item, LruList};

// == Cache Store ==
/// Size-bounded LRU storage.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key to slot in `order`
    index: HashMap<String, usize>,
    /// Entries from most to least recently used
    order: LruList<CacheEntry<V>>,
    /// Sum of `size` over every entry in `order`
    total_size: usize,
    /// Byte budget enforced after writes
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<V: CacheValue> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given byte budget.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::new(),
            order: LruList::new(),
            total_size: 0,
            capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    // == Get ==
    /// Looks up a key and promotes it to most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let Some(&slot) = self.index.get(key) else {
            self.misses += 1;
            return None;
        };
        self.hits += 1;
        self.order.move_to_front(slot);
        let entry = self.order.get_mut(slot)?;
        entry.touch();
        Some(&entry.value)
    }

    // == Peek ==
    /// Looks up a key without promoting it or touching the counters.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.order.get(slot).map(|entry| &entry.value)
    }

    /// Returns true if the key is resident.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Set ==
    /// Stores a value, replacing any existing one for the key.
    ///
    /// The entry becomes most recently used and capacity is enforced
    /// afterwards. An entry larger than the whole budget is still kept; only
    /// the other entries are evicted to make room for it.
    pub fn set(&mut self, key: String, value: V) {
        match self.index.get(&key).copied() {
            Some(slot) => self.update_in_place(slot, value),
            None => self.insert_new(key, value),
        }
        self.enforce_capacity(true);
    }

    // == Set If Absent ==
    /// Inserts the value only if the key is missing.
    ///
    /// An existing entry is promoted but keeps its value and size. Returns
    /// true if a new entry was inserted.
    pub fn set_if_absent(&mut self, key: String, value: V) -> bool {
        if let Some(slot) = self.index.get(&key).copied() {
            self.promote(slot);
            return false;
        }
        self.insert_new(key, value);
        self.enforce_capacity(true);
        true
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        let Some(slot) = self.index.remove(key) else {
            return false;
        };
        if let Some(entry) = self.order.remove(slot) {
            self.total_size -= entry.size;
        }
        true
    }

    // == Clear ==
    /// Removes every entry. Capacity and counters are kept.
    pub fn clear(&mut self) {
        debug!(entries = self.order.len(), "clearing cache");
        self.order.clear();
        self.index.clear();
        self.total_size = 0;
    }

    // == Set Capacity ==
    /// Changes the byte budget and evicts immediately if it is now exceeded.
    ///
    /// Nothing was just written, so no entry is exempt: the cache may be
    /// emptied entirely.
    pub fn set_capacity(&mut self, capacity: usize) {
        debug!(old = self.capacity, new = capacity, "capacity changed");
        self.capacity = capacity;
        self.enforce_capacity(false);
    }

    // == Stats ==
    /// Returns a snapshot of sizes and counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            length: self.order.len(),
            size: self.total_size,
            capacity: self.capacity,
            oldest_access: self.order.back().map(|entry| entry.last_accessed),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    // == Keys ==
    /// Returns all keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().map(|entry| entry.key.clone()).collect()
    }

    // == Accessors ==
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn promote(&mut self, slot: usize) {
        self.order.move_to_front(slot);
        if let Some(entry) = self.order.get_mut(slot) {
            entry.touch();
        }
    }

    fn update_in_place(&mut self, slot: usize, value: V) {
        if let Some(entry) = self.order.get_mut(slot) {
            let old_size = entry.replace(value);
            self.total_size = self.total_size - old_size + entry.size;
        }
        self.order.move_to_front(slot);
    }

    fn insert_new(&mut self, key: String, value: V) {
        let entry = CacheEntry::new(key.clone(), value);
        self.total_size += entry.size;
        let slot = self.order.push_front(entry);
        self.index.insert(key, slot);
    }

    // == Enforce Capacity ==
    /// Evicts from the back until the budget holds.
    ///
    /// With `keep_front` the entry at the front (the one just written) is
    /// never evicted, even if it alone exceeds the budget. Returns the number
    /// of evicted entries.
    fn enforce_capacity(&mut self, keep_front: bool) -> usize {
        let floor = usize::from(keep_front);
        let mut evicted = 0;
        while self.total_size > self.capacity && self.order.len() > floor {
            let Some(entry) = self.order.pop_back() else {
                break;
            };
            self.index.remove(&entry.key);
            self.total_size -= entry.size;
            self.evictions += 1;
            evicted += 1;
            debug!(
                key = %entry.key,
                size = entry.size,
                total_size = self.total_size,
                "evicted least recently used entry"
            );
        }
        if self.total_size > self.capacity {
            if let Some(entry) = self.order.front() {
                warn!(
                    key = %entry.key,
                    size = entry.size,
                    capacity = self.capacity,
                    "entry exceeds cache capacity on its own"
                );
            }
        }
        evicted
    }
}

impl<V: CacheValue + Clone> CacheStore<V> {
    // == Items ==
    /// Returns clones of all key/value pairs from most to least recently used.
    pub fn items(&self) -> Vec<Item<V>> {
        self.order
            .iter()
            .map(|entry| Item::new(entry.key.clone(), entry.value.clone()))
            .collect()
    }
}

#[cfg(test)]
impl<V: CacheValue> CacheStore<V> {
    /// Panics if the index, the list and the size total disagree.
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.order.len(), "index/order length mismatch");
        let summed: usize = self.order.iter().map(|entry| entry.size).sum();
        assert_eq!(summed, self.total_size, "total_size drifted from entry sizes");
        for (key, &slot) in &self.index {
            let entry = self.order.get(slot).expect("index points at vacant slot");
            assert_eq!(&entry.key, key, "index points at wrong entry");
        }
    }
}
