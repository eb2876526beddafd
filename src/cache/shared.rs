//! Shared Cache Module
//!
//! Thread-safe facade over [`CacheStore`].
//!
//! Every call takes the single store lock once and releases it before
//! returning. Share an instance across threads with `Arc<LruCache<V>>`.

use parking_lot::Mutex;

use crate::cache::{CacheStats, CacheStore, CacheValue, Item};
use crate::config::Config;

// == LRU Cache ==
/// Size-bounded LRU cache guarded by one exclusive lock.
#[derive(Debug)]
pub struct LruCache<V> {
    pub(crate) store: Mutex<CacheStore<V>>,
}

impl<V: CacheValue> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` bytes of values.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Mutex::new(CacheStore::new(capacity)),
        }
    }

    /// Creates an empty cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.capacity)
    }

    // == Set ==
    /// Stores a value and promotes it, evicting older entries if needed.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.store.lock().set(key.into(), value);
    }

    // == Set If Absent ==
    /// Inserts only if the key is missing; otherwise just promotes it.
    ///
    /// Returns true if a new entry was inserted.
    pub fn set_if_absent(&self, key: impl Into<String>, value: V) -> bool {
        self.store.lock().set_if_absent(key.into(), value)
    }

    // == Delete ==
    /// Removes an entry. Returns whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    // == Clear ==
    /// Removes every entry; capacity is unchanged.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    // == Set Capacity ==
    /// Changes the byte budget, evicting immediately if it is exceeded.
    pub fn set_capacity(&self, capacity: usize) {
        self.store.lock().set_capacity(capacity);
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    /// Stats rendered as JSON, see [`CacheStats::to_json`].
    pub fn stats_json(&self) -> String {
        self.stats().to_json()
    }

    // == Keys ==
    /// Keys from most to least recently used, copied under the lock.
    pub fn keys(&self) -> Vec<String> {
        self.store.lock().keys()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    pub fn total_size(&self) -> usize {
        self.store.lock().total_size()
    }
}

impl<V: CacheValue + Clone> LruCache<V> {
    // == Get ==
    /// Returns a clone of the value and promotes the entry.
    ///
    /// Wrap large values in `Arc` to keep this cheap.
    pub fn get(&self, key: &str) -> Option<V> {
        self.store.lock().get(key).cloned()
    }

    /// Returns a clone of the value without promoting it.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.store.lock().peek(key).cloned()
    }

    // == Items ==
    /// Key/value pairs from most to least recently used, copied under the lock.
    pub fn items(&self) -> Vec<Item<V>> {
        self.store.lock().items()
    }
}
