//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with size bookkeeping.

use chrono::{DateTime, Utc};

use crate::cache::CacheValue;

// == Cache Entry ==
/// Represents a single resident entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this entry is indexed under
    pub key: String,
    /// The stored value
    pub value: V,
    /// `value.size()` at the last write
    pub size: usize,
    /// Last read or write that promoted this entry.
    /// Informational only, the list order decides eviction.
    pub last_accessed: DateTime<Utc>,
}

impl<V: CacheValue> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry, measuring the value once.
    pub fn new(key: String, value: V) -> Self {
        let size = value.size();
        Self {
            key,
            value,
            size,
            last_accessed: Utc::now(),
        }
    }

    // == Replace ==
    /// Swaps in a new value and returns the previous size.
    pub fn replace(&mut self, value: V) -> usize {
        let old_size = self.size;
        self.size = value.size();
        self.value = value;
        self.touch();
        old_size
    }
}

impl<V> CacheEntry<V> {
    // == Touch ==
    /// Refreshes the access timestamp.
    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }
}
