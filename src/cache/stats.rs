//! Cache Statistics Module
//!
//! Structural gauges plus hit, miss and eviction counters.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of the cache, taken under the lock.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of resident entries
    pub length: usize,
    /// Sum of the reported sizes of resident entries
    pub size: usize,
    /// Current byte budget
    pub capacity: usize,
    /// Last access time of the least recently used entry, None if empty
    pub oldest_access: Option<DateTime<Utc>>,
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups for absent keys
    pub misses: u64,
    /// Number of entries removed to stay within capacity
    pub evictions: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == To JSON ==
    /// Renders the stats as a compact JSON object for metrics sinks.
    pub fn to_json(&self) -> String {
        // Plain numbers, strings and options: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
