//! Cache Module
//!
//! Provides a size-bounded LRU cache with snapshot persistence.

mod entry;
mod lru;
mod shared;
mod snapshot;
mod stats;
mod store;


use std::sync::Arc;

use serde::{Deserialize, Serialize};

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruList;
pub use shared::LruCache;
pub use snapshot::{SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Cache Value ==
/// Values stored in the cache report their own size.
///
/// The size is an accounting unit only: it should be deterministic and cheap,
/// and it is never checked against the real memory footprint.
pub trait CacheValue {
    /// Approximate number of bytes held by this value.
    fn size(&self) -> usize;
}

impl CacheValue for String {
    fn size(&self) -> usize {
        self.len()
    }
}

impl CacheValue for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }
}

impl CacheValue for Box<[u8]> {
    fn size(&self) -> usize {
        self.len()
    }
}

impl CacheValue for Box<str> {
    fn size(&self) -> usize {
        self.len()
    }
}

impl CacheValue for &'static str {
    fn size(&self) -> usize {
        self.len()
    }
}

impl<T: CacheValue + ?Sized> CacheValue for Arc<T> {
    fn size(&self) -> usize {
        (**self).size()
    }
}

// == Item ==
/// A key/value pair as returned by [`LruCache::items`] and stored in snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<V> {
    pub key: String,
    pub value: V,
}

impl<V> Item<V> {
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sizes() {
        assert_eq!("hello".to_string().size(), 5);
        assert_eq!(vec![0u8; 7].size(), 7);
        assert_eq!(vec![1u8, 2, 3].into_boxed_slice().size(), 3);
        assert_eq!(Box::<str>::from("abcd").size(), 4);
        assert_eq!("xy".size(), 2);
    }

    #[test]
    fn test_arc_delegates_size() {
        let shared = Arc::new(String::from("shared"));
        assert_eq!(shared.size(), 6);
    }
}
