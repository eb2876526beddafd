//! Sized LRU - a thread-safe LRU cache bounded by value size
//!
//! Values report their own size; the cache evicts least recently used
//! entries whenever the total exceeds its byte budget, and can snapshot its
//! contents to any `Write` and restore them from any `Read`.

pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod pool;
pub mod simhash;
pub mod telemetry;

pub use cache::{CacheStats, CacheValue, Item, LruCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use pool::{BufferPool, ByteBuffer};
pub use telemetry::init_tracing;
