//! Snapshot Codec
//!
//! Saves cache contents to a byte stream and replays them back.
//!
//! # Format
//! bincode (little-endian, fixed-width integers):
//! 1. header `{ magic: b"SLRU", version: u16 }`
//! 2. `u64` record count, then `{ key: String, value: V }` records,
//!    most recently used first

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{CacheValue, Item, LruCache};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Leading bytes of every snapshot stream.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"SLRU";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Encoded size of [`SnapshotHeader`]: magic plus a `u16` version.
const HEADER_LEN: usize = 6;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: [u8; 4],
    version: u16,
}

impl SnapshotHeader {
    fn current() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(CacheError::Format(format!(
                "bad snapshot magic {:?}",
                self.magic
            )));
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(CacheError::Format(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        Ok(())
    }
}

impl<V> LruCache<V>
where
    V: CacheValue + Clone + Serialize + DeserializeOwned,
{
    // == Save ==
    /// Writes every item, most recently used first.
    ///
    /// The items are copied under the lock; encoding happens after it is
    /// released so a slow writer never blocks other callers. Returns the
    /// number of records written.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<usize> {
        let items = self.items();
        bincode::serialize_into(&mut writer, &SnapshotHeader::current())?;
        bincode::serialize_into(&mut writer, &items)?;
        writer.flush()?;
        info!(records = items.len(), "snapshot written");
        Ok(items.len())
    }

    // == Load ==
    /// Reads a snapshot and replays every record through `set`.
    ///
    /// Records are replayed from the least recently used one (end of the
    /// stream) to the most recently used one, so the saved recency order is
    /// restored exactly. Existing keys are updated in place.
    ///
    /// The stream is read to the end and decoded from memory before the lock
    /// is taken, so a decode error leaves the cache untouched and a corrupt
    /// length prefix fails against the bytes actually present instead of
    /// being trusted for an allocation. Replay then runs under a single lock
    /// with capacity enforced after every record: if the snapshot is larger
    /// than the current capacity, the records replayed last (the most recent
    /// ones in the snapshot) are the ones kept. Returns the number of records
    /// replayed.
    pub fn load<R: Read>(&self, mut reader: R) -> Result<usize> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let header: SnapshotHeader = bincode::deserialize(&bytes)?;
        header.validate()?;
        let body = bytes.get(HEADER_LEN..).unwrap_or_default();
        let items: Vec<Item<V>> = bincode::deserialize(body)?;

        let count = items.len();
        let mut store = self.store.lock();
        for item in items.into_iter().rev() {
            store.set(item.key, item.value);
        }
        info!(records = count, resident = store.len(), "snapshot replayed");
        Ok(count)
    }

    // == Save To File ==
    /// Creates or truncates `path` and saves the snapshot into it.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let count = self.save(BufWriter::new(file))?;
        info!(path = %path.display(), records = count, "saved cache snapshot");
        Ok(count)
    }

    // == Load From File ==
    /// Opens an existing snapshot file and loads it.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let count = self.load(BufReader::new(file))?;
        info!(path = %path.display(), records = count, "loaded cache snapshot");
        Ok(count)
    }

    // == Warm Start ==
    /// Builds a cache from configuration, restoring the configured snapshot
    /// file when it exists.
    pub fn warm_start(config: &Config) -> Result<Self> {
        let cache = Self::from_config(config);
        match config.snapshot_path.as_deref() {
            Some(path) if path.exists() => {
                cache.load_from_file(path)?;
            }
            Some(path) => {
                info!(path = %path.display(), "no snapshot to restore, starting cold");
            }
            None => {}
        }
        Ok(cache)
    }
}
