//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default byte budget: 64 MiB.
pub const DEFAULT_CAPACITY: usize = 64 * 1024 * 1024;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum total size (in bytes, as reported by values) the cache may hold
    pub capacity: usize,
    /// Snapshot file used by warm starts, if any
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Byte budget (default: 64 MiB)
    /// - `LRU_SNAPSHOT_PATH` - Snapshot file path (default: unset)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("LRU_CAPACITY")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            snapshot_path: env::var_os("LRU_SNAPSHOT_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    // == Builders ==
    /// Returns a config with the given capacity and no snapshot file.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            snapshot_path: None,
        }
    }

    /// Sets the snapshot file path.
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = Config::with_capacity(1024).snapshot_path("/tmp/cache.snap");
        assert_eq!(config.capacity, 1024);
        assert_eq!(
            config.snapshot_path.as_deref(),
            Some(std::path::Path::new("/tmp/cache.snap"))
        );
    }

    // Env vars are process-global, so every env case lives in one test.
    #[test]
    fn test_config_from_env() {
        env::remove_var("LRU_CAPACITY");
        env::remove_var("LRU_SNAPSHOT_PATH");
        assert_eq!(Config::from_env(), Config::default());

        env::set_var("LRU_CAPACITY", "4096");
        env::set_var("LRU_SNAPSHOT_PATH", "/var/cache/lru.snap");
        let config = Config::from_env();
        assert_eq!(config.capacity, 4096);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/var/cache/lru.snap")));

        env::set_var("LRU_CAPACITY", "not-a-number");
        env::set_var("LRU_SNAPSHOT_PATH", "");
        let config = Config::from_env();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!(config.snapshot_path.is_none());

        env::remove_var("LRU_CAPACITY");
        env::remove_var("LRU_SNAPSHOT_PATH");
    }
}
