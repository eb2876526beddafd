//! Tracing setup for host processes.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the binary that embeds the cache.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"sized_lru=info"`).
///
/// Returns false if a global subscriber was already set.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
