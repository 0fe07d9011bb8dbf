//! Cache Module
//!
//! Provides in-memory caching of typed values with TTL expiration and
//! read-triggered cleanup.

mod entry;
mod handle;
mod key;
mod refresh;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub(crate) use entry::CacheEntry;
pub use handle::Cache;
pub use key::{generate_key, KEY_SEPARATOR};
pub use refresh::RefreshScheduler;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// One second
pub const SECOND: Duration = Duration::from_secs(1);

/// One minute
pub const MINUTE: Duration = Duration::from_secs(60);

/// One hour
pub const HOUR: Duration = Duration::from_secs(60 * 60);

/// One day
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);
