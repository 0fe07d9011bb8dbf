//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

// == Cache Entry ==
/// Represents a single cache entry: a type-erased value and its expiration.
///
/// Entries are never mutated once stored. A second `set` under the same key
/// builds a new entry.
pub(crate) struct CacheEntry {
    /// The stored value
    value: Arc<dyn Any + Send + Sync>,
    /// Name of the stored value's type, for diagnostics
    type_name: &'static str,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Expiration timestamp
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` after `now`.
    pub fn new_at<T>(value: T, ttl: Duration, now: DateTime<Utc>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            value: Arc::new(value),
            type_name: any::type_name::<T>(),
            created_at: now,
            expires_at: expiry_after(now, ttl),
        }
    }

    // == Downcast ==
    /// Returns the value if it was stored as exactly `T`.
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Name of the type the value was stored as.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// Boundary condition: the entry is expired once `now` reaches
    /// `expires_at`, so a zero TTL is expired immediately.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the TTL left at `now`, or zero once the entry has expired.
    pub fn ttl_remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("type_name", &self.type_name)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

// == Utility Functions ==
/// Returns `now + ttl`, saturating at the latest representable instant.
pub fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
