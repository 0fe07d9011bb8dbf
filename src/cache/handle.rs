//! Cache Handle Module
//!
//! Public entry point tying together the store, key derivation, default TTL
//! and the refresh scheduler.

use std::any::Any;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cache::{generate_key, CacheStats, CacheStore, RefreshScheduler};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::spawn_sweep;

// == Cache ==
/// Thread-safe in-memory cache of typed values with TTL expiration.
///
/// Cloning is cheap and every clone shares the same entries. Expired
/// entries are dropped when a read sees them, and in bulk by a sweep that
/// successful reads trigger at most once per refresh interval.
///
/// ```
/// use mini_ttl_cache::{Cache, CacheError, SECOND};
///
/// let cache = Cache::new();
/// cache.set_with_ttl(String::from("Ada"), 30 * SECOND, &[&"user", &7]);
///
/// let name = cache.get::<String>(&[&"user", &7]).unwrap();
/// assert_eq!(*name, "Ada");
///
/// assert!(matches!(
///     cache.get::<u32>(&[&"user", &7]),
///     Err(CacheError::TypeMismatch { .. })
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    inner: Arc<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    store: CacheStore,
    /// Default TTL in nanoseconds
    default_ttl_ns: AtomicU64,
    refresh: RefreshScheduler,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache from the given configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        info!(
            "Cache initialized: default_ttl={:?}, refresh_interval={:?}",
            config.default_ttl, config.refresh_interval
        );

        Self {
            inner: Arc::new(CacheInner {
                store: CacheStore::new(),
                default_ttl_ns: AtomicU64::new(duration_to_nanos(config.default_ttl)),
                refresh: RefreshScheduler::new(config.refresh_interval),
            }),
        }
    }

    // == Set ==
    /// Stores `value` under the key derived from `keys` with the default TTL.
    pub fn set<T>(&self, value: T, keys: &[&dyn Display])
    where
        T: Any + Send + Sync,
    {
        self.set_with_ttl(value, self.default_ttl(), keys);
    }

    /// Stores `value` under the key derived from `keys`, expiring after `ttl`.
    ///
    /// Replaces any existing entry for the same key, resetting its expiration.
    pub fn set_with_ttl<T>(&self, value: T, ttl: Duration, keys: &[&dyn Display])
    where
        T: Any + Send + Sync,
    {
        self.inner
            .store
            .set_at(generate_key(keys), value, ttl, Utc::now());
    }

    // == Get ==
    /// Retrieves the value stored under the key derived from `keys`.
    ///
    /// # Errors
    /// - `NotFound` if no entry exists
    /// - `TypeMismatch` if the value was not stored as exactly `T`; the entry is evicted
    /// - `Expired` if the TTL has elapsed; the entry is evicted
    ///
    /// A successful read may hand an expired-entry sweep to a background
    /// worker. The read itself never waits for it.
    pub fn get<T>(&self, keys: &[&dyn Display]) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let now = Utc::now();
        let value = self.inner.store.get_at::<T>(&generate_key(keys), now)?;

        // Hand the claim back if no worker could take it, so the next read retries
        if self.inner.refresh.try_acquire(now) && spawn_sweep(self.clone(), now).is_none() {
            self.inner.refresh.release(now);
        }

        Ok(value)
    }

    // == Time To Live ==
    /// Returns how long the entry under the key derived from `keys` has left.
    ///
    /// # Errors
    /// - `NotFound` if no entry exists
    /// - `Expired` if the TTL has elapsed; the entry is evicted
    pub fn ttl_remaining(&self, keys: &[&dyn Display]) -> Result<Duration> {
        self.inner
            .store
            .ttl_remaining_at(&generate_key(keys), Utc::now())
    }

    // == Delete ==
    /// Removes the entry under the key derived from `keys`, if any.
    pub fn delete(&self, keys: &[&dyn Display]) {
        self.inner.store.delete(&generate_key(keys));
    }

    // == Sweeping ==
    /// Removes every entry whose expiration is at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn clean_expired(&self, now: DateTime<Utc>) -> usize {
        let removed = self.inner.store.clean_expired(now);
        debug!(
            removed,
            remaining = self.inner.store.len(),
            "Cache sweep complete"
        );
        removed
    }

    /// Sweeps at `now` unless the previous sweep is still inside its cooldown.
    ///
    /// Returns the number of entries removed, or None if the sweep was skipped.
    pub fn check_refresh(&self, now: DateTime<Utc>) -> Option<usize> {
        if !self.inner.refresh.try_acquire(now) {
            return None;
        }
        Some(self.clean_expired(now))
    }

    // == Configuration ==
    /// Replaces the default TTL used by future `set` calls.
    pub fn set_default_ttl(&self, ttl: Duration) {
        self.inner
            .default_ttl_ns
            .store(duration_to_nanos(ttl), Ordering::Relaxed);
    }

    /// Returns the current default TTL.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_nanos(self.inner.default_ttl_ns.load(Ordering::Relaxed))
    }

    /// Overrides the next time a read is allowed to trigger a sweep.
    ///
    /// A time in the past makes the next successful read sweep.
    pub fn set_refresh_time(&self, at: DateTime<Utc>) {
        self.inner.refresh.set_next_refresh(at);
    }

    /// Returns the next time a sweep is allowed, or None before the first sweep.
    pub fn refresh_time(&self) -> Option<DateTime<Utc>> {
        self.inner.refresh.next_refresh()
    }

    /// Returns the minimum interval between two sweeps.
    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh.interval()
    }

    // == Introspection ==
    /// Returns the number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.store.clear();
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.store.stats()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_to_nanos(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_nanos()).unwrap_or(u64::MAX)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    use crate::cache::{HOUR, MINUTE};
    use crate::error::CacheError;

    #[test]
    fn test_cache_defaults() {
        let cache = Cache::new();
        assert_eq!(cache.default_ttl(), MINUTE);
        assert_eq!(cache.refresh_interval(), HOUR);
        assert!(cache.refresh_time().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_default_ttl_not_retroactive() {
        let cache = Cache::new();
        // Keep the background sweep from removing "b" before it is read
        cache.set_refresh_time(Utc::now() + TimeDelta::days(1));

        cache.set("old", &[&"a"]);
        cache.set_default_ttl(Duration::ZERO);
        cache.set("new", &[&"b"]);

        assert!(cache.get::<&str>(&[&"a"]).is_ok());
        assert!(matches!(
            cache.get::<&str>(&[&"b"]),
            Err(CacheError::Expired(_))
        ));
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = Cache::new();
        let other = cache.clone();

        cache.set(5u32, &[&"shared"]);
        assert_eq!(*other.get::<u32>(&[&"shared"]).unwrap(), 5);

        other.delete(&[&"shared"]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_independent_caches() {
        let first = Cache::new();
        let second = Cache::new();

        first.set(1u8, &[&"k"]);
        assert!(matches!(
            second.get::<u8>(&[&"k"]),
            Err(CacheError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_key_parts() {
        let cache = Cache::new();
        cache.set("degenerate", &[]);
        assert_eq!(*cache.get::<&str>(&[]).unwrap(), "degenerate");
        assert_eq!(*cache.get::<&str>(&[&""]).unwrap(), "degenerate");
    }

    #[test]
    fn test_check_refresh_respects_cooldown() {
        let cache = Cache::new();
        let now = Utc::now();

        cache.set_with_ttl("short", Duration::from_millis(10), &[&"s"]);

        let later = now + TimeDelta::seconds(1);
        assert_eq!(cache.check_refresh(later), Some(1));
        assert_eq!(cache.check_refresh(later + TimeDelta::minutes(10)), None);

        let next = cache.refresh_time().unwrap();
        assert_eq!(
            next.timestamp_millis(),
            (later + TimeDelta::hours(1)).timestamp_millis()
        );
    }

    #[test]
    fn test_ttl_remaining() {
        let cache = Cache::new();
        cache.set_with_ttl("v", Duration::from_secs(30), &[&"ttl", &1]);

        let remaining = cache.ttl_remaining(&[&"ttl", &1]).unwrap();
        assert!(remaining <= Duration::from_secs(30));
        assert!(remaining > Duration::from_secs(29));

        assert!(matches!(
            cache.ttl_remaining(&[&"ttl", &2]),
            Err(CacheError::NotFound(_))
        ));
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let cache = Cache::new();
        cache.set_with_ttl("v", Duration::ZERO, &[&"gone"]);

        assert!(matches!(
            cache.ttl_remaining(&[&"gone"]),
            Err(CacheError::Expired(_))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = Cache::new();
        cache.set(1u8, &[&"a"]);
        cache.set(2u8, &[&"b"]);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
