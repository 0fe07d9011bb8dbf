//! Cache Store Module
//!
//! Concurrent storage engine: a sharded map of derived keys to entries with
//! TTL checks on read and full-table sweeps.

use std::any::{self, Any};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::trace;

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Concurrent key-value storage with TTL support.
///
/// Every method takes `&self`; the map provides per-key atomicity and no
/// operation here holds a shard guard across a second map access.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: DashMap<String, Arc<CacheEntry>>,
    /// Activity counters
    stats: StatsRecorder,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a value under `key`, expiring `ttl` after `now`.
    ///
    /// An existing entry is replaced and its TTL reset.
    pub fn set_at<T>(&self, key: String, value: T, ttl: Duration, now: DateTime<Utc>)
    where
        T: Any + Send + Sync,
    {
        let entry = CacheEntry::new_at(value, ttl, now);
        self.entries.insert(key, Arc::new(entry));
    }

    // == Get ==
    /// Retrieves the value stored under `key` as `T`, checked against `now`.
    ///
    /// Type mismatches and expired entries are evicted before the error is
    /// returned.
    pub fn get_at<T>(&self, key: &str, now: DateTime<Utc>) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        // Clone the Arc out so the shard guard is released before any removal
        let entry = match self.entries.get(key) {
            Some(guard) => Arc::clone(guard.value()),
            None => {
                self.stats.record_miss();
                return Err(CacheError::NotFound(key.to_string()));
            }
        };

        let value = match entry.downcast::<T>() {
            Some(value) => value,
            None => {
                self.remove_entry(key, &entry);
                self.stats.record_type_mismatch();
                trace!(
                    key,
                    found = entry.type_name(),
                    "evicted entry on type mismatch"
                );
                return Err(CacheError::TypeMismatch {
                    key: key.to_string(),
                    expected: any::type_name::<T>(),
                    found: entry.type_name(),
                });
            }
        };

        if entry.is_expired_at(now) {
            self.remove_entry(key, &entry);
            self.stats.record_expiration();
            trace!(key, "evicted expired entry on read");
            return Err(CacheError::Expired(key.to_string()));
        }

        self.stats.record_hit();
        Ok(value)
    }

    // == Time To Live ==
    /// Returns the TTL left at `now` for the entry under `key`, whatever the
    /// type of its value.
    ///
    /// An expired entry is evicted and reported as `Expired`. Lookup
    /// statistics are not touched.
    pub fn ttl_remaining_at(&self, key: &str, now: DateTime<Utc>) -> Result<Duration> {
        let entry = match self.entries.get(key) {
            Some(guard) => Arc::clone(guard.value()),
            None => return Err(CacheError::NotFound(key.to_string())),
        };

        if entry.is_expired_at(now) {
            self.remove_entry(key, &entry);
            return Err(CacheError::Expired(key.to_string()));
        }

        Ok(entry.ttl_remaining_at(now))
    }

    // == Delete ==
    /// Removes the entry under `key`, if any.
    ///
    /// Returns true if an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Cleanup Expired ==
    /// Removes every entry whose expiration is at or before `now`.
    ///
    /// Entries inserted or removed concurrently may or may not be seen by
    /// the scan. Returns the number of entries removed.
    pub fn clean_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });

        trace!(before, removed, "sweep scanned store");
        self.stats.record_sweep(now, removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    // Removes `key` only if it still maps to `entry`, so a concurrent
    // `set` of a fresh value is left alone.
    fn remove_entry(&self, key: &str, entry: &Arc<CacheEntry>) {
        self.entries
            .remove_if(key, |_, current| Arc::ptr_eq(current, entry));
    }
}
