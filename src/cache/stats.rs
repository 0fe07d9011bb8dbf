//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, read-side evictions and sweeps.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of lookups for keys with no entry
    pub misses: u64,
    /// Number of entries evicted because the requested type did not match
    pub type_mismatches: u64,
    /// Number of entries evicted because a read found them expired
    pub expirations: u64,
    /// Number of sweeps that ran
    pub sweeps: u64,
    /// Number of entries removed by sweeps
    pub swept_entries: u64,
    /// Start time of the most recent sweep
    pub last_sweep_at: Option<DateTime<Utc>>,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits over all lookups, or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.type_mismatches + self.expirations;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by every clone of a cache.
#[derive(Debug)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    type_mismatches: AtomicU64,
    expirations: AtomicU64,
    sweeps: AtomicU64,
    swept_entries: AtomicU64,
    // Unix millis, NO_SWEEP until the first sweep
    last_sweep_ms: AtomicI64,
}

const NO_SWEEP: i64 = i64::MIN;

impl Default for StatsRecorder {
    fn default() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            type_mismatches: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
            swept_entries: AtomicU64::new(0),
            last_sweep_ms: AtomicI64::new(NO_SWEEP),
        }
    }
}

impl StatsRecorder {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_type_mismatch(&self) {
        self.type_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Sweep ==
    /// Records a finished sweep started at `at` that removed `removed` entries.
    pub fn record_sweep(&self, at: DateTime<Utc>, removed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept_entries
            .fetch_add(removed as u64, Ordering::Relaxed);
        self.last_sweep_ms
            .store(at.timestamp_millis(), Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters into a `CacheStats` value.
    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        let last_sweep_ms = self.last_sweep_ms.load(Ordering::Relaxed);

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            type_mismatches: self.type_mismatches.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            swept_entries: self.swept_entries.load(Ordering::Relaxed),
            last_sweep_at: (last_sweep_ms != NO_SWEEP)
                .then(|| DateTime::from_timestamp_millis(last_sweep_ms))
                .flatten(),
            total_entries,
        }
    }
}
