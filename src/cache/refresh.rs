//! Refresh Scheduler Module
//!
//! Cooldown gate deciding when a full expired-entry sweep may run.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::entry::expiry_after;

// == Refresh Scheduler ==
/// Holds the next instant at or after which a sweep is allowed.
///
/// The timestamp is kept as Unix milliseconds in an atomic so the check on
/// the read path never takes a lock.
#[derive(Debug)]
pub struct RefreshScheduler {
    /// Next allowed sweep time (Unix milliseconds)
    next_refresh_ms: AtomicI64,
    /// Cooldown between two sweeps
    interval: Duration,
}

impl RefreshScheduler {
    // == Constructor ==
    /// Creates a scheduler that allows the first sweep immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            next_refresh_ms: AtomicI64::new(i64::MIN),
            interval,
        }
    }

    /// Returns the cooldown between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Try Acquire ==
    /// Claims the right to sweep at `now`.
    ///
    /// Returns false while `now` is still inside the cooldown window.
    /// Otherwise moves the next allowed time to `now + interval` and returns
    /// true. When several threads race, exactly one of them wins.
    pub fn try_acquire(&self, now: DateTime<Utc>) -> bool {
        let now_ms = now.timestamp_millis();
        let next_ms = expiry_after(now, self.interval).timestamp_millis();

        let mut current = self.next_refresh_ms.load(Ordering::Acquire);
        loop {
            if now_ms < current {
                return false;
            }

            match self.next_refresh_ms.compare_exchange_weak(
                current,
                next_ms,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    // == Release ==
    /// Gives back a claim made by `try_acquire(claimed_at)` whose sweep never
    /// ran, allowing a sweep again from `claimed_at` on.
    ///
    /// Does nothing if the timestamp moved since the claim.
    pub fn release(&self, claimed_at: DateTime<Utc>) {
        let claimed_ms = expiry_after(claimed_at, self.interval).timestamp_millis();
        let _ = self.next_refresh_ms.compare_exchange(
            claimed_ms,
            claimed_at.timestamp_millis(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    // == Next Refresh ==
    /// Returns the next allowed sweep time, or None if a sweep is allowed
    /// at any time.
    pub fn next_refresh(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.next_refresh_ms.load(Ordering::Acquire))
    }

    /// Overrides the next allowed sweep time.
    pub fn set_next_refresh(&self, at: DateTime<Utc>) {
        self.next_refresh_ms
            .store(at.timestamp_millis(), Ordering::Release);
    }
}
