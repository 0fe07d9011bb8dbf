//! Expired-Entry Sweep Task
//!
//! Runs a full sweep of a cache without making the caller wait for it.

use std::thread;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::Cache;

/// Handle to a dispatched sweep. Resolves to the number of entries removed.
#[derive(Debug)]
pub enum SweepHandle {
    /// Sweep running on the current tokio runtime's blocking pool
    Runtime(JoinHandle<usize>),
    /// Sweep running on a dedicated OS thread
    Thread(thread::JoinHandle<usize>),
}

impl SweepHandle {
    /// Returns true once the sweep has finished.
    pub fn is_finished(&self) -> bool {
        match self {
            SweepHandle::Runtime(handle) => handle.is_finished(),
            SweepHandle::Thread(handle) => handle.is_finished(),
        }
    }
}

/// Spawns a sweep of `cache` removing entries expired at `now`.
///
/// Inside a tokio runtime the sweep goes to the blocking pool, since it is
/// a CPU-bound scan over the whole store. Outside one it gets a short-lived
/// named thread. The caller is never blocked, and a dispatch failure is
/// only logged.
///
/// # Returns
/// A handle to the running sweep, or None if it could not be started.
pub fn spawn_sweep(cache: Cache, now: DateTime<Utc>) -> Option<SweepHandle> {
    if let Ok(runtime) = Handle::try_current() {
        debug!("Dispatching cache sweep to runtime blocking pool");
        return Some(SweepHandle::Runtime(
            runtime.spawn_blocking(move || cache.clean_expired(now)),
        ));
    }

    debug!("Dispatching cache sweep to a dedicated thread");
    match thread::Builder::new()
        .name("cache-sweep".to_string())
        .spawn(move || cache.clean_expired(now))
    {
        Ok(handle) => Some(SweepHandle::Thread(handle)),
        Err(err) => {
            warn!("Failed to spawn cache sweep thread: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::time::Duration;

    fn cache_with_one_expired() -> (Cache, DateTime<Utc>) {
        let cache = Cache::new();
        cache.set_with_ttl("expire_soon", Duration::from_millis(50), &[&"short"]);
        cache.set_with_ttl("long_lived", Duration::from_secs(3600), &[&"long"]);
        (cache, Utc::now() + TimeDelta::seconds(1))
    }

    #[test]
    fn test_sweep_on_thread_without_runtime() {
        let (cache, later) = cache_with_one_expired();

        let handle =
            spawn_sweep(cache.clone(), later).expect("sweep should be dispatched");
        let removed = match handle {
            SweepHandle::Thread(handle) => handle.join().unwrap(),
            SweepHandle::Runtime(_) => panic!("no runtime is running"),
        };

        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_on_runtime_blocking_pool() {
        let (cache, later) = cache_with_one_expired();

        let handle =
            spawn_sweep(cache.clone(), later).expect("sweep should be dispatched");
        let removed = match handle {
            SweepHandle::Runtime(handle) => handle.await.unwrap(),
            SweepHandle::Thread(_) => panic!("runtime should be used"),
        };

        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().sweeps, 1);
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_entries() {
        let cache = Cache::new();
        cache.set_with_ttl("value", Duration::from_secs(3600), &[&"long_lived"]);

        if let Some(SweepHandle::Runtime(handle)) = spawn_sweep(cache.clone(), Utc::now()) {
            assert_eq!(handle.await.unwrap(), 0);
        } else {
            panic!("runtime should be used");
        }

        assert_eq!(*cache.get::<&str>(&[&"long_lived"]).unwrap(), "value");
    }

    #[test]
    fn test_sweep_handle_finishes() {
        let cache = Cache::new();
        let handle = spawn_sweep(cache, Utc::now()).unwrap();

        for _ in 0..100 {
            if handle.is_finished() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("sweep did not finish");
    }
}
