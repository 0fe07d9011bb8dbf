//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{HOUR, MINUTE};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied by `set` when the caller gives none
    pub default_ttl: Duration,
    /// Minimum interval between two expired-entry sweeps
    pub refresh_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 60000)
    /// - `CACHE_REFRESH_INTERVAL_SECS` - Sweep cooldown in seconds (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            refresh_interval: env::var("CACHE_REFRESH_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_interval),
        }
    }

    /// Replaces the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Replaces the sweep cooldown.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: MINUTE,
            refresh_interval: HOUR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(60));
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_config_builders() {
        let config = CacheConfig::default()
            .with_default_ttl(Duration::from_millis(250))
            .with_refresh_interval(Duration::from_secs(5));

        assert_eq!(config.default_ttl, Duration::from_millis(250));
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
    }

    // Both env cases live in one test so they never race each other.
    #[test]
    fn test_config_from_env() {
        env::remove_var("CACHE_DEFAULT_TTL_MS");
        env::remove_var("CACHE_REFRESH_INTERVAL_SECS");
        assert_eq!(CacheConfig::from_env(), CacheConfig::default());

        env::set_var("CACHE_DEFAULT_TTL_MS", "1500");
        env::set_var("CACHE_REFRESH_INTERVAL_SECS", "not-a-number");
        let config = CacheConfig::from_env();
        assert_eq!(config.default_ttl, Duration::from_millis(1500));
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));

        env::remove_var("CACHE_DEFAULT_TTL_MS");
        env::remove_var("CACHE_REFRESH_INTERVAL_SECS");
    }
}
