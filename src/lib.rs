//! Mini TTL Cache - A lightweight in-process cache
//!
//! Stores typed values under composite keys with per-item TTL expiration
//! and lazy, read-triggered cleanup of expired entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{generate_key, Cache, CacheStats, DAY, HOUR, KEY_SEPARATOR, MINUTE, SECOND};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
