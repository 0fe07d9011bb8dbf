//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors surfaced by cache lookups.
///
/// None of these are fatal: they are returned to the caller of `get` and
/// the cache stays fully usable afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No entry stored under the derived key
    #[error("Item not found for key: {0}")]
    NotFound(String),

    /// Entry exists but holds a value of another type; the entry is evicted
    #[error("Expected type {expected} but got {found} for key: {key}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Entry exists with the right type but its TTL has elapsed; the entry is evicted
    #[error("Item for key {0} has expired")]
    Expired(String),
}

impl CacheError {
    /// Returns the derived key the failed lookup was made with.
    pub fn key(&self) -> &str {
        match self {
            CacheError::NotFound(key) | CacheError::Expired(key) => key,
            CacheError::TypeMismatch { key, .. } => key,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache lookups.
pub type Result<T> = std::result::Result<T, CacheError>;
