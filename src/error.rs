//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror.
//!
//! A missing key is never an error anywhere in this crate: lookups return
//! `Option` and absence is the `None` sentinel. The variants below cover the
//! failures that do surface: the external store being unreachable, a wrapped
//! page fetch failing, and stored bytes that cannot be decoded as requested.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The external key-value store rejected or failed an operation
    #[error("key-value store error: {0}")]
    Store(#[from] redis::RedisError),

    /// No connection could be checked out of the Redis pool
    #[error("key-value store unavailable: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Pool construction or other startup wiring failed
    #[error("configuration error: {0}")]
    Config(String),

    /// The underlying page fetch failed; nothing was cached
    #[error("page fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// An operation was applied to a key holding the wrong kind of value
    /// (e.g. a counter increment against a history list)
    #[error("wrong type of value at key '{0}'")]
    WrongType(String),

    /// Stored bytes could not be decoded as the requested type
    #[error("value at key '{key}' is not {expected}")]
    Decode {
        /// The key whose value failed to decode
        key: String,
        /// Human-readable description of the expected shape
        expected: &'static str,
    },
}

impl CacheError {
    /// Shorthand for a decode failure at `key`.
    pub fn decode(key: impl Into<String>, expected: &'static str) -> Self {
        CacheError::Decode {
            key: key.into(),
            expected,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
