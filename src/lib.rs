//! memocache - a memoizing cache over an external key-value store
//!
//! Persists values under generated keys with per-operation call counting
//! and input/output history, plus an expiring page cache that deduplicates
//! repeated URL fetches inside a time window.

pub mod config;
pub mod error;
pub mod memo;
pub mod store;
pub mod web;

pub use config::Config;
pub use error::{CacheError, Result};
pub use memo::{replay, Cache, CallReport, CallTracker, Value, STORE_OP};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
pub use web::{Fetcher, HttpFetcher, PageCache, DEFAULT_PAGE_TTL_SECS};
