//! Key-Value Store Module
//!
//! The seam between the cache layer and the external key-value store.
//!
//! Everything above this module speaks [`KeyValueStore`]; the two backends,
//! [`RedisStore`] for a real Redis server and [`MemoryStore`] for tests and
//! embedded use, are interchangeable. The trait assumes the backend provides
//! per-key atomicity for [`increment`](KeyValueStore::increment) and
//! [`append_to_list`](KeyValueStore::append_to_list) but no transactions
//! across keys; retargeting to a store without atomic primitives requires a
//! compare-and-swap loop in the backend, not in the callers.

mod entry;
mod memory;
mod redis;


// Re-export public types
pub use entry::StoredEntry;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;

use crate::error::Result;

// == Key-Value Store Trait ==
/// Operations the cache layer requires from the external key-value store.
///
/// Values are raw bytes throughout; typed interpretation (text, integers)
/// happens in the callers. A missing key is `None` or an empty list, never
/// an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetches the value stored at `key`, or `None` if the key is absent
    /// or its entry has expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` at `key`, overwriting any previous value and clearing
    /// any expiry.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Stores `value` at `key` with an expiry of `ttl_seconds`.
    ///
    /// The expiry window restarts on every write; the store enforces it, so
    /// a subsequent [`get`](Self::get) past the window sees an absent key.
    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()>;

    /// Atomically increments the integer counter at `key` and returns the
    /// new value. An absent key counts from zero.
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Atomically appends `value` to the end of the list at `key`, creating
    /// the list if the key is absent.
    async fn append_to_list(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Returns the elements of the list at `key` between `start` and `stop`
    /// inclusive. Negative indices count from the end of the list, so
    /// `(0, -1)` is the whole list. An absent key yields an empty list.
    async fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// Returns true if `key` holds a live value of any kind.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Removes every key from the store.
    async fn flush_all(&self) -> Result<()>;
}
