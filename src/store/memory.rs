//! In-Process Store Module
//!
//! A [`KeyValueStore`] backend holding everything in a process-local map.
//!
//! Used by the test suites and available for embedded setups that do not
//! want a Redis round-trip. Per-key atomicity holds because every operation
//! runs to completion under the table lock; nothing is awaited while the
//! lock is held. Expired entries are treated as absent and dropped lazily
//! when touched; [`MemoryStore::purge_expired`] sweeps the whole table.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CacheError, Result};
use crate::store::{KeyValueStore, StoredEntry};

// == Slot ==
/// What a key can hold: a plain value with optional expiry, or a list.
///
/// Mirrors the store's type discipline: value operations against a list key
/// (and vice versa) fail with a wrong-type error instead of coercing.
#[derive(Debug, Clone)]
enum Slot {
    Entry(StoredEntry),
    List(Vec<Vec<u8>>),
}

// == Memory Store ==
/// In-process key-value store with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key-slot table, guarded as a whole
    slots: RwLock<HashMap<String, Slot>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired entries from the table.
    ///
    /// Returns the number of entries removed. Lists never expire.
    pub async fn purge_expired(&self) -> usize {
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| match slot {
            Slot::Entry(entry) => !entry.is_expired(),
            Slot::List(_) => true,
        });
        before - slots.len()
    }

    // == Length ==
    /// Returns the current number of keys in the table, expired or not.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Returns true if the table holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut slots = self.slots.write().await;
        if matches!(slots.get(key), Some(Slot::Entry(entry)) if entry.is_expired()) {
            slots.remove(key);
            return Ok(None);
        }
        match slots.get(key) {
            None => Ok(None),
            Some(Slot::Entry(entry)) => Ok(Some(entry.value.clone())),
            Some(Slot::List(_)) => Err(CacheError::WrongType(key.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut slots = self.slots.write().await;
        slots.insert(
            key.to_string(),
            Slot::Entry(StoredEntry::new(value.to_vec(), None)),
        );
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()> {
        let mut slots = self.slots.write().await;
        slots.insert(
            key.to_string(),
            Slot::Entry(StoredEntry::new(value.to_vec(), Some(ttl_seconds))),
        );
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        let mut slots = self.slots.write().await;
        // Read the current counter state first, then write back
        let current = match slots.get(key) {
            Some(Slot::List(_)) => return Err(CacheError::WrongType(key.to_string())),
            Some(Slot::Entry(entry)) if !entry.is_expired() => {
                let n: i64 = std::str::from_utf8(&entry.value)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| CacheError::decode(key, "an integer"))?;
                Some((n, entry.expires_at))
            }
            // Absent or expired: the counter starts from zero
            _ => None,
        };

        let (next, expires_at) = match current {
            Some((n, expires_at)) => (n + 1, expires_at),
            None => (1, None),
        };

        // Expiry is preserved across increments, as in Redis
        let mut entry = StoredEntry::new(next.to_string().into_bytes(), None);
        entry.expires_at = expires_at;
        slots.insert(key.to_string(), Slot::Entry(entry));

        Ok(next)
    }

    async fn append_to_list(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut slots = self.slots.write().await;
        if matches!(slots.get(key), Some(Slot::List(_))) {
            if let Some(Slot::List(items)) = slots.get_mut(key) {
                items.push(value.to_vec());
            }
            return Ok(());
        }
        if matches!(slots.get(key), Some(Slot::Entry(entry)) if !entry.is_expired()) {
            return Err(CacheError::WrongType(key.to_string()));
        }
        // Absent or expired: a fresh list
        slots.insert(key.to_string(), Slot::List(vec![value.to_vec()]));
        Ok(())
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let slots = self.slots.read().await;
        let items = match slots.get(key) {
            None => return Ok(Vec::new()),
            Some(Slot::Entry(entry)) if entry.is_expired() => return Ok(Vec::new()),
            Some(Slot::Entry(_)) => return Err(CacheError::WrongType(key.to_string())),
            Some(Slot::List(items)) => items,
        };

        // LRANGE index semantics: inclusive bounds, negatives from the end,
        // out-of-range clamped, inverted ranges empty
        let len = items.len() as isize;
        let mut start = if start < 0 { start + len } else { start };
        let mut stop = if stop < 0 { stop + len } else { stop };
        if start < 0 {
            start = 0;
        }
        if stop >= len {
            stop = len - 1;
        }
        if len == 0 || start >= len || stop < 0 || start > stop {
            return Ok(Vec::new());
        }

        Ok(items[start as usize..=stop as usize].to_vec())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut slots = self.slots.write().await;
        if matches!(slots.get(key), Some(Slot::Entry(entry)) if entry.is_expired()) {
            slots.remove(key);
            return Ok(false);
        }
        Ok(slots.contains_key(key))
    }

    async fn flush_all(&self) -> Result<()> {
        self.slots.write().await.clear();
        Ok(())
    }
}
