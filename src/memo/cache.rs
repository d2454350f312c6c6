//! Cache Module
//!
//! Stores arbitrary values under generated keys and retrieves them with
//! optional typed decoding.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{CacheError, Result};
use crate::memo::replay::{replay, CallReport};
use crate::memo::tracking::CallTracker;
use crate::store::KeyValueStore;

/// Operation name under which [`Cache::store`] calls are tracked.
pub const STORE_OP: &str = "Cache::store";

// == Value ==
/// The storable input domain: text, binary, integer, or floating point.
///
/// Encoding follows the store's convention for primitives: integers and
/// floats are written as their decimal text, so a stored `Int(42)` reads
/// back as the bytes `b"42"` and decodes with
/// [`retrieve_int`](Cache::retrieve_int).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
}

impl Value {
    /// Encodes the value to the bytes written to the store.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Text(s) => s.clone().into_bytes(),
            Value::Bytes(b) => b.clone(),
            Value::Int(i) => i.to_string().into_bytes(),
            Value::Float(f) => f.to_string().into_bytes(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

// == Cache ==
/// Memoizing cache over an external key-value store.
///
/// Every [`store`](Self::store) call is routed through a [`CallTracker`]
/// for the operation name [`STORE_OP`], so invocation counts and the full
/// input/output history live next to the data itself.
pub struct Cache<S> {
    store: Arc<S>,
    tracker: CallTracker<S>,
}

impl<S: KeyValueStore> Cache<S> {
    // == Constructor ==
    /// Creates a cache over `store`.
    ///
    /// The store is taken as an explicit handle; nothing is flushed or
    /// otherwise touched at construction. Callers that want the
    /// wipe-at-startup behavior flush the store themselves before wiring
    /// it in.
    pub fn new(store: Arc<S>) -> Self {
        let tracker = CallTracker::new(Arc::clone(&store), STORE_OP);
        Self { store, tracker }
    }

    // == Store ==
    /// Persists `value` under a freshly generated key and returns the key.
    ///
    /// Keys are random UUIDs; a collision is treated as impossible by
    /// construction, so there is no duplicate-key error path.
    pub async fn store(&self, value: impl Into<Value>) -> Result<String> {
        let value = value.into();
        let input = format!("{:?}", value);
        let store = Arc::clone(&self.store);

        self.tracker
            .invoke(input, || async move {
                let key = Uuid::new_v4().to_string();
                store.set(&key, &value.to_bytes()).await?;
                Ok(key)
            })
            .await
    }

    // == Retrieve ==
    /// Fetches the raw bytes stored under `key`.
    ///
    /// An absent key is `Ok(None)`, the sentinel, never an invented default.
    pub async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key).await
    }

    /// Fetches the value under `key` and decodes it with `transform`.
    ///
    /// When the key is absent the transform is skipped entirely and
    /// `Ok(None)` is returned; the transform only ever sees present bytes.
    pub async fn retrieve_with<T>(
        &self,
        key: &str,
        transform: impl FnOnce(Vec<u8>) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.store.get(key).await? {
            None => Ok(None),
            Some(raw) => transform(raw).map(Some),
        }
    }

    /// Fetches the value under `key` decoded as UTF-8 text.
    pub async fn retrieve_str(&self, key: &str) -> Result<Option<String>> {
        self.retrieve_with(key, |raw| {
            String::from_utf8(raw).map_err(|_| CacheError::decode(key, "UTF-8 text"))
        })
        .await
    }

    /// Fetches the value under `key` parsed as a decimal integer.
    pub async fn retrieve_int(&self, key: &str) -> Result<Option<i64>> {
        self.retrieve_with(key, |raw| {
            std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| CacheError::decode(key, "an integer"))
        })
        .await
    }

    // == Replay ==
    /// Builds the call-history report for this cache's `store` operation.
    pub async fn replay_store(&self) -> Result<CallReport> {
        replay(self.store.as_ref(), STORE_OP).await
    }
}
