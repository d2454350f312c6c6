//! Call Tracking Module
//!
//! Wraps an operation with invocation counting and input/output history,
//! all kept in the external key-value store.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::store::KeyValueStore;

// == Operation Keys ==
/// Key scheme for a tracked operation.
///
/// The counter lives under the operation name itself; the two history lists
/// live under `{name}:inputs` and `{name}:outputs`.
#[derive(Debug, Clone)]
pub struct OpKeys {
    name: String,
}

impl OpKeys {
    /// Creates a key scheme for the operation `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the invocation counter.
    pub fn counter(&self) -> &str {
        &self.name
    }

    /// Key of the ordered input history list.
    pub fn inputs(&self) -> String {
        format!("{}:inputs", self.name)
    }

    /// Key of the ordered output history list.
    pub fn outputs(&self) -> String {
        format!("{}:outputs", self.name)
    }
}

// == Call Tracker ==
/// Wraps operations with counting and history bookkeeping.
///
/// A tracker is bound to one operation name; every [`invoke`](Self::invoke)
/// runs, in order: counter increment, input append, the wrapped operation,
/// output append. The counter and the two lists are independently keyed and
/// no transaction spans them. Concurrent unserialized invocations may
/// therefore interleave appends between the input and output lists; the
/// positional input/output alignment holds only when calls are serialized
/// by the caller. That relaxed contract is intentional.
pub struct CallTracker<S> {
    store: Arc<S>,
    keys: OpKeys,
}

impl<S: KeyValueStore> CallTracker<S> {
    // == Constructor ==
    /// Creates a tracker for the operation `op_name` backed by `store`.
    pub fn new(store: Arc<S>, op_name: impl Into<String>) -> Self {
        Self {
            store,
            keys: OpKeys::new(op_name),
        }
    }

    /// The tracked operation's name.
    pub fn op_name(&self) -> &str {
        self.keys.name()
    }

    // == Invoke ==
    /// Runs `op` with full bookkeeping and returns its output.
    ///
    /// If `op` fails, the error propagates as-is: the counter increment and
    /// the input append already performed are not rolled back, and no output
    /// is appended. The attempt still counts as a call.
    ///
    /// # Arguments
    /// * `input` - Rendered form of the call's arguments, appended to the
    ///   input history before the operation runs
    /// * `op` - The operation to wrap
    pub async fn invoke<T, F, Fut>(&self, input: String, op: F) -> Result<T>
    where
        T: fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let count = self.store.increment(self.keys.counter()).await?;
        self.store
            .append_to_list(&self.keys.inputs(), input.as_bytes())
            .await?;

        let output = op().await?;

        self.store
            .append_to_list(&self.keys.outputs(), output.to_string().as_bytes())
            .await?;
        debug!(op = %self.keys.name(), count, "tracked call completed");

        Ok(output)
    }
}
