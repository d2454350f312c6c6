//! Call History Replay Module
//!
//! Reconstructs a tracked operation's call history into a report.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{CacheError, Result};
use crate::memo::tracking::OpKeys;
use crate::store::KeyValueStore;

// == Call Record ==
/// One (input, output) pair from a tracked operation's history.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    /// Rendered call arguments
    pub input: String,
    /// Rendered return value
    pub output: String,
}

// == Call Report ==
/// Invocation count and ordered call pairs for a tracked operation.
#[derive(Debug, Clone, Serialize)]
pub struct CallReport {
    /// The tracked operation's name
    pub op: String,
    /// Total invocation count, zero if the operation was never called
    pub count: u64,
    /// (input, output) pairs in call order
    pub calls: Vec<CallRecord>,
    /// When this report was built
    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for CallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} was called {} times:", self.op, self.count)?;
        for call in &self.calls {
            writeln!(f, "{}({}) -> {}", self.op, call.input, call.output)?;
        }
        Ok(())
    }
}

// == Replay ==
/// Builds the call-history report for `op_name` from `store`.
///
/// The count reads zero when the counter key does not exist. The input and
/// output histories are zipped positionally; a length mismatch (possible
/// when calls were not serialized) truncates to the shorter history rather
/// than failing.
pub async fn replay<S: KeyValueStore + ?Sized>(store: &S, op_name: &str) -> Result<CallReport> {
    let keys = OpKeys::new(op_name);

    let count = match store.get(keys.counter()).await? {
        Some(raw) => std::str::from_utf8(&raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| CacheError::decode(keys.counter(), "a call counter"))?,
        None => 0,
    };

    let inputs = store.list_range(&keys.inputs(), 0, -1).await?;
    let outputs = store.list_range(&keys.outputs(), 0, -1).await?;

    let calls = inputs
        .iter()
        .zip(outputs.iter())
        .map(|(input, output)| CallRecord {
            input: String::from_utf8_lossy(input).into_owned(),
            output: String::from_utf8_lossy(output).into_owned(),
        })
        .collect();

    Ok(CallReport {
        op: op_name.to_string(),
        count,
        calls,
        generated_at: Utc::now(),
    })
}
