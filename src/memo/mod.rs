//! Memoizing Cache Module
//!
//! Persists arbitrary values under generated keys and tracks every tracked
//! operation's invocation count and input/output history in the same
//! external store.
//!
//! The bookkeeping is explicit composition, not interception: [`CallTracker`]
//! wraps any operation given a store handle and a stable operation name, and
//! [`Cache`] routes its own `store` calls through one.

mod cache;
mod replay;
mod tracking;

// Re-export public types
pub use cache::{Cache, Value, STORE_OP};
pub use replay::{replay, CallRecord, CallReport};
pub use tracking::{CallTracker, OpKeys};
