//! Shared keyed store behind the recency window, rate limiter, event log,
//! and settings documents.
//!
//! The store contract is deliberately narrow: atomic single-key operations
//! only (get/set, increment, bounded prepend, range, expire). Nothing in
//! the application needs multi-key transactions, and channel state is
//! ephemeral; a store that loses everything is recovered from nothing.

pub mod memory;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use memory::{spawn_sweep_task, MemoryStore};

use crate::Result;

/// Boxed future returned by [`Store`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Atomic single-key operations over a volatile keyed store.
///
/// Implementations must make each method atomic with respect to the key it
/// touches; no cross-key ordering is assumed anywhere.
pub trait Store: Send + Sync {
    /// Fetch a string value.
    fn get(&self, key: &str) -> StoreFuture<'_, Option<String>>;

    /// Set a string value, optionally with a TTL.
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreFuture<'_, ()>;

    /// Increment a counter key, creating it at 1, and return the new value.
    fn incr(&self, key: &str) -> StoreFuture<'_, i64>;

    /// Set or refresh a key's TTL. A no-op for missing keys.
    fn expire(&self, key: &str, ttl: Duration) -> StoreFuture<'_, ()>;

    /// Prepend to a list, trim it to the `keep` most recent entries, and
    /// refresh the TTL, as one atomic bounded-prepend operation.
    fn push_front(&self, key: &str, value: &str, keep: usize, ttl: Duration)
        -> StoreFuture<'_, ()>;

    /// Read up to `limit` list entries, most recently pushed first.
    fn range(&self, key: &str, limit: usize) -> StoreFuture<'_, Vec<String>>;
}
