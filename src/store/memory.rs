//! In-process [`Store`] implementation with per-key TTL.
//!
//! Expired keys are dropped lazily on access and eagerly by a background
//! sweep task so idle channels do not accumulate forever.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Store, StoreFuture};
use crate::{AppError, Result};

/// One stored value.
#[derive(Debug, Clone)]
enum Slot {
    Value(String),
    Counter(i64),
    List(VecDeque<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    slot: Slot,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Thread-safe in-memory keyed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_sync(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            return None;
        }
        match entries.get(key).map(|entry| &entry.slot) {
            Some(Slot::Value(value)) => Some(value.clone()),
            Some(Slot::Counter(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    fn set_sync(&self, key: String, value: String, ttl: Option<Duration>) {
        let entry = Entry {
            slot: Slot::Value(value),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.lock().insert(key, entry);
    }

    fn incr_sync(&self, key: String) -> Result<i64> {
        let now = Instant::now();
        let mut entries = self.lock();
        if entries.get(&key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(&key);
        }
        let entry = entries.entry(key.clone()).or_insert(Entry {
            slot: Slot::Counter(0),
            expires_at: None,
        });
        match &mut entry.slot {
            Slot::Counter(n) => {
                *n += 1;
                Ok(*n)
            }
            _ => Err(AppError::Store(format!("key {key} is not a counter"))),
        }
    }

    fn expire_sync(&self, key: &str, ttl: Duration) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
    }

    fn push_front_sync(&self, key: String, value: String, keep: usize, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.lock();
        if entries.get(&key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(&key);
        }
        let entry = entries.entry(key).or_insert(Entry {
            slot: Slot::List(VecDeque::new()),
            expires_at: None,
        });
        if let Slot::List(list) = &mut entry.slot {
            list.push_front(value);
            list.truncate(keep);
        } else {
            // Non-list slot under a list key: last write wins.
            entry.slot = Slot::List(VecDeque::from([value]));
        }
        entry.expires_at = Some(now + ttl);
    }

    fn range_sync(&self, key: &str, limit: usize) -> Vec<String> {
        let now = Instant::now();
        let mut entries = self.lock();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            return Vec::new();
        }
        match entries.get(key).map(|entry| &entry.slot) {
            Some(Slot::List(list)) => list.iter().take(limit).cloned().collect(),
            _ => Vec::new(),
        }
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> StoreFuture<'_, Option<String>> {
        let value = self.get_sync(key);
        Box::pin(async move { Ok(value) })
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreFuture<'_, ()> {
        self.set_sync(key.to_owned(), value.to_owned(), ttl);
        Box::pin(async move { Ok(()) })
    }

    fn incr(&self, key: &str) -> StoreFuture<'_, i64> {
        let result = self.incr_sync(key.to_owned());
        Box::pin(async move { result })
    }

    fn expire(&self, key: &str, ttl: Duration) -> StoreFuture<'_, ()> {
        self.expire_sync(key, ttl);
        Box::pin(async move { Ok(()) })
    }

    fn push_front(
        &self,
        key: &str,
        value: &str,
        keep: usize,
        ttl: Duration,
    ) -> StoreFuture<'_, ()> {
        self.push_front_sync(key.to_owned(), value.to_owned(), keep, ttl);
        Box::pin(async move { Ok(()) })
    }

    fn range(&self, key: &str, limit: usize) -> StoreFuture<'_, Vec<String>> {
        let values = self.range_sync(key, limit);
        Box::pin(async move { Ok(values) })
    }
}

/// Spawn the background sweep task.
///
/// Runs until `cancel` fires, dropping expired keys every `interval`.
#[must_use]
pub fn spawn_sweep_task(
    store: Arc<MemoryStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("store sweep task shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    if removed > 0 {
                        debug!(removed, "swept expired store keys");
                    }
                }
            }
        }
    })
}
