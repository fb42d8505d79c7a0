//! Per-channel sliding window of recently emitted lines.
//!
//! The window is advisory: it only feeds duplicate avoidance, so every
//! store failure degrades to "no history" instead of failing the request.
//! Concurrent writers for the same channel race last-write-wins, which is
//! acceptable for a dedup hint.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::store::Store;

/// Bounded most-recent-first buffer of generated lines for one channel.
pub struct RecencyWindow {
    store: Arc<dyn Store>,
    keep: usize,
    ttl: Duration,
}

impl RecencyWindow {
    /// Create a window keeping the `keep` most recent lines with the given
    /// buffer TTL.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, keep: usize, ttl: Duration) -> Self {
        Self { store, keep, ttl }
    }

    /// Record a line as the channel's most recent, trimming the buffer and
    /// refreshing its TTL.
    pub async fn record(&self, channel: &str, line: &str) {
        let key = Self::key(channel);
        if let Err(err) = self.store.push_front(&key, line, self.keep, self.ttl).await {
            warn!(%channel, %err, "recency record failed, continuing without history");
        }
    }

    /// The channel's most recent lines, newest first, at most `limit`.
    ///
    /// Returns an empty list when the channel has no history or the store
    /// is unreachable.
    pub async fn recent(&self, channel: &str, limit: usize) -> Vec<String> {
        let key = Self::key(channel);
        match self.store.range(&key, limit).await {
            Ok(lines) => lines,
            Err(err) => {
                warn!(%channel, %err, "recency read failed, treating history as empty");
                Vec::new()
            }
        }
    }

    fn key(channel: &str) -> String {
        format!("recent:{channel}")
    }
}
