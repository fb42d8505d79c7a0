//! Per-token event channels: bounded replay log plus live fan-out.
//!
//! Publishing appends the event to a store-backed log (newest first,
//! trimmed to a fixed depth, 24 h TTL) and pushes it to every live
//! subscriber of the channel through a `tokio::sync::broadcast` sender.
//! Persistence is fire-and-forget: a store failure is logged and the live
//! fan-out still happens.
//!
//! Subscriptions replay the most recent few logged events, then stream
//! live ones. There is no resume-from-offset: a client that reconnects
//! may miss anything published between its disconnect and the replay
//! window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::broadcast;
use tracing::warn;

use crate::models::event::OverlayEvent;
use crate::store::Store;
use crate::Result;

/// Live subscribers a channel can lag behind before it starts missing
/// events (bounded-replay contract; missed events are skipped, not queued).
const FANOUT_CAPACITY: usize = 64;

/// Derive the channel id for a token.
///
/// Hashes the raw token string, so the channel can be addressed without
/// decoding or verifying the token, and two different token strings never
/// share a channel even when they encode the same subject.
#[must_use]
pub fn channel_for_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("overlay:{:x}", hasher.finalize())
}

/// An open subscription: buffered backlog first, then the live feed.
pub struct Subscription {
    /// Most recent logged events in publish order, capped at the replay
    /// depth.
    pub backlog: Vec<OverlayEvent>,
    /// Live receiver for events published after the subscription opened.
    pub live: broadcast::Receiver<OverlayEvent>,
}

/// Publish/subscribe hub multiplexing overlay channels.
pub struct EventBus {
    store: Arc<dyn Store>,
    channels: Mutex<HashMap<String, broadcast::Sender<OverlayEvent>>>,
    log_keep: usize,
    log_ttl: Duration,
    replay: usize,
}

impl EventBus {
    /// Create a bus whose per-channel logs keep `log_keep` events for
    /// `log_ttl`, replaying the most recent `replay` on subscribe.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, log_keep: usize, log_ttl: Duration, replay: usize) -> Self {
        Self {
            store,
            channels: Mutex::new(HashMap::new()),
            log_keep,
            log_ttl,
            replay,
        }
    }

    /// Publish an event onto a channel.
    ///
    /// Appends to the bounded log and fans out to live subscribers. There
    /// is no delivery acknowledgement; subscribers that lag past the
    /// fan-out buffer skip the missed events.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Bus` only when the event cannot be serialized;
    /// store failures are absorbed.
    pub async fn publish(&self, channel: &str, event: OverlayEvent) -> Result<()> {
        let encoded = serde_json::to_string(&event)?;
        let key = Self::log_key(channel);
        if let Err(err) = self
            .store
            .push_front(&key, &encoded, self.log_keep, self.log_ttl)
            .await
        {
            warn!(%channel, %err, "event log append failed, delivering live only");
        }

        let mut channels = self.lock();
        if let Some(sender) = channels.get(channel) {
            if sender.receiver_count() == 0 {
                channels.remove(channel);
            } else {
                // Send only fails when every receiver dropped between the
                // count check and here; nothing to deliver to either way.
                let _ = sender.send(event);
            }
        }
        Ok(())
    }

    /// Open a subscription on a channel.
    ///
    /// The live receiver is registered before the backlog is read, so an
    /// event racing the open may be seen twice but never lost.
    pub async fn subscribe(&self, channel: &str) -> Subscription {
        let live = self.live_receiver(channel);
        let backlog = self.replay_backlog(channel).await;
        Subscription { backlog, live }
    }

    /// Number of live subscribers currently registered on a channel.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.lock()
            .get(channel)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Drop channel registrations whose subscribers are all gone.
    pub fn prune_idle_channels(&self) {
        self.lock()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    fn live_receiver(&self, channel: &str) -> broadcast::Receiver<OverlayEvent> {
        let mut channels = self.lock();
        channels
            .entry(channel.to_owned())
            .or_insert_with(|| broadcast::channel(FANOUT_CAPACITY).0)
            .subscribe()
    }

    async fn replay_backlog(&self, channel: &str) -> Vec<OverlayEvent> {
        let key = Self::log_key(channel);
        let raw = match self.store.range(&key, self.replay).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%channel, %err, "event log read failed, skipping replay");
                return Vec::new();
            }
        };
        // The log is newest-first; replay in publish order.
        raw.iter()
            .rev()
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(%channel, %err, "dropping undecodable logged event");
                    None
                }
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, broadcast::Sender<OverlayEvent>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log_key(channel: &str) -> String {
        format!("bus:{channel}")
    }
}
