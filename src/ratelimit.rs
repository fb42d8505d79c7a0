//! Fixed-window per-channel rate limiting.
//!
//! One counter per (channel, UTC minute floor). The counter self-expires
//! slightly after the window so the store stays clean without coordination.
//! A fixed window means a burst straddling a minute boundary can briefly
//! reach twice the steady-state rate; that trade-off is intentional and
//! kept from the original design.
//!
//! The limiter never blocks and never queues: callers get an immediate
//! yes/no. A store failure counts as yes, losing rate enforcement rather
//! than failing overlay requests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use crate::store::Store;

/// Counter keys outlive their minute window by this much, so a bucket is
/// always gone before its key can be reused.
const BUCKET_TTL: Duration = Duration::from_secs(70);

/// Fixed-minute-window request counter over the shared store.
pub struct RateLimiter {
    store: Arc<dyn Store>,
    limit_per_window: i64,
}

impl RateLimiter {
    /// Create a limiter allowing `limit_per_window` requests per minute per
    /// channel.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, limit_per_window: i64) -> Self {
        Self {
            store,
            limit_per_window,
        }
    }

    /// Count one request against the channel's current minute window.
    ///
    /// Returns `false` once the window's counter exceeds the limit. The
    /// counter is never decremented; it resets only by key expiry.
    pub async fn try_acquire(&self, channel: &str) -> bool {
        self.try_acquire_at(channel, Utc::now().timestamp_millis() / 60_000)
            .await
    }

    /// Count one request against an explicit minute-floor window.
    ///
    /// Exposed so tests can step the window without waiting a minute.
    pub async fn try_acquire_at(&self, channel: &str, minute_floor: i64) -> bool {
        let key = format!("rate:{channel}:{minute_floor}");
        let count = match self.store.incr(&key).await {
            Ok(count) => count,
            Err(err) => {
                warn!(%channel, %err, "rate counter unavailable, allowing request");
                return true;
            }
        };
        if count == 1 {
            // First hit in the window arms the self-clear. Crash between
            // incr and expire leaves an undercount, never an overcount.
            if let Err(err) = self.store.expire(&key, BUCKET_TTL).await {
                warn!(%channel, %err, "failed to arm rate bucket expiry");
            }
        }
        count <= self.limit_per_window
    }
}
