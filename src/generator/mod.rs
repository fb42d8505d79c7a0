//! Task generation pipeline: authorize, rate-limit, generate, de-duplicate,
//! record, publish.
//!
//! Provider trouble never surfaces to the caller: any attempt that fails
//! hard abandons the remaining attempts and the pipeline falls through to
//! the static fallback set, so `next` always produces a line for a valid,
//! non-rate-limited request.

pub mod fallback;
pub mod prompt;
pub mod provider;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::bus::{channel_for_token, EventBus};
use crate::models::event::OverlayEvent;
use crate::models::options::{Lang, Mode, StreamKind, TaskType};
use crate::ratelimit::RateLimiter;
use crate::recency::RecencyWindow;
use crate::similarity::pick_dissimilar;
use crate::token::TokenCodec;
use crate::{AppError, Result};

use prompt::PromptSpec;
use provider::LineProvider;

/// How many recent lines feed the anti-repetition prompt and selector.
const RECENT_FOR_NEXT: usize = 12;
/// How many recent lines a ping reports back to the control panel.
const RECENT_FOR_PING: usize = 10;
/// How many shuffled fallback lines enter dissimilarity selection.
const FALLBACK_POOL: usize = 5;

/// Where the returned line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Via {
    /// Picked from the provider's candidate pool.
    Generated,
    /// Drawn from the static fallback set.
    Fallback,
}

/// Normalized generation options for one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Tone.
    pub mode: Mode,
    /// Kind of line.
    pub task_type: TaskType,
    /// Stream context.
    pub stream_kind: StreamKind,
    /// Prompt language.
    pub lang: Lang,
}

/// Result of a `next` call.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// The chosen line.
    pub line: String,
    /// Origin of the line.
    pub via: Via,
}

/// Result of a `ping` call.
#[derive(Debug, Clone)]
pub struct PingOutcome {
    /// Subject name from the verified token.
    pub name: String,
    /// The channel's recent lines, newest first.
    pub recent: Vec<String>,
}

/// Orchestrates token checks, rate limiting, provider attempts,
/// dissimilarity selection, recency bookkeeping, and event publication.
pub struct TaskGenerator {
    codec: Arc<TokenCodec>,
    provider: Arc<dyn LineProvider>,
    recency: RecencyWindow,
    limiter: RateLimiter,
    bus: Arc<EventBus>,
    attempts: usize,
}

impl TaskGenerator {
    /// Wire the generator to its collaborators.
    #[must_use]
    pub fn new(
        codec: Arc<TokenCodec>,
        provider: Arc<dyn LineProvider>,
        recency: RecencyWindow,
        limiter: RateLimiter,
        bus: Arc<EventBus>,
        attempts: usize,
    ) -> Self {
        Self {
            codec,
            provider,
            recency,
            limiter,
            bus,
            attempts: attempts.max(1),
        }
    }

    /// Validate the caller's token and report the channel's state without
    /// generating anything.
    ///
    /// # Errors
    ///
    /// `AppError::Unauthorized` for a bad token, `AppError::RateLimited`
    /// when the channel's window is exhausted.
    pub async fn ping(&self, bearer: &str) -> Result<PingOutcome> {
        let claims = self.codec.verify(bearer)?;
        let channel = channel_for_token(bearer);
        self.check_rate(&channel).await?;
        let recent = self.recency.recent(&channel, RECENT_FOR_PING).await;
        Ok(PingOutcome {
            name: claims.sub,
            recent,
        })
    }

    /// Produce the next overlay line for the caller's channel and publish
    /// it as a `task` event.
    ///
    /// # Errors
    ///
    /// `AppError::Unauthorized` for a bad token, `AppError::RateLimited`
    /// when the channel's window is exhausted. Provider failures do not
    /// error; they downgrade to fallback content.
    pub async fn next(&self, bearer: &str, opts: GenerateOptions) -> Result<TaskOutcome> {
        let claims = self.codec.verify(bearer)?;
        let channel = channel_for_token(bearer);
        self.check_rate(&channel).await?;

        let recent = self.recency.recent(&channel, RECENT_FOR_NEXT).await;
        let streamer = Some(claims.sub.clone()).filter(|name| !name.is_empty());

        let candidates = self.collect_candidates(&opts, &recent, streamer.clone()).await;
        let (line, via) = match pick_dissimilar(&candidates, &recent) {
            Some(line) => (line, Via::Generated),
            None => (Self::fallback_line(&recent), Via::Fallback),
        };

        self.recency.record(&channel, &line).await;

        let event = OverlayEvent::Task {
            line: line.clone(),
            mode: opts.mode,
            task_type: opts.task_type,
            stream_kind: opts.stream_kind,
            name: streamer,
            ts: Utc::now().timestamp_millis(),
        };
        self.bus.publish(&channel, event).await?;

        debug!(%channel, ?via, "task line published");
        Ok(TaskOutcome { line, via })
    }

    async fn check_rate(&self, channel: &str) -> Result<()> {
        if self.limiter.try_acquire(channel).await {
            Ok(())
        } else {
            Err(AppError::RateLimited(format!(
                "channel {channel} exhausted its window"
            )))
        }
    }

    /// Run up to `attempts` provider calls, stopping at the first hard
    /// failure. Empty completions are skipped but do not stop the run.
    async fn collect_candidates(
        &self,
        opts: &GenerateOptions,
        recent: &[String],
        streamer: Option<String>,
    ) -> Vec<String> {
        let spec = PromptSpec {
            mode: opts.mode,
            task_type: opts.task_type,
            stream_kind: opts.stream_kind,
            lang: opts.lang,
            recent: recent.to_vec(),
            streamer,
        };
        let user_prompt = prompt::build_prompt(&spec);

        let mut candidates = Vec::with_capacity(self.attempts);
        for attempt in 0..self.attempts {
            match self.provider.one_line(user_prompt.clone()).await {
                Ok(line) if !line.is_empty() => candidates.push(line),
                Ok(_) => {}
                Err(err) => {
                    warn!(attempt, %err, "generation attempt failed, falling back");
                    break;
                }
            }
        }
        candidates
    }

    /// Shuffle the static set, let the selector avoid recent repeats, and
    /// as a last resort take whatever came up first.
    fn fallback_line(recent: &[String]) -> String {
        let pool: Vec<String> = fallback::shuffled().into_iter().take(FALLBACK_POOL).collect();
        pick_dissimilar(&pool, recent)
            .or_else(|| pool.first().cloned())
            .unwrap_or_default()
    }
}
