//! Overlay events published onto a channel and pushed to subscribers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::options::{Mode, StreamKind, TaskType};

/// Payload of an [`OverlayEvent::Audience`] event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudiencePayload {
    /// Which viewer group the overlay should address (`all`, `subs`, ...).
    pub audience: String,
}

/// A single event on an overlay channel.
///
/// Serialized with a `type` tag and `camelCase` field names, the wire format
/// the overlay page consumes directly from the SSE stream. `Message` keeps
/// an open-ended JSON object payload for forward compatibility; the two
/// well-known kinds stay fully typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayEvent {
    /// A new generated (or fallback) line for the overlay to display.
    #[serde(rename_all = "camelCase")]
    Task {
        /// The line to display, original casing preserved.
        line: String,
        /// Tone the line was generated under.
        mode: Mode,
        /// Kind of line.
        task_type: TaskType,
        /// Stream context the line was generated for.
        stream_kind: StreamKind,
        /// Streamer display name, when the token carried one.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Publish timestamp, unix milliseconds.
        ts: i64,
    },
    /// The control panel switched which viewer group is addressed.
    Audience {
        /// Audience selector payload.
        payload: AudiencePayload,
        /// Publish timestamp, unix milliseconds.
        ts: i64,
    },
    /// Free-form control message for the overlay.
    Message {
        /// Arbitrary JSON object payload.
        payload: Map<String, Value>,
        /// Publish timestamp, unix milliseconds.
        ts: i64,
    },
}

impl OverlayEvent {
    /// Publish timestamp of the event, unix milliseconds.
    #[must_use]
    pub fn ts(&self) -> i64 {
        match self {
            Self::Task { ts, .. } | Self::Audience { ts, .. } | Self::Message { ts, .. } => *ts,
        }
    }
}
