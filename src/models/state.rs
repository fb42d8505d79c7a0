//! Per-token overlay settings document.
//!
//! The control panel PATCHes this; the overlay reads it on load. It lives in
//! the keyed store under `state:{channel}` with a 24 h TTL and every field
//! is optional so partial documents round-trip unchanged.

use serde::{Deserialize, Serialize};

use super::options::{Mode, StreamKind};

/// Auto-refresh interval floor, seconds.
const MIN_SECONDS: u32 = 5;
/// Auto-refresh interval cap, seconds.
const MAX_SECONDS: u32 = 60;

/// Overlay settings as stored and served.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayState {
    /// Selected tone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// Auto-refresh interval in seconds, clamped to 5..=60.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
    /// Whether the overlay auto-requests new lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto: Option<bool>,
    /// Whether lines are read out loud.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<bool>,
    /// Whether the companion widget is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend: Option<bool>,
    /// Stream context selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_kind: Option<StreamKind>,
}

/// A partial update to [`OverlayState`] sent by the control panel.
///
/// Fields arrive as loose strings/numbers and are normalized on merge;
/// unknown values fall back to defaults rather than erroring.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePatch {
    /// Tone selector, loose string.
    pub mode: Option<String>,
    /// Auto-refresh interval in seconds.
    pub seconds: Option<u32>,
    /// Auto-request toggle.
    pub auto: Option<bool>,
    /// Voice toggle.
    pub voice: Option<bool>,
    /// Companion widget toggle.
    pub friend: Option<bool>,
    /// Stream context selector, loose string.
    pub stream_kind: Option<String>,
}

impl OverlayState {
    /// Apply a patch, normalizing loose values and clamping `seconds`.
    #[must_use]
    pub fn merged(mut self, patch: &StatePatch) -> Self {
        if let Some(ref mode) = patch.mode {
            self.mode = Some(Mode::from_loose(mode));
        }
        if let Some(seconds) = patch.seconds {
            self.seconds = Some(seconds.clamp(MIN_SECONDS, MAX_SECONDS));
        }
        if let Some(auto) = patch.auto {
            self.auto = Some(auto);
        }
        if let Some(voice) = patch.voice {
            self.voice = Some(voice);
        }
        if let Some(friend) = patch.friend {
            self.friend = Some(friend);
        }
        if let Some(ref kind) = patch.stream_kind {
            self.stream_kind = Some(StreamKind::from_loose(kind));
        }
        self
    }
}
