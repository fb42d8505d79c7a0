//! Recognized generation options and their lenient normalization.
//!
//! Overlay clients of several vintages send these values, so every parser
//! here degrades to a documented default instead of rejecting the request.
//! Legacy aliases (`challenge`, `joke`, `just_talk`, `just_chat`, `gaming`,
//! `music`, `cooking`) are folded into the current sets.

use serde::{Deserialize, Serialize};

/// Tone of the generated line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Playful, witty, no crudeness.
    Funny,
    /// Supportive, energizing.
    #[default]
    Motivator,
    /// Concise and focused.
    Serious,
    /// Relaxed, low-pressure.
    Chill,
    /// Modern street slang vibe, TOS-safe.
    Urban,
    /// Sharper, roast-y, still TOS-safe.
    Edgy,
}

impl Mode {
    /// Parse a loose client value, falling back to the default.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "funny" => Self::Funny,
            "serious" => Self::Serious,
            "chill" => Self::Chill,
            "urban" => Self::Urban,
            "edgy" => Self::Edgy,
            _ => Self::Motivator,
        }
    }

    /// Canonical wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Funny => "funny",
            Self::Motivator => "motivator",
            Self::Serious => "serious",
            Self::Chill => "chill",
            Self::Urban => "urban",
            Self::Edgy => "edgy",
        }
    }
}

/// What kind of line the overlay is asking for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// A concrete micro-task for the streamer.
    #[default]
    Task,
    /// An engaging question for the streamer or chat.
    Question,
    /// A short witty remark, possibly addressed at chat.
    Banter,
}

impl TaskType {
    /// Parse a loose client value, folding legacy aliases.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "question" => Self::Question,
            "banter" | "joke" | "just_talk" => Self::Banter,
            // "challenge" and anything unrecognized collapses to Task.
            _ => Self::Task,
        }
    }

    /// Canonical wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Question => "question",
            Self::Banter => "banter",
        }
    }
}

/// Broad category of the running stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// At the desk, talking to chat.
    #[default]
    JustChatting,
    /// Outdoors or on the move.
    Irl,
    /// Gameplay, music, cooking, anything else.
    Other,
}

impl StreamKind {
    /// Parse a loose client value, folding legacy aliases.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "irl" => Self::Irl,
            "just_chat" | "just_chatting" => Self::JustChatting,
            _ => Self::Other,
        }
    }

    /// Canonical wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JustChatting => "just_chatting",
            Self::Irl => "irl",
            Self::Other => "other",
        }
    }
}

/// Prompt language.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    /// English (default).
    #[default]
    En,
    /// Russian.
    Ru,
    /// Spanish.
    Es,
}

impl Lang {
    /// Parse a loose client value, falling back to English.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "ru" => Self::Ru,
            "es" => Self::Es,
            _ => Self::En,
        }
    }

    /// Canonical wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
            Self::Es => "es",
        }
    }
}
