//! Control-panel event publication endpoints.
//!
//! The channel is derived from the raw token string, so publication does
//! not decode the token; possession of the exact token string is what
//! scopes the channel.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::bus::channel_for_token;
use crate::models::event::{AudiencePayload, OverlayEvent};
use crate::models::options::{Mode, StreamKind, TaskType};
use crate::{AppError, Result};

use super::{resolve_token, SharedState};

/// Body of `POST /api/events`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishRequest {
    /// Token carried in the body when no bearer header is sent.
    pub token: Option<String>,
    /// Event kind tag: `task`, `audience`, anything else is `message`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Task line (task events).
    pub line: Option<String>,
    /// Tone (task events), loose string.
    pub mode: Option<String>,
    /// Task type (task events), loose string.
    pub task_type: Option<String>,
    /// Stream kind (task events), loose string.
    pub stream_kind: Option<String>,
    /// Streamer name (task events).
    pub name: Option<String>,
    /// Audience selector (audience events).
    pub audience: Option<String>,
    /// Free-form payload (message events).
    pub payload: Option<Map<String, Value>>,
}

/// Handler for `POST /api/events` — publish an event onto the token's
/// channel.
///
/// # Errors
///
/// `token_missing` (400) when no token is supplied.
pub async fn publish(
    State(state): SharedState,
    headers: HeaderMap,
    body: std::result::Result<Json<PublishRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let token = resolve_token(&headers, req.token.as_deref())
        .ok_or_else(|| AppError::BadRequest("token_missing".into()))?;
    let channel = channel_for_token(&token);

    let ts = Utc::now().timestamp_millis();
    let event = match req.kind.as_deref() {
        Some("task") => OverlayEvent::Task {
            line: req.line.unwrap_or_default(),
            mode: Mode::from_loose(req.mode.as_deref().unwrap_or_default()),
            task_type: TaskType::from_loose(req.task_type.as_deref().unwrap_or_default()),
            stream_kind: StreamKind::from_loose(req.stream_kind.as_deref().unwrap_or_default()),
            name: req.name.filter(|name| !name.is_empty()),
            ts,
        },
        Some("audience") => OverlayEvent::Audience {
            payload: AudiencePayload {
                audience: req.audience.unwrap_or_else(|| "all".into()),
            },
            ts,
        },
        _ => OverlayEvent::Message {
            payload: req.payload.unwrap_or_default(),
            ts,
        },
    };

    state.bus.publish(&channel, event).await?;
    Ok(Json(json!({ "ok": true })))
}

/// Body of `POST /api/events/toggle`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToggleRequest {
    /// Token carried in the body when no bearer header is sent.
    pub token: Option<String>,
    /// Audience selector; defaults to `all`.
    pub audience: Option<String>,
}

/// Handler for `POST /api/events/toggle` — switch the addressed audience
/// and notify subscribers.
///
/// # Errors
///
/// `token_missing` (400) when no token is supplied.
pub async fn toggle(
    State(state): SharedState,
    headers: HeaderMap,
    body: std::result::Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let token = resolve_token(&headers, req.token.as_deref())
        .ok_or_else(|| AppError::BadRequest("token_missing".into()))?;
    let channel = channel_for_token(&token);

    let audience = req.audience.unwrap_or_else(|| "all".into());
    let event = OverlayEvent::Audience {
        payload: AudiencePayload {
            audience: audience.clone(),
        },
        ts: Utc::now().timestamp_millis(),
    };
    state.bus.publish(&channel, event).await?;
    Ok(Json(json!({ "ok": true, "audience": audience })))
}
