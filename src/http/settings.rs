//! Per-token overlay settings endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::bus::channel_for_token;
use crate::models::state::{OverlayState, StatePatch};
use crate::{AppError, Result};

use super::SharedState;

fn state_key(channel: &str) -> String {
    format!("state:{channel}")
}

/// Query string of `GET /api/state`.
#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    /// The overlay token.
    pub token: Option<String>,
}

/// Handler for `GET /api/state` — current settings document, `{}` when
/// none was stored or it no longer parses.
///
/// # Errors
///
/// `token_missing` (400) when no token is supplied.
pub async fn fetch(
    State(state): SharedState,
    Query(query): Query<StateQuery>,
) -> Result<Json<Value>> {
    let token = query
        .token
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::BadRequest("token_missing".into()))?;
    let key = state_key(&channel_for_token(&token));

    let current = load_state(&state, &key).await;
    Ok(Json(json!({ "ok": true, "state": current })))
}

/// Body of `POST /api/state`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRequest {
    /// The overlay token.
    pub token: Option<String>,
    /// Partial settings update.
    pub patch: Option<StatePatch>,
}

/// Handler for `POST /api/state` — merge a patch into the stored document.
///
/// # Errors
///
/// `token_missing` (400) when no token is supplied.
pub async fn update(
    State(state): SharedState,
    body: std::result::Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let token = req
        .token
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::BadRequest("token_missing".into()))?;
    let key = state_key(&channel_for_token(&token));

    let merged = load_state(&state, &key)
        .await
        .merged(&req.patch.unwrap_or_default());

    let encoded = serde_json::to_string(&merged)?;
    if let Err(err) = state
        .store
        .set(&key, &encoded, Some(state.config.state_ttl()))
        .await
    {
        warn!(%err, "settings write failed, returning merged document anyway");
    }
    Ok(Json(json!({ "ok": true, "state": merged })))
}

async fn load_state(state: &super::AppState, key: &str) -> OverlayState {
    match state.store.get(key).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
        Ok(None) => OverlayState::default(),
        Err(err) => {
            warn!(%err, "settings read failed, treating as empty");
            OverlayState::default()
        }
    }
}
