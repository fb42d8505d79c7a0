//! Token issuing and verification endpoints for the dashboard and overlay.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{AppError, Result};

use super::SharedState;

/// Body of `POST /api/token`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueRequest {
    /// Streamer display name to embed as the token subject.
    pub name: Option<String>,
    /// Requested TTL in seconds; clamped to at least 60.
    pub ttl_sec: Option<i64>,
}

/// Handler for `POST /api/token` — issue a signed overlay token.
///
/// # Errors
///
/// `bad_name` (400) when the name is missing or blank.
pub async fn issue(
    State(state): SharedState,
    body: std::result::Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("bad_name".into()))?
        .to_owned();

    let ttl = req
        .ttl_sec
        .unwrap_or(state.config.token.default_ttl_seconds);
    let token = state.codec.issue(&name, ttl)?;
    Ok(Json(json!({ "ok": true, "token": token })))
}

/// Query string of `GET /api/overlay/verify`.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    /// Token under its short query name.
    pub t: Option<String>,
    /// Token under its long query name.
    pub token: Option<String>,
}

/// Handler for `GET /api/overlay/verify` — decode and check a token.
///
/// # Errors
///
/// 401 with `invalid_token` for any verify failure, `token_missing` when
/// no token was supplied at all.
pub async fn verify(
    State(state): SharedState,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<Value>> {
    let token = query
        .t
        .or(query.token)
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("token_missing".into()))?;

    let claims = state.codec.verify(&token)?;
    Ok(Json(json!({ "ok": true, "payload": claims })))
}
