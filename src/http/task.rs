//! Task endpoint: validate a token (`ping`) or run the full generation
//! pipeline (`next`).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::generator::GenerateOptions;
use crate::models::options::{Lang, Mode, StreamKind, TaskType};
use crate::{AppError, Result};

use super::{resolve_token, SharedState};

/// Body of `POST /api/task`. Every field is optional; unknown values
/// normalize to defaults rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRequest {
    /// `"ping"` or `"next"` (default).
    pub kind: Option<String>,
    /// Token carried in the body when no bearer header is sent.
    pub token: Option<String>,
    /// Tone selector, loose string.
    pub mode: Option<String>,
    /// Task type selector, loose string.
    pub task_type: Option<String>,
    /// Stream kind selector, loose string.
    pub stream_kind: Option<String>,
    /// Language selector, loose string.
    pub lang: Option<String>,
}

/// Handler for `POST /api/task`.
///
/// # Errors
///
/// 401 for a missing or invalid token, 429 when rate-limited. Provider
/// failures never error; they downgrade to fallback content.
pub async fn handle(
    State(state): SharedState,
    headers: HeaderMap,
    body: std::result::Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let bearer = resolve_token(&headers, req.token.as_deref())
        .ok_or_else(|| AppError::Unauthorized("token_missing".into()))?;

    let opts = GenerateOptions {
        mode: Mode::from_loose(req.mode.as_deref().unwrap_or_default()),
        task_type: TaskType::from_loose(req.task_type.as_deref().unwrap_or_default()),
        stream_kind: StreamKind::from_loose(req.stream_kind.as_deref().unwrap_or_default()),
        lang: Lang::from_loose(req.lang.as_deref().unwrap_or_default()),
    };

    if req.kind.as_deref() == Some("ping") {
        let outcome = state.generator.ping(&bearer).await?;
        return Ok(Json(json!({
            "ok": true,
            "name": outcome.name,
            "recent": outcome.recent,
            "mode": opts.mode,
            "taskType": opts.task_type,
            "streamKind": opts.stream_kind,
            "lang": opts.lang,
        })));
    }

    let outcome = state.generator.next(&bearer, opts).await?;
    Ok(Json(json!({
        "ok": true,
        "task": outcome.line,
        "mode": opts.mode,
        "taskType": opts.task_type,
        "streamKind": opts.stream_kind,
        "lang": opts.lang,
        "via": outcome.via,
    })))
}
