//! HTTP surface: token issuing/verification, task generation, event
//! publication, overlay settings, and the SSE subscription stream.
//!
//! Every failure crossing this boundary is converted into a small
//! `{ ok: false, error: <tag> }` body with a coarse status code; internal
//! error detail stays in the logs.

pub mod events;
pub mod settings;
pub mod stream;
pub mod task;
pub mod token;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bus::EventBus;
use crate::generator::TaskGenerator;
use crate::store::Store;
use crate::token::TokenCodec;
use crate::{AppError, GlobalConfig, Result};

/// Shared application state accessible by all handlers.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Capability token codec.
    pub codec: Arc<TokenCodec>,
    /// Shared keyed store.
    pub store: Arc<dyn Store>,
    /// Event bus.
    pub bus: Arc<EventBus>,
    /// Task generation pipeline.
    pub generator: Arc<TaskGenerator>,
}

/// Build the application router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/token", post(token::issue))
        .route("/api/overlay/verify", get(token::verify))
        .route("/api/task", post(task::handle))
        .route("/api/events", post(events::publish))
        .route("/api/events/toggle", post(events::toggle))
        .route("/api/events/stream", get(stream::subscribe))
        .route("/api/state", get(settings::fetch).post(settings::update))
        .with_state(state)
}

/// Serve the HTTP API until the cancellation token fires.
///
/// # Errors
///
/// Returns `AppError::Config` if the listener cannot bind or the server
/// errors out.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let bind = SocketAddr::from(([127, 0, 0, 1], state.config.http_port));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind on {bind}: {err}")))?;

    info!(%bind, "starting overlay HTTP transport");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Config(format!("http server error: {err}")))?;

    info!("overlay HTTP transport shut down");
    Ok(())
}

/// Handler for `GET /health` — 200 OK with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

/// Extract a bearer token from the `Authorization` header.
///
/// Returns `None` when the header is absent, unparseable, or empty after
/// the scheme. Scheme matching is case-insensitive.
#[must_use]
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, rest) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

/// Resolve the request token: `Authorization` header wins over the body
/// field.
#[must_use]
pub fn resolve_token(headers: &HeaderMap, body_token: Option<&str>) -> Option<String> {
    bearer_from_headers(headers).or_else(|| {
        body_token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
    })
}

fn status_and_tag(err: &AppError) -> (StatusCode, String) {
    match err {
        AppError::Unauthorized(msg) if msg.as_str() == "token_missing" => {
            (StatusCode::UNAUTHORIZED, "token_missing".into())
        }
        AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "invalid_token".into()),
        AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited".into()),
        AppError::BadRequest(tag) => (StatusCode::BAD_REQUEST, tag.clone()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "server_error".into()),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, tag) = status_and_tag(&self);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(err = %self, "request failed");
        }
        (status, Json(json!({ "ok": false, "error": tag }))).into_response()
    }
}

/// State alias used by all handlers.
pub type SharedState = State<Arc<AppState>>;
