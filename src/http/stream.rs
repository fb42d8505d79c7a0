//! SSE subscription endpoint: replay, then live events, with keep-alive
//! comment frames.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::bus::channel_for_token;
use crate::models::event::OverlayEvent;
use crate::{AppError, Result};

use super::{bearer_from_headers, SharedState};

/// Query string of `GET /api/events/stream`.
#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    /// Token under its short query name.
    pub t: Option<String>,
    /// Token under its long query name.
    pub token: Option<String>,
}

fn frame(event: &OverlayEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().data(json)),
        Err(err) => {
            warn!(%err, "skipping unserializable event");
            None
        }
    }
}

/// Handler for `GET /api/events/stream` — long-lived push stream of the
/// channel's events.
///
/// On open, the most recent buffered events are replayed in publish order,
/// then live events follow. The stream ends when the client disconnects;
/// dropping it releases the broadcast registration, so churned overlay
/// tabs do not leak listeners.
///
/// # Errors
///
/// `token_missing` (400) when no token is supplied via query or header.
pub async fn subscribe(
    State(state): SharedState,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let token = query
        .t
        .or(query.token)
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_from_headers(&headers))
        .ok_or_else(|| AppError::BadRequest("token_missing".into()))?;

    let channel = channel_for_token(&token);
    let subscription = state.bus.subscribe(&channel).await;
    let subscriber_id = Uuid::new_v4();
    debug!(%channel, %subscriber_id, "overlay subscription opened");

    let stream = async_stream::stream! {
        for event in &subscription.backlog {
            if let Some(frame) = frame(event) {
                yield Ok(frame);
            }
        }
        let mut live = subscription.live;
        loop {
            match live.recv().await {
                Ok(event) => {
                    if let Some(frame) = frame(&event) {
                        yield Ok(frame);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%channel, %subscriber_id, skipped, "subscriber lagged, skipping events");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!(%channel, %subscriber_id, "overlay subscription closed");
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(state.config.keep_alive())
            .text("keep-alive"),
    ))
}
