//! Streaming research endpoint.
//!
//! POST /api/research
//!
//! Body: `{"question", "profile"?, "sessionId"?}`. Responds with an SSE
//! stream; each event is named after its `type` and carries the event JSON.
//! The stream ends after the first `done` or `error` event. A client that
//! disconnects cancels the session.

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use verification::ResearchRequest;

use crate::server::app::AppState;
use crate::server::error::ApiError;

pub async fn research_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    tracing::info!(profile = %request.profile, "Research session started");

    let cancel = CancellationToken::new();
    let rx = state.research.research(request, cancel.clone());

    // Dropped with the stream when the client goes away.
    let guard = cancel.drop_guard();
    let events = ReceiverStream::new(rx).map(move |event| {
        let _ = &guard;
        let sse = Event::default()
            .event(event.kind.as_str())
            .json_data(&event)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to encode research event");
                Event::default().event("error").data("encoding failed")
            });
        Ok::<_, Infallible>(sse)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
