//! Server-sent event stream of session state changes.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::error::EngineError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/session/{id}/events", get(session_events))
}

/// Bridge the session's broadcast channel onto SSE. Lagged receivers
/// silently skip dropped events.
async fn session_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, EngineError> {
    let rx = state.engine.subscribe(&id)?;

    let stream = BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(event) => {
                let data = serde_json::to_string(&event).unwrap_or_default();
                Some(Ok::<_, Infallible>(Event::default().data(data)))
            }
            Err(_) => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
