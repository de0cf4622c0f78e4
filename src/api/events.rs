//! Server-sent event stream of phase changes and cues

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::state::AppState;

/// Handle GET /events - Stream `phase` and `cue` events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Event stream client connected");
    let phases = broadcast_events(state.phase_tx.subscribe(), "phase");
    let cues = broadcast_events(state.cue_tx.subscribe(), "cue");

    Sse::new(stream::select(phases, cues)).keep_alive(KeepAlive::default())
}

/// Turn a broadcast receiver into a stream of named events
fn broadcast_events<T>(
    rx: broadcast::Receiver<T>,
    name: &'static str,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    T: Clone + Serialize + Send + 'static,
{
    stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(item) => {
                    let event = Event::default()
                        .event(name)
                        .json_data(&item)
                        .unwrap_or_else(|e| {
                            warn!("Failed to encode {} event: {}", name, e);
                            Event::default().event(name)
                        });
                    return Some((Ok(event), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, skipped {} {} events", skipped, name);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
