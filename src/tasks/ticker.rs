//! Session polling loop
//!
//! The loop sleeps until the next wake opportunity and then recomputes the
//! remaining time from the target end timestamp. A late wake simply observes
//! that the phase has expired; no tick is ever counted.

use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that drives phase expiry while a session is running
pub async fn ticker_task(state: Arc<AppState>, tick: Duration) {
    info!("Starting session ticker with {}ms granularity", tick.as_millis());

    let mut frame_rx = state.frame_tx.subscribe();

    loop {
        let ticking = frame_rx.borrow_and_update().is_ticking();
        if !ticking {
            // Nothing to watch until a control operation publishes a new frame
            if frame_rx.changed().await.is_err() {
                break;
            }
            continue;
        }

        let wait = match state.millis_until_expiry() {
            Ok(until_expiry) => next_wake(until_expiry, tick),
            Err(e) => {
                error!("Failed to read session: {}", e);
                tick
            }
        };

        tokio::select! {
            _ = sleep(wait) => {
                match state.poll() {
                    Ok(frame) => debug!(
                        "Tick: phase={}, remaining={}s",
                        frame.phase, frame.remaining_seconds
                    ),
                    Err(e) => error!("Failed to poll session: {}", e),
                }
            }

            // A control operation changed the session; re-evaluate right away
            changed = frame_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Session ticker stopped");
}

/// Sleep until whichever comes first: the next display tick or phase expiry
pub fn next_wake(until_expiry_ms: Option<i64>, tick: Duration) -> Duration {
    match until_expiry_ms {
        Some(ms) if ms <= 0 => Duration::ZERO,
        Some(ms) => tick.min(Duration::from_millis(ms.unsigned_abs())),
        None => tick,
    }
}
