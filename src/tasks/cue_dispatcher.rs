//! Cue dispatcher background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::{
    services::{play_tone, Cue},
    state::AppState,
};

/// Background task that turns phase notifications into audio and haptic cues.
///
/// Playback runs on its own task so a slow or failing player never holds up
/// the session.
pub async fn cue_dispatcher_task(state: Arc<AppState>, cue_command: Option<String>) {
    info!("Starting cue dispatcher");

    let mut phase_rx = state.phase_tx.subscribe();

    loop {
        match phase_rx.recv().await {
            Ok(notification) => {
                let Some(cue) = Cue::for_phase(notification.phase, notification.interval_index)
                else {
                    continue;
                };

                let preferences = state.settings.get();
                let cue = if preferences.vibration_enabled {
                    cue
                } else {
                    cue.without_vibration()
                };

                if preferences.sound_enabled {
                    if let Some(command) = cue_command.clone() {
                        let tone = cue.tone;
                        tokio::spawn(async move {
                            if let Err(e) = play_tone(&command, tone).await {
                                warn!("Cue playback failed: {}", e);
                            }
                        });
                    }
                }

                debug!("Dispatching {} cue", cue.tone.name());
                if state.cue_tx.send(cue).is_err() {
                    debug!("No cue listeners connected");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Cue dispatcher lagged, skipped {} notifications", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    info!("Cue dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{Phase, Settings},
        settings::SettingsStore,
        state::ManualClock,
    };
    use std::time::Duration;
    use tempfile::TempDir;

    async fn state_with(settings: Settings) -> (Arc<AppState>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(dir.path());
        store.save(&settings).1.await.unwrap();
        let state = AppState::new(0, "127.0.0.1".to_string(), store, Arc::new(ManualClock::new(0)));
        (Arc::new(state), dir)
    }

    #[tokio::test]
    async fn phase_change_produces_cue() {
        let (state, _dir) = state_with(Settings::new(0, 30, 10, 3, 0)).await;
        let mut cue_rx = state.cue_tx.subscribe();
        let dispatcher = tokio::spawn(cue_dispatcher_task(Arc::clone(&state), None));
        while state.phase_tx.receiver_count() == 0 {
            tokio::task::yield_now().await;
        }

        state.start().unwrap();
        let cue = tokio::time::timeout(Duration::from_secs(2), cue_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cue.phase, Phase::Work);
        assert_eq!(cue.vibration_ms, vec![200, 100, 200]);

        dispatcher.abort();
    }

    #[tokio::test]
    async fn failing_player_does_not_stop_cues() {
        let mut settings = Settings::new(0, 30, 10, 3, 0);
        settings.vibration_enabled = false;
        let (state, _dir) = state_with(settings).await;
        let mut cue_rx = state.cue_tx.subscribe();
        let dispatcher = tokio::spawn(cue_dispatcher_task(
            Arc::clone(&state),
            Some("/nonexistent/interval-timer-player".to_string()),
        ));
        while state.phase_tx.receiver_count() == 0 {
            tokio::task::yield_now().await;
        }

        state.start().unwrap();
        state.skip().unwrap();

        for expected in [Phase::Work, Phase::Rest] {
            let cue = tokio::time::timeout(Duration::from_secs(2), cue_rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(cue.phase, expected);
            assert!(cue.vibration_ms.is_empty());
        }

        dispatcher.abort();
    }
}
