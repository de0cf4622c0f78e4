//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::{
    engine::{Phase, RunningState, Settings},
    error::TimerError,
    services::Cue,
    settings::SettingsStore,
};

use super::{Clock, DisplayFrame, SessionController, Transition};

/// Phase-change notification sent to cue and event listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseNotification {
    pub phase: Phase,
    pub interval_index: u32,
    pub at: DateTime<Utc>,
}

/// Main application state that owns the session and its notification channels
#[derive(Debug)]
pub struct AppState {
    /// The one and only timer session
    pub session: Arc<Mutex<SessionController>>,
    /// Persisted settings used for the next start
    pub settings: SettingsStore,
    pub clock: Arc<dyn Clock>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for phase-change notifications
    pub phase_tx: broadcast::Sender<PhaseNotification>,
    /// Channel for cues fired by the cue dispatcher
    pub cue_tx: broadcast::Sender<Cue>,
    /// Channel for display frames
    pub frame_tx: watch::Sender<DisplayFrame>,
    /// Keep the receiver alive to prevent channel closure
    pub _frame_rx: watch::Receiver<DisplayFrame>,
}

impl AppState {
    /// Create a new AppState with no running session
    pub fn new(port: u16, host: String, settings: SettingsStore, clock: Arc<dyn Clock>) -> Self {
        let (phase_tx, _) = broadcast::channel(100);
        let (cue_tx, _) = broadcast::channel(100);
        let session = SessionController::with_settings(settings.get());
        let (frame_tx, frame_rx) = watch::channel(session.frame(clock.now_ms()));

        Self {
            session: Arc::new(Mutex::new(session)),
            settings,
            clock,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            phase_tx,
            cue_tx,
            frame_tx,
            _frame_rx: frame_rx,
        }
    }

    /// Run an operation against the session, then publish the resulting frame
    /// and notify the returned transition, if any.
    ///
    /// Publishing happens before the session lock is released so listeners
    /// observe frames and phase changes in the order the session went
    /// through them.
    pub fn with_session<F>(&self, action: Option<&str>, op: F) -> Result<DisplayFrame, TimerError>
    where
        F: FnOnce(&mut SessionController, i64) -> Result<Option<Transition>, TimerError>,
    {
        let now = self.clock.now_ms();
        let mut session = self.session.lock()
            .map_err(|e| TimerError::Lock(e.to_string()))?;

        let transition = op(&mut *session, now)?;
        let frame = session.frame(now);

        if let Some(action) = action {
            self.record_action(action);
        }
        self.publish_frame(frame.clone());
        if let Some(transition) = transition {
            self.notify(&transition);
        }
        drop(session);

        Ok(frame)
    }

    /// Start a new session from the stored settings
    pub fn start(&self) -> Result<DisplayFrame, TimerError> {
        let settings = self.settings.get();
        self.with_session(Some("start"), |session, now| Ok(Some(session.start(settings, now))))
    }

    pub fn pause(&self) -> Result<DisplayFrame, TimerError> {
        self.with_session(Some("pause"), |session, now| session.pause(now).map(|_| None))
    }

    pub fn resume(&self) -> Result<DisplayFrame, TimerError> {
        self.with_session(Some("resume"), |session, now| session.resume(now).map(|_| None))
    }

    /// Discard the session; no notification fires
    pub fn reset(&self) -> Result<DisplayFrame, TimerError> {
        self.with_session(Some("reset"), |session, _| {
            session.reset();
            Ok(None)
        })
    }

    pub fn skip(&self) -> Result<DisplayFrame, TimerError> {
        self.with_session(Some("skip"), |session, now| {
            session.skip(now).map(|t| Some(t).filter(Transition::phase_changed))
        })
    }

    /// Step back one phase; navigating backwards is silent
    pub fn back(&self) -> Result<DisplayFrame, TimerError> {
        self.with_session(Some("back"), |session, now| {
            let transition = session.back(now)?;
            debug!("Back navigation to {} without notification", transition.to);
            Ok(None)
        })
    }

    /// Observe the clock once, firing at most one transition
    pub fn poll(&self) -> Result<DisplayFrame, TimerError> {
        self.with_session(None, |session, now| {
            Ok(session.poll(now).filter(Transition::phase_changed))
        })
    }

    /// Milliseconds until the current phase expires, if the clock is running
    pub fn millis_until_expiry(&self) -> Result<Option<i64>, TimerError> {
        let now = self.clock.now_ms();
        let session = self.session.lock()
            .map_err(|e| TimerError::Lock(e.to_string()))?;
        if session.is_paused() {
            return Ok(None);
        }
        Ok(session
            .running()
            .filter(|running| !running.is_done())
            .map(|running| running.target_end_ms - now))
    }

    /// Get the current display frame
    pub fn get_frame(&self) -> Result<DisplayFrame, TimerError> {
        let now = self.clock.now_ms();
        self.session.lock()
            .map(|session| session.frame(now))
            .map_err(|e| TimerError::Lock(e.to_string()))
    }

    /// Get the running phase and the settings the session was started with
    pub fn get_session(&self) -> Result<(Option<RunningState>, Settings), TimerError> {
        self.session.lock()
            .map(|session| (session.running().cloned(), session.settings().clone()))
            .map_err(|e| TimerError::Lock(e.to_string()))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish_frame(&self, frame: DisplayFrame) {
        if let Err(e) = self.frame_tx.send(frame) {
            warn!("Failed to send display frame: {}", e);
        }
    }

    fn notify(&self, transition: &Transition) {
        info!("Phase changed to {}", transition.to);
        let notification = PhaseNotification {
            phase: transition.to,
            interval_index: transition.interval_index,
            at: Utc::now(),
        };
        // No subscribers is fine; notifications are fire-and-forget
        if self.phase_tx.send(notification).is_err() {
            debug!("No phase listeners for {}", transition.to);
        }
    }
}
