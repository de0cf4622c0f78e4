//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    engine::{total_duration, Settings},
    error::TimerError,
    settings::SettingsPatch,
    state::{AppState, DisplayFrame},
};
use super::responses::{ControlResponse, HealthResponse, StatusResponse};

type ControlResult = Result<Json<ControlResponse>, StatusCode>;

/// Map a control outcome to a response, logging failures
fn respond(action: &str, message: &str, result: Result<DisplayFrame, TimerError>) -> ControlResult {
    match result {
        Ok(frame) => {
            info!("{} endpoint called - {}", action, message);
            Ok(Json(ControlResponse::from_frame(message.to_string(), frame)))
        }
        Err(e) if e.is_conflict() => {
            warn!("Rejected {}: {}", action, e);
            Err(StatusCode::CONFLICT)
        }
        Err(e) => {
            error!("Failed to {}: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start - Start a new session from the stored settings
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    respond("start", "Session started", state.start())
}

/// Handle POST /pause - Freeze the remaining time
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    respond("pause", "Session paused", state.pause())
}

/// Handle POST /resume - Continue counting from the frozen remainder
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    respond("resume", "Session resumed", state.resume())
}

/// Handle POST /reset - Discard the session
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    respond("reset", "Session reset", state.reset())
}

/// Handle POST /skip - Jump to the next phase
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    respond("skip", "Skipped to next phase", state.skip())
}

/// Handle POST /back - Return to the previous phase
pub async fn back_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    respond("back", "Moved back one phase", state.back())
}

/// Handle GET /status - Return current session status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let frame = match state.get_frame() {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to get display frame: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (running, session_settings) = match state.get_session() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get session: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        frame,
        total_duration_seconds: total_duration(&session_settings),
        running,
        session_settings,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /settings - Return the stored settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(state.settings.get())
}

/// Handle PUT /settings - Merge, clamp and persist settings for the next start
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> Json<Settings> {
    let updated = patch.apply(&state.settings.get());
    let (saved, _write) = state.settings.save(&updated);
    info!("Settings updated: total routine {}s", total_duration(&saved));
    Json(saved)
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
