//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{RunningState, Settings},
    state::DisplayFrame,
};

/// API response structure for session control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub frame: DisplayFrame,
}

impl ControlResponse {
    /// Create a new control response
    pub fn new(status: String, message: String, frame: DisplayFrame) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            frame,
        }
    }

    /// Response for a session that is counting down
    pub fn running(message: String, frame: DisplayFrame) -> Self {
        Self::new("running".to_string(), message, frame)
    }

    /// Response for a paused session
    pub fn paused(message: String, frame: DisplayFrame) -> Self {
        Self::new("paused".to_string(), message, frame)
    }

    /// Response for a session that was discarded or has finished
    pub fn stopped(message: String, frame: DisplayFrame) -> Self {
        Self::new("stopped".to_string(), message, frame)
    }

    /// Pick the status from the frame itself
    pub fn from_frame(message: String, frame: DisplayFrame) -> Self {
        if frame.paused {
            Self::paused(message, frame)
        } else if frame.is_ticking() {
            Self::running(message, frame)
        } else {
            Self::stopped(message, frame)
        }
    }
}

/// Status response with session and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub frame: DisplayFrame,
    pub running: Option<RunningState>,
    /// Settings the current session was started with
    pub session_settings: Settings,
    pub total_duration_seconds: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
