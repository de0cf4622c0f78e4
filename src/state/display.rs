//! Display feed structure

use serde::{Deserialize, Serialize};

use crate::engine::Phase;

/// Read-only view of the session published on every wake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFrame {
    pub phase: Phase,
    pub remaining_seconds: u32,
    /// 0.0 at phase entry, 1.0 when the phase expires
    pub progress_fraction: f64,
    pub interval_index: u32,
    pub intervals_total: u32,
    pub paused: bool,
    pub session_remaining_seconds: u64,
}

impl DisplayFrame {
    /// Frame shown when no session exists
    pub fn idle(intervals_total: u32) -> Self {
        Self {
            phase: Phase::Idle,
            remaining_seconds: 0,
            progress_fraction: 0.0,
            interval_index: 0,
            intervals_total,
            paused: false,
            session_remaining_seconds: 0,
        }
    }

    /// Whether the polling loop has anything to watch
    pub fn is_ticking(&self) -> bool {
        !self.paused && !matches!(self.phase, Phase::Idle | Phase::Done)
    }
}

impl Default for DisplayFrame {
    fn default() -> Self {
        Self::idle(0)
    }
}

/// Fraction of `phase_length` already consumed when `remaining` seconds are left
pub fn progress(phase_length: u32, remaining: u32) -> f64 {
    if phase_length == 0 {
        return 1.0;
    }
    let left = remaining.min(phase_length);
    f64::from(phase_length - left) / f64::from(phase_length)
}
