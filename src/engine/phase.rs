//! Phase, settings and running-state structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named stage of the training routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Warmup,
    Work,
    Rest,
    Cooldown,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Warmup => "warmup",
            Phase::Work => "work",
            Phase::Rest => "rest",
            Phase::Cooldown => "cooldown",
            Phase::Done => "done",
        }
    }

    /// Whether `interval_index` carries meaning in this phase
    pub fn is_interval(&self) -> bool {
        matches!(self, Phase::Work | Phase::Rest)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routine configuration, immutable for the lifetime of a session.
///
/// This is also the persisted JSON shape. Every field falls back to its
/// default when missing so older files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub warmup_sec: u32,
    pub work_sec: u32,
    pub rest_sec: u32,
    /// Number of work/rest cycles
    pub intervals: u32,
    pub cooldown_sec: u32,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Settings {
    /// Create settings with the given durations and cues enabled
    pub fn new(
        warmup_sec: u32,
        work_sec: u32,
        rest_sec: u32,
        intervals: u32,
        cooldown_sec: u32,
    ) -> Self {
        Self {
            warmup_sec,
            work_sec,
            rest_sec,
            intervals,
            cooldown_sec,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }

    /// Whether any work/rest cycle takes place at all
    pub fn has_work_stage(&self) -> bool {
        self.intervals > 0 && self.work_sec > 0
    }

    /// Configured length of a phase in seconds
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Warmup => self.warmup_sec,
            Phase::Work => self.work_sec,
            Phase::Rest => self.rest_sec,
            Phase::Cooldown => self.cooldown_sec,
            Phase::Idle | Phase::Done => 0,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(60, 30, 15, 8, 60)
    }
}

/// Snapshot of the phase currently being timed.
///
/// Timestamps are absolute wall-clock milliseconds. `target_end_ms` is the
/// single source of truth for how much time is left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningState {
    pub phase: Phase,
    /// Zero-based work/rest cycle; always 0 outside work and rest
    pub interval_index: u32,
    /// Seconds this segment runs for; rebased to the frozen remainder on resume
    pub total_for_phase: u32,
    /// Full length of the phase as entered, used for progress reporting
    pub phase_length: u32,
    pub started_at_ms: i64,
    pub target_end_ms: i64,
}

impl RunningState {
    /// Enter `phase` at `now_ms`, anchoring the end time from its duration
    pub fn enter(phase: Phase, interval_index: u32, duration_sec: u32, now_ms: i64) -> Self {
        Self {
            phase,
            interval_index: if phase.is_interval() { interval_index } else { 0 },
            total_for_phase: duration_sec,
            phase_length: duration_sec,
            started_at_ms: now_ms,
            target_end_ms: now_ms + i64::from(duration_sec) * 1000,
        }
    }

    /// Whole seconds left at `now_ms`, rounded up and never negative
    pub fn remaining_at(&self, now_ms: i64) -> u32 {
        let left_ms = self.target_end_ms - now_ms;
        if left_ms <= 0 {
            return 0;
        }
        // ceil for positive values
        let secs = (left_ms + 999) / 1000;
        u32::try_from(secs).unwrap_or(u32::MAX)
    }

    /// Rebase the segment so it starts at `now_ms` with `remaining` seconds left
    pub fn reanchor(&mut self, remaining: u32, now_ms: i64) {
        self.started_at_ms = now_ms;
        self.target_end_ms = now_ms + i64::from(remaining) * 1000;
        self.total_for_phase = remaining;
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
}
