//! Editing bounds for settings values

use serde::{Deserialize, Serialize};

use crate::engine::Settings;

pub const MAX_DURATION_SEC: i64 = 3600;
pub const MAX_INTERVALS: i64 = 99;

/// Partial settings update as received from an editor.
///
/// Values are signed so out-of-range input can be clamped instead of
/// rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub warmup_sec: Option<i64>,
    pub work_sec: Option<i64>,
    pub rest_sec: Option<i64>,
    pub intervals: Option<i64>,
    pub cooldown_sec: Option<i64>,
    pub sound_enabled: Option<bool>,
    pub vibration_enabled: Option<bool>,
}

impl SettingsPatch {
    /// Apply the patch on top of `base`, clamping every provided number
    pub fn apply(&self, base: &Settings) -> Settings {
        Settings {
            warmup_sec: self.warmup_sec.map_or(base.warmup_sec, clamp_duration),
            work_sec: self.work_sec.map_or(base.work_sec, clamp_duration),
            rest_sec: self.rest_sec.map_or(base.rest_sec, clamp_duration),
            intervals: self.intervals.map_or(base.intervals, clamp_intervals),
            cooldown_sec: self.cooldown_sec.map_or(base.cooldown_sec, clamp_duration),
            sound_enabled: self.sound_enabled.unwrap_or(base.sound_enabled),
            vibration_enabled: self.vibration_enabled.unwrap_or(base.vibration_enabled),
        }
    }
}

/// Bring already-typed settings within the editing bounds
pub fn clamp(settings: &Settings) -> Settings {
    Settings {
        warmup_sec: clamp_duration(settings.warmup_sec.into()),
        work_sec: clamp_duration(settings.work_sec.into()),
        rest_sec: clamp_duration(settings.rest_sec.into()),
        intervals: clamp_intervals(settings.intervals.into()),
        cooldown_sec: clamp_duration(settings.cooldown_sec.into()),
        ..settings.clone()
    }
}

fn clamp_duration(value: i64) -> u32 {
    clamp_to(value, MAX_DURATION_SEC)
}

fn clamp_intervals(value: i64) -> u32 {
    clamp_to(value, MAX_INTERVALS)
}

fn clamp_to(value: i64, max: i64) -> u32 {
    // max always fits in u32
    value.clamp(0, max) as u32
}
