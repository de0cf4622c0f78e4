//! Phase sequencing: initial, next and previous phase computation
//!
//! The pipeline is warmup → (work → rest) × intervals → cooldown → done with
//! every zero-length stage skipped. All functions are total over `Phase`.

use super::phase::{Phase, RunningState, Settings};

/// First phase of a fresh session.
///
/// Returns `Done` with zero duration when every stage is empty.
pub fn compute_initial(settings: &Settings, now_ms: i64) -> RunningState {
    if settings.warmup_sec > 0 {
        RunningState::enter(Phase::Warmup, 0, settings.warmup_sec, now_ms)
    } else if settings.has_work_stage() {
        RunningState::enter(Phase::Work, 0, settings.work_sec, now_ms)
    } else {
        after_intervals(settings, now_ms)
    }
}

/// Successor of `state`, anchored at `now_ms`
pub fn compute_next(state: &RunningState, settings: &Settings, now_ms: i64) -> RunningState {
    let index = state.interval_index;
    match state.phase {
        Phase::Idle => compute_initial(settings, now_ms),
        Phase::Warmup => {
            if settings.has_work_stage() {
                RunningState::enter(Phase::Work, 0, settings.work_sec, now_ms)
            } else {
                after_intervals(settings, now_ms)
            }
        }
        // A rest follows every work interval, including the last one
        Phase::Work if settings.rest_sec > 0 => {
            RunningState::enter(Phase::Rest, index, settings.rest_sec, now_ms)
        }
        Phase::Work | Phase::Rest => {
            if index + 1 < settings.intervals {
                RunningState::enter(Phase::Work, index + 1, settings.work_sec, now_ms)
            } else {
                after_intervals(settings, now_ms)
            }
        }
        Phase::Cooldown | Phase::Done => done(now_ms),
    }
}

/// Plausible predecessor of `state`, anchored at `now_ms`.
///
/// This reconstructs a prior phase from the settings rather than replaying
/// history, so `next` followed by `previous` does not always round-trip.
/// Going back from `Done` restarts the routine instead of restoring the
/// last position.
pub fn compute_previous(state: &RunningState, settings: &Settings, now_ms: i64) -> RunningState {
    let index = state.interval_index;
    match state.phase {
        Phase::Work if index == 0 => {
            if settings.warmup_sec > 0 {
                RunningState::enter(Phase::Warmup, 0, settings.warmup_sec, now_ms)
            } else {
                RunningState::enter(Phase::Work, 0, settings.work_sec, now_ms)
            }
        }
        Phase::Work => {
            if settings.rest_sec > 0 {
                RunningState::enter(Phase::Rest, index - 1, settings.rest_sec, now_ms)
            } else {
                RunningState::enter(Phase::Work, index - 1, settings.work_sec, now_ms)
            }
        }
        Phase::Rest => RunningState::enter(Phase::Work, index, settings.work_sec, now_ms),
        Phase::Cooldown => {
            if settings.has_work_stage() {
                let last = settings.intervals - 1;
                RunningState::enter(Phase::Work, last, settings.work_sec, now_ms)
            } else if settings.warmup_sec > 0 {
                RunningState::enter(Phase::Warmup, 0, settings.warmup_sec, now_ms)
            } else {
                RunningState::enter(Phase::Cooldown, 0, settings.cooldown_sec, now_ms)
            }
        }
        Phase::Warmup | Phase::Done | Phase::Idle => compute_initial(settings, now_ms),
    }
}

/// Planned length of the whole routine in seconds
pub fn total_duration(settings: &Settings) -> u64 {
    let per_interval = u64::from(settings.work_sec) + u64::from(settings.rest_sec);
    u64::from(settings.warmup_sec)
        + u64::from(settings.intervals) * per_interval
        + u64::from(settings.cooldown_sec)
}

/// Seconds left in the whole session: the current phase's remainder plus the
/// full length of every phase still to come
pub fn remaining_session(state: &RunningState, settings: &Settings, now_ms: i64) -> u64 {
    let mut total = u64::from(state.remaining_at(now_ms));
    let mut cursor = state.clone();
    while !cursor.is_done() {
        cursor = compute_next(&cursor, settings, 0);
        total += u64::from(cursor.phase_length);
    }
    total
}

fn after_intervals(settings: &Settings, now_ms: i64) -> RunningState {
    if settings.cooldown_sec > 0 {
        RunningState::enter(Phase::Cooldown, 0, settings.cooldown_sec, now_ms)
    } else {
        done(now_ms)
    }
}

fn done(now_ms: i64) -> RunningState {
    RunningState::enter(Phase::Done, 0, 0, now_ms)
}
