//! Session controller: wraps the phase engine with wall-clock anchoring
//!
//! The controller owns at most one `RunningState`. Every operation takes the
//! current wall-clock time in milliseconds and derives remaining time from
//! the target end timestamp, so missed or late wakes never accumulate error.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    engine::{self, Phase, RunningState, Settings},
    error::TimerError,
};

use super::display::{progress, DisplayFrame};

/// Result of replacing the running phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub interval_index: u32,
}

impl Transition {
    fn between(from: Phase, to: &RunningState) -> Self {
        Self {
            from,
            to: to.phase,
            interval_index: to.interval_index,
        }
    }

    /// Whether the phase tag differs, which is what listeners get notified about
    pub fn phase_changed(&self) -> bool {
        self.from != self.to
    }
}

/// Single-session timer controller
#[derive(Debug, Default)]
pub struct SessionController {
    /// Settings snapshot taken at `start`
    settings: Settings,
    running: Option<RunningState>,
    /// Seconds left, frozen while paused
    paused_remaining: Option<u32>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller whose idle state already reflects `settings`
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn running(&self) -> Option<&RunningState> {
        self.running.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_paused(&self) -> bool {
        self.paused_remaining.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.running.as_ref().map_or(Phase::Idle, |r| r.phase)
    }

    /// Start a new session, replacing any existing one
    pub fn start(&mut self, settings: Settings, now_ms: i64) -> Transition {
        if self.running.is_some() {
            debug!("Replacing session that was in phase {}", self.phase());
        }
        let initial = engine::compute_initial(&settings, now_ms);
        info!(
            "Starting session: phase={}, total={}s",
            initial.phase,
            engine::total_duration(&settings)
        );

        // Starting always notifies, even when replacing a session in the same phase
        let transition = Transition::between(Phase::Idle, &initial);

        self.settings = settings;
        self.running = Some(initial);
        self.paused_remaining = None;
        transition
    }

    /// Freeze the remaining time; returns the frozen seconds
    pub fn pause(&mut self, now_ms: i64) -> Result<u32, TimerError> {
        let running = self.running.as_ref().ok_or(TimerError::NoSession)?;
        if running.is_done() {
            return Err(TimerError::Finished);
        }
        if self.paused_remaining.is_some() {
            return Err(TimerError::AlreadyPaused);
        }

        let remaining = running.remaining_at(now_ms);
        info!("Pausing {} with {}s remaining", running.phase, remaining);
        self.paused_remaining = Some(remaining);
        Ok(remaining)
    }

    /// Re-anchor the current phase so the frozen remainder starts counting now
    pub fn resume(&mut self, now_ms: i64) -> Result<(), TimerError> {
        let running = self.running.as_mut().ok_or(TimerError::NoSession)?;
        let remaining = self.paused_remaining.take().ok_or(TimerError::NotPaused)?;

        running.reanchor(remaining, now_ms);
        info!("Resuming {} with {}s remaining", running.phase, remaining);
        Ok(())
    }

    /// Discard the session; returns whether one existed
    pub fn reset(&mut self) -> bool {
        self.paused_remaining = None;
        let existed = self.running.take().is_some();
        if existed {
            info!("Session reset");
        }
        existed
    }

    /// Move to the next phase immediately, same as natural expiry
    pub fn skip(&mut self, now_ms: i64) -> Result<Transition, TimerError> {
        let running = self.running.as_ref().ok_or(TimerError::NoSession)?;
        if running.is_done() {
            return Err(TimerError::Finished);
        }
        let next = engine::compute_next(running, &self.settings, now_ms);
        Ok(self.replace(next))
    }

    /// Move to the reconstructed previous phase
    pub fn back(&mut self, now_ms: i64) -> Result<Transition, TimerError> {
        let running = self.running.as_ref().ok_or(TimerError::NoSession)?;
        let previous = engine::compute_previous(running, &self.settings, now_ms);
        Ok(self.replace(previous))
    }

    /// Observe the clock once.
    ///
    /// Fires at most one transition per call no matter how late the wake is;
    /// the new phase is anchored at `now_ms`.
    pub fn poll(&mut self, now_ms: i64) -> Option<Transition> {
        if self.paused_remaining.is_some() {
            return None;
        }
        let running = self.running.as_ref()?;
        if running.is_done() {
            return None;
        }

        let remaining = running.remaining_at(now_ms);
        if remaining > 0 {
            return None;
        }

        let overshoot_ms = now_ms - running.target_end_ms;
        if overshoot_ms > 1000 {
            debug!("Phase {} expired {}ms late", running.phase, overshoot_ms);
        }
        let next = engine::compute_next(running, &self.settings, now_ms);
        Some(self.replace(next))
    }

    /// Seconds left in the current phase
    pub fn remaining(&self, now_ms: i64) -> Option<u32> {
        let running = self.running.as_ref()?;
        Some(self.paused_remaining.unwrap_or_else(|| running.remaining_at(now_ms)))
    }

    /// Snapshot for the display feed
    pub fn frame(&self, now_ms: i64) -> DisplayFrame {
        let Some(running) = self.running.as_ref() else {
            return DisplayFrame::idle(self.settings.intervals);
        };

        let live = running.remaining_at(now_ms);
        let remaining = self.paused_remaining.unwrap_or(live);
        let session_remaining = engine::remaining_session(running, &self.settings, now_ms)
            .saturating_sub(u64::from(live))
            + u64::from(remaining);

        DisplayFrame {
            phase: running.phase,
            remaining_seconds: remaining,
            progress_fraction: progress(running.phase_length, remaining),
            interval_index: running.interval_index,
            intervals_total: self.settings.intervals,
            paused: self.is_paused(),
            session_remaining_seconds: session_remaining,
        }
    }

    fn replace(&mut self, next: RunningState) -> Transition {
        let from = self.phase();
        let transition = Transition::between(from, &next);
        info!(
            "Phase {} -> {} (interval {}, {}s)",
            from, next.phase, next.interval_index, next.total_for_phase
        );

        // Navigating while paused keeps the session paused on the new phase
        self.paused_remaining = match self.paused_remaining {
            Some(_) if !next.is_done() => Some(next.total_for_phase),
            _ => None,
        };
        self.running = Some(next);
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hiit() -> Settings {
        Settings::new(0, 30, 10, 3, 0)
    }

    #[test]
    fn start_enters_first_phase_and_notifies() {
        let mut session = SessionController::new();
        let transition = session.start(Settings::new(60, 40, 0, 2, 30), 0);
        assert_eq!(transition.to, Phase::Warmup);
        assert!(transition.phase_changed());
        assert_eq!(session.remaining(0), Some(60));
    }

    #[test]
    fn idle_frame_reflects_seeded_settings() {
        let session = SessionController::with_settings(Settings::new(0, 30, 10, 5, 0));
        let frame = session.frame(0);
        assert_eq!(frame.phase, Phase::Idle);
        assert_eq!(frame.intervals_total, 5);
        assert_eq!(session.settings().intervals, 5);
    }

    #[test]
    fn start_with_empty_settings_is_done() {
        let mut session = SessionController::new();
        let transition = session.start(Settings::new(0, 0, 0, 0, 0), 0);
        assert_eq!(transition.to, Phase::Done);
        assert_eq!(session.pause(0), Err(TimerError::Finished));
        assert_eq!(session.poll(10_000), None);
    }

    #[test]
    fn poll_before_expiry_does_nothing() {
        let mut session = SessionController::new();
        session.start(hiit(), 0);
        assert_eq!(session.poll(29_000), None);
        assert_eq!(session.remaining(29_000), Some(1));
        assert_eq!(session.phase(), Phase::Work);
    }

    #[test]
    fn poll_after_expiry_fires_single_transition() {
        let mut session = SessionController::new();
        session.start(hiit(), 0);

        // a wake that arrives two minutes late still only moves one phase
        let transition = session.poll(120_000).unwrap();
        assert_eq!(transition.from, Phase::Work);
        assert_eq!(transition.to, Phase::Rest);
        assert_eq!(session.remaining(120_000), Some(10));
        assert_eq!(session.poll(120_001), None);
    }

    #[test]
    fn natural_expiry_walks_whole_routine() {
        let mut session = SessionController::new();
        session.start(hiit(), 0);
        let mut now = 0;
        let mut phases = vec![(session.phase(), 0)];
        while session.phase() != Phase::Done {
            now += 250;
            if let Some(t) = session.poll(now) {
                phases.push((t.to, t.interval_index));
            }
        }
        assert_eq!(
            phases,
            vec![
                (Phase::Work, 0),
                (Phase::Rest, 0),
                (Phase::Work, 1),
                (Phase::Rest, 1),
                (Phase::Work, 2),
                (Phase::Rest, 2),
                (Phase::Done, 0),
            ]
        );
        assert_eq!(now, 120_000);
    }

    #[test]
    fn pause_then_immediate_resume_keeps_remaining() {
        let mut session = SessionController::new();
        session.start(hiit(), 0);
        assert_eq!(session.pause(12_300).unwrap(), 18);
        session.resume(12_300).unwrap();
        assert_eq!(session.remaining(12_300), Some(18));
    }

    #[test]
    fn paused_time_does_not_count() {
        let mut session = SessionController::new();
        session.start(hiit(), 0);
        session.pause(10_000).unwrap();

        // polls during the pause never advance
        assert_eq!(session.poll(100_000), None);
        assert_eq!(session.remaining(100_000), Some(20));

        session.resume(200_000).unwrap();
        let running = session.running().unwrap();
        assert_eq!(running.total_for_phase, 20);
        assert_eq!(running.target_end_ms - running.started_at_ms, 20_000);

        // a real delay of 5s reduces remaining by 5 regardless of poll count
        assert_eq!(session.remaining(205_000), Some(15));
        assert_eq!(session.poll(219_999), None);
        assert_eq!(session.poll(220_000).unwrap().to, Phase::Rest);
    }

    #[test]
    fn pause_and_resume_guard_state() {
        let mut session = SessionController::new();
        assert_eq!(session.pause(0), Err(TimerError::NoSession));
        assert_eq!(session.resume(0), Err(TimerError::NoSession));

        session.start(hiit(), 0);
        assert_eq!(session.resume(0), Err(TimerError::NotPaused));
        session.pause(0).unwrap();
        assert_eq!(session.pause(0), Err(TimerError::AlreadyPaused));
    }

    #[test]
    fn reset_discards_session() {
        let mut session = SessionController::new();
        assert!(!session.reset());
        session.start(hiit(), 0);
        session.pause(1_000).unwrap();
        assert!(session.reset());
        assert!(session.running().is_none());
        assert!(!session.is_paused());
        assert_eq!(session.frame(0).phase, Phase::Idle);
    }

    #[test]
    fn skip_matches_natural_expiry() {
        let mut skipped = SessionController::new();
        skipped.start(hiit(), 0);
        let by_skip = skipped.skip(5_000).unwrap();

        let mut expired = SessionController::new();
        expired.start(hiit(), 0);
        let by_expiry = expired.poll(30_000).unwrap();

        assert_eq!(by_skip, by_expiry);
        assert_eq!(skipped.remaining(5_000), Some(10));
    }

    #[test]
    fn skip_past_done_is_rejected() {
        let mut session = SessionController::new();
        session.start(Settings::new(0, 0, 0, 0, 10), 0);
        assert_eq!(session.skip(0).unwrap().to, Phase::Done);
        assert_eq!(session.skip(0), Err(TimerError::Finished));
    }

    #[test]
    fn skip_while_paused_stays_paused() {
        let mut session = SessionController::new();
        session.start(hiit(), 0);
        session.pause(3_000).unwrap();
        let transition = session.skip(4_000).unwrap();
        assert_eq!(transition.to, Phase::Rest);
        assert!(session.is_paused());
        assert_eq!(session.remaining(50_000), Some(10));
    }

    #[test]
    fn back_uses_predecessor_heuristic() {
        let mut session = SessionController::new();
        session.start(Settings::new(0, 30, 10, 4, 0), 0);
        let mut now = 0;
        for _ in 0..4 {
            now += 1_000;
            session.skip(now).unwrap();
        }
        let running = session.running().unwrap();
        assert_eq!((running.phase, running.interval_index), (Phase::Work, 2));

        let transition = session.back(now).unwrap();
        assert_eq!((transition.to, transition.interval_index), (Phase::Rest, 1));
        assert_eq!(session.back(now).unwrap().to, Phase::Work);
    }

    #[test]
    fn back_from_done_restarts_routine() {
        let mut session = SessionController::new();
        session.start(hiit(), 0);
        for i in 1..=6 {
            session.skip(i).unwrap();
        }
        assert_eq!(session.phase(), Phase::Done);
        let transition = session.back(10).unwrap();
        assert_eq!((transition.to, transition.interval_index), (Phase::Work, 0));
    }

    #[test]
    fn same_phase_transition_is_not_a_change() {
        let mut session = SessionController::new();
        session.start(Settings::new(0, 40, 0, 2, 0), 0);
        let transition = session.skip(1_000).unwrap();
        assert_eq!((transition.to, transition.interval_index), (Phase::Work, 1));
        assert!(!transition.phase_changed());
    }

    #[test]
    fn frame_reports_progress_and_session_remaining() {
        let mut session = SessionController::new();
        session.start(Settings::new(0, 40, 20, 2, 0), 0);

        let frame = session.frame(10_000);
        assert_eq!(frame.phase, Phase::Work);
        assert_eq!(frame.remaining_seconds, 30);
        assert_eq!(frame.progress_fraction, 0.25);
        assert_eq!(frame.intervals_total, 2);
        assert_eq!(frame.session_remaining_seconds, 30 + 20 + 40 + 20);
        assert!(frame.is_ticking());

        session.pause(10_000).unwrap();
        let frame = session.frame(90_000);
        assert!(frame.paused);
        assert_eq!(frame.remaining_seconds, 30);
        assert_eq!(frame.session_remaining_seconds, 110);
        assert!(!frame.is_ticking());

        // progress stays relative to the full phase after resuming
        session.resume(90_000).unwrap();
        assert_eq!(session.frame(90_000).progress_fraction, 0.25);
    }
}
