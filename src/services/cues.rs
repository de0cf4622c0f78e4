//! Audio and haptic cues for phase transitions

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::Phase;

/// Tone played when a phase begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Warmup,
    Work,
    Rest,
    Cooldown,
    Done,
}

impl Tone {
    pub fn name(&self) -> &'static str {
        match self {
            Tone::Warmup => "warmup",
            Tone::Work => "work",
            Tone::Rest => "rest",
            Tone::Cooldown => "cooldown",
            Tone::Done => "done",
        }
    }
}

/// Cue emitted when a phase starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    pub phase: Phase,
    pub interval_index: u32,
    pub tone: Tone,
    /// Alternating on/off durations in milliseconds; empty when vibration is off
    pub vibration_ms: Vec<u64>,
}

impl Cue {
    /// Pick the cue for a phase; idle has none
    pub fn for_phase(phase: Phase, interval_index: u32) -> Option<Self> {
        let (tone, vibration_ms) = match phase {
            Phase::Idle => return None,
            Phase::Warmup => (Tone::Warmup, vec![150]),
            Phase::Work => (Tone::Work, vec![200, 100, 200]),
            Phase::Rest => (Tone::Rest, vec![300]),
            Phase::Cooldown => (Tone::Cooldown, vec![300, 100, 300]),
            Phase::Done => (Tone::Done, vec![500, 200, 500]),
        };

        Some(Self {
            phase,
            interval_index,
            tone,
            vibration_ms,
        })
    }

    /// Drop the haptic part of the cue
    pub fn without_vibration(mut self) -> Self {
        self.vibration_ms.clear();
        self
    }
}

/// Play a tone through an external command, passing the tone name as argument
pub async fn play_tone(command: &str, tone: Tone) -> Result<(), String> {
    debug!("Playing {} tone with {}", tone.name(), command);

    let output = Command::new(command)
        .arg(tone.name())
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", command, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", command, stderr.trim()));
    }

    info!("Played {} tone", tone.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_active_phase_has_a_cue() {
        for phase in [Phase::Warmup, Phase::Work, Phase::Rest, Phase::Cooldown, Phase::Done] {
            let cue = Cue::for_phase(phase, 0).unwrap();
            assert_eq!(cue.tone.name(), phase.as_str());
            assert!(!cue.vibration_ms.is_empty());
        }
        assert!(Cue::for_phase(Phase::Idle, 0).is_none());
    }

    #[test]
    fn vibration_can_be_removed() {
        let cue = Cue::for_phase(Phase::Work, 2).unwrap().without_vibration();
        assert!(cue.vibration_ms.is_empty());
        assert_eq!(cue.interval_index, 2);
    }

    #[tokio::test]
    async fn missing_player_is_an_error() {
        let result = play_tone("/nonexistent/interval-timer-player", Tone::Work).await;
        assert!(result.is_err());
    }
}
