//! External side-effect module
//!
//! This module contains cue selection and playback. Playback is best-effort:
//! callers log failures and carry on.

pub mod cues;

// Re-export main types
pub use cues::{play_tone, Cue, Tone};
