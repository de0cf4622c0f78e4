//! Phase engine module
//!
//! Pure functions that sequence a training routine. Nothing in here reads a
//! clock or performs I/O; callers pass the current timestamp in.

pub mod phase;
pub mod transitions;

// Re-export main types
pub use phase::{Phase, RunningState, Settings};
pub use transitions::{
    compute_initial, compute_next, compute_previous, remaining_session, total_duration,
};
