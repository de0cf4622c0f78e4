//! Interval Timer - An interval-training timer daemon
//!
//! This library sequences warm-up, repeated work/rest intervals and cooldown,
//! tracks remaining time against absolute timestamps, and emits cues on
//! phase transitions.

pub mod config;
pub mod engine;
pub mod error;
pub mod settings;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Phase, RunningState, Settings};
pub use error::TimerError;
pub use state::{AppState, SessionController};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
