//! State management module
//!
//! This module contains the session controller, the display feed and the
//! shared application state that ties them to the notification channels.

pub mod app_state;
pub mod clock;
pub mod display;
pub mod session;

// Re-export main types
pub use app_state::{AppState, PhaseNotification};
pub use clock::{Clock, ManualClock, SystemClock};
pub use display::DisplayFrame;
pub use session::{SessionController, Transition};
