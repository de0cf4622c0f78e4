//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod ticker;
pub mod cue_dispatcher;

// Re-export main functions
pub use ticker::ticker_task;
pub use cue_dispatcher::cue_dispatcher_task;
