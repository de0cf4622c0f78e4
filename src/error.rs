//! Error types for session control

use thiserror::Error;

/// Errors returned by session control operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("no session is running")]
    NoSession,
    #[error("session is already paused")]
    AlreadyPaused,
    #[error("session is not paused")]
    NotPaused,
    #[error("session has finished")]
    Finished,
    #[error("failed to lock session state: {0}")]
    Lock(String),
}

impl TimerError {
    /// Whether the error comes from calling an operation in the wrong state,
    /// as opposed to an internal failure
    pub fn is_conflict(&self) -> bool {
        !matches!(self, TimerError::Lock(_))
    }
}
