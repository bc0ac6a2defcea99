//! Session errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Target must be a positive integer, got {0}")]
    InvalidTarget(u32),

    #[error("Target '{0}' is not a positive integer")]
    UnparsableTarget(String),

    #[error("Target {0} is not one of the recommended presets")]
    NotAPreset(u32),

    #[error("A target is already selected; change the target first")]
    TargetAlreadySet,

    #[error("{0} requires a target to be selected")]
    TargetNotSet(&'static str),

    #[error("Failed to lock session state: {0}")]
    LockPoisoned(String),
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
