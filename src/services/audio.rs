//! Audio collaborator contract

use thiserror::Error;

/// Errors raised when the audio collaborator rejects a request
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No audio track is configured")]
    Unavailable,

    #[error("Failed to start player: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Player '{0}' is not available")]
    PlayerMissing(String),

    #[error("Player state lock poisoned")]
    LockPoisoned,
}

/// The capability to play and pause a looping track.
///
/// Both calls return as soon as the request is issued. Whether playback
/// actually started or stopped is reported later through `PlaybackEvent`
/// notifications.
pub trait AudioPlayer: Send + Sync {
    fn play(&self) -> Result<(), AudioError>;
    fn pause(&self) -> Result<(), AudioError>;
}

/// Player used when no track is configured; every play request is rejected
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPlayer;

impl AudioPlayer for NullPlayer {
    fn play(&self) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }

    fn pause(&self) -> Result<(), AudioError> {
        Ok(())
    }
}
