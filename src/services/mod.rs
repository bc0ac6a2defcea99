//! External collaborator module
//!
//! This module contains the audio playback collaborator and its
//! process-backed implementation.

pub mod audio;
pub mod process_player;

// Re-export main types
pub use audio::{AudioError, AudioPlayer, NullPlayer};
pub use process_player::{check_player_available, PlayerConfig, ProcessPlayer};
