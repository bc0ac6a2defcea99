//! State management module
//!
//! This module contains the counting session state machine and the shared
//! application state that serves it.

pub mod app_state;
pub mod error;
pub mod playback;
pub mod session;
pub mod target;

// Re-export main types
pub use app_state::AppState;
pub use error::SessionError;
pub use playback::{PlaybackCommand, PlaybackEvent, PlaybackSource, PlaybackState};
pub use session::{Mode, SessionController, SessionSnapshot, CHANGE_TARGET_PROMPT};
pub use target::{Target, TargetPreset};
