//! Playback state reconciliation
//!
//! Two independent signals move the playing flag: the user's toggle intent,
//! applied immediately, and the audio collaborator's notifications, which
//! arrive later. Whichever was applied last wins.

use serde::{Deserialize, Serialize};

/// Who last changed the playing flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSource {
    /// Initial state after load
    Initial,
    /// Optimistic update from a user toggle
    Intent,
    /// Notification from the audio collaborator
    Notification,
}

/// Notifications emitted by the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Playing,
    Paused,
}

/// Request the controller hands to the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Play,
    Pause,
}

#[derive(Debug, Clone)]
pub struct PlaybackState {
    playing: bool,
    source: PlaybackSource,
}

impl PlaybackState {
    /// Playback never resumes across restarts.
    pub fn new() -> Self {
        Self {
            playing: false,
            source: PlaybackSource::Initial,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn source(&self) -> PlaybackSource {
        self.source
    }

    /// Flip the flag optimistically and return the command that expresses the
    /// user's intent.
    pub fn toggle(&mut self) -> PlaybackCommand {
        let command = if self.playing {
            PlaybackCommand::Pause
        } else {
            PlaybackCommand::Play
        };
        self.set(!self.playing, PlaybackSource::Intent);
        command
    }

    /// Apply a collaborator notification
    pub fn apply(&mut self, event: PlaybackEvent) {
        self.set(event == PlaybackEvent::Playing, PlaybackSource::Notification);
    }

    fn set(&mut self, playing: bool, source: PlaybackSource) {
        self.playing = playing;
        self.source = source;
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}
