//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::services::AudioPlayer;
use super::{
    error::{Result, SessionError},
    playback::{PlaybackCommand, PlaybackEvent},
    session::{SessionController, SessionSnapshot},
};

/// Shared state behind the HTTP API: the session, the audio collaborator and
/// server metadata
pub struct AppState {
    /// The single writer of all session values
    session: Mutex<SessionController>,
    player: Arc<dyn AudioPlayer>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Carries a snapshot after every session change
    pub state_change_tx: broadcast::Sender<SessionSnapshot>,
}

impl AppState {
    pub fn new(
        session: SessionController,
        player: Arc<dyn AudioPlayer>,
        port: u16,
        host: String,
    ) -> Self {
        let (state_change_tx, _) = broadcast::channel(100);

        Self {
            session: Mutex::new(session),
            player,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            state_change_tx,
        }
    }

    /// Apply `op` to the session, record the action and notify listeners.
    /// Nothing is recorded when `op` fails.
    pub fn update_session<T, F>(&self, action: &str, op: F) -> Result<(T, SessionSnapshot)>
    where
        F: FnOnce(&mut SessionController) -> Result<T>,
    {
        let mut session = self.lock_session()?;
        let output = op(&mut *session)?;
        let snapshot = session.snapshot();
        drop(session);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        self.notify(snapshot.clone());
        Ok((output, snapshot))
    }

    pub fn select_target(&self, value: u32) -> Result<SessionSnapshot> {
        self.update_session("select_target", |s| s.select_target(value))
            .map(|(_, snapshot)| snapshot)
    }

    pub fn increment(&self) -> Result<SessionSnapshot> {
        self.update_session("increment", SessionController::increment)
            .map(|(_, snapshot)| snapshot)
    }

    pub fn start_reset(&self) -> Result<SessionSnapshot> {
        self.update_session("start_reset", SessionController::start_reset)
            .map(|(_, snapshot)| snapshot)
    }

    pub fn cancel_reset(&self) -> Result<SessionSnapshot> {
        self.update_session("cancel_reset", SessionController::cancel_reset)
            .map(|(_, snapshot)| snapshot)
    }

    pub fn confirm_reset(&self) -> Result<SessionSnapshot> {
        self.update_session("confirm_reset", SessionController::confirm_reset)
            .map(|(_, snapshot)| snapshot)
    }

    /// Change the target with the client's answer to the confirmation prompt.
    /// Returns whether the target was cleared.
    pub fn change_target(&self, confirmed: bool) -> Result<(bool, SessionSnapshot)> {
        self.update_session("change_target", |s| s.change_target(|_| confirmed))
    }

    /// Flip playback and forward the command to the audio collaborator.
    /// A rejected play request is logged and otherwise ignored.
    pub fn toggle_playback(&self) -> Result<SessionSnapshot> {
        let (command, snapshot) =
            self.update_session("toggle_playback", SessionController::toggle_playback)?;

        let result = match command {
            PlaybackCommand::Play => self.player.play(),
            PlaybackCommand::Pause => self.player.pause(),
        };
        if let Err(e) = result {
            debug!("Audio request {:?} rejected: {}", command, e);
        }

        Ok(snapshot)
    }

    /// Reconcile playback with a collaborator notification
    pub fn apply_playback_event(&self, event: PlaybackEvent) -> Result<SessionSnapshot> {
        let mut session = self.lock_session()?;
        session.apply_playback_event(event);
        let snapshot = session.snapshot();
        drop(session);

        self.notify(snapshot.clone());
        Ok(snapshot)
    }

    /// Stop the audio collaborator, used on shutdown
    pub fn stop_playback(&self) {
        if let Err(e) = self.player.pause() {
            warn!("Failed to stop playback: {}", e);
        }
    }

    /// Get the current session snapshot
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        self.lock_session().map(|session| session.snapshot())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn lock_session(&self) -> Result<std::sync::MutexGuard<'_, SessionController>> {
        self.session
            .lock()
            .map_err(|e| SessionError::LockPoisoned(e.to_string()))
    }

    fn notify(&self, snapshot: SessionSnapshot) {
        // Sending only fails when nobody is subscribed.
        if self.state_change_tx.send(snapshot).is_err() {
            debug!("No session subscribers");
        }
    }
}
