//! The counting session state machine
//!
//! A session is either selecting a target or counting toward one. Every
//! operation runs to completion synchronously; changes to the target or the
//! count are mirrored into the key-value store immediately.

use std::{fmt, sync::Arc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::{KeyValueStore, COUNT_KEY, TARGET_KEY};
use super::{
    error::{Result, SessionError},
    playback::{PlaybackCommand, PlaybackEvent, PlaybackSource, PlaybackState},
    target::Target,
};

/// Message shown by the confirmation prompt before clearing the target
pub const CHANGE_TARGET_PROMPT: &str =
    "Choosing a new target keeps your current count. Continue?";

/// Top-level mode of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No target yet; the user picks one
    SelectingTarget,
    /// A target is set and the count can advance
    Counting,
}

/// Read-only view of the session handed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub target: Option<Target>,
    pub count: u64,
    pub progress_percentage: Option<f64>,
    pub confirming_reset: bool,
    pub playing: bool,
    pub playback_source: PlaybackSource,
}

/// Owns the target, the count, the reset confirmation flag and the playback
/// flag. No other component mutates them.
pub struct SessionController {
    store: Arc<dyn KeyValueStore>,
    target: Option<Target>,
    count: u64,
    confirming_reset: bool,
    playback: PlaybackState,
    presets_only: bool,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("target", &self.target)
            .field("count", &self.count)
            .field("confirming_reset", &self.confirming_reset)
            .field("playback", &self.playback)
            .field("presets_only", &self.presets_only)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Restore a session from `store`.
    ///
    /// A missing or unparsable count starts at zero; a missing, unparsable or
    /// zero target leaves the session selecting a target. The normalized
    /// values are written back so the store never keeps a corrupt entry.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let count = read_key(store.as_ref(), COUNT_KEY)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let target = read_key(store.as_ref(), TARGET_KEY)
            .and_then(|raw| raw.parse::<Target>().ok());

        let controller = Self {
            store,
            target,
            count,
            confirming_reset: false,
            playback: PlaybackState::new(),
            presets_only: false,
        };

        info!(
            "Session loaded: target={}, count={}",
            controller.target.map_or_else(|| "unset".to_string(), |t| t.to_string()),
            controller.count
        );

        controller.persist_count();
        controller.persist_target();
        controller
    }

    /// Only accept the recommended preset targets
    pub fn presets_only(mut self, presets_only: bool) -> Self {
        self.presets_only = presets_only;
        self
    }

    pub fn mode(&self) -> Mode {
        if self.target.is_some() {
            Mode::Counting
        } else {
            Mode::SelectingTarget
        }
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_confirming_reset(&self) -> bool {
        self.confirming_reset
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// `min(count / target * 100, 100)`, or `None` while no target is set.
    /// The count itself is never capped.
    pub fn progress_percentage(&self) -> Option<f64> {
        self.target
            .map(|target| (self.count as f64 / f64::from(target.get()) * 100.0).min(100.0))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode(),
            target: self.target,
            count: self.count,
            progress_percentage: self.progress_percentage(),
            confirming_reset: self.confirming_reset,
            playing: self.playback.is_playing(),
            playback_source: self.playback.source(),
        }
    }

    /// Choose the target and start counting
    pub fn select_target(&mut self, value: u32) -> Result<Target> {
        if self.target.is_some() {
            return Err(SessionError::TargetAlreadySet);
        }

        let target = Target::new(value)?;
        if self.presets_only && !target.is_preset() {
            return Err(SessionError::NotAPreset(value));
        }

        info!("Target selected: {}", target);
        self.target = Some(target);
        self.persist_target();
        Ok(target)
    }

    /// Add one repetition. Clears a pending reset confirmation.
    pub fn increment(&mut self) -> Result<u64> {
        self.require_target("increment")?;

        self.count = self.count.saturating_add(1);
        if self.confirming_reset {
            debug!("Increment cancelled pending reset");
            self.confirming_reset = false;
        }
        self.persist_count();
        Ok(self.count)
    }

    pub fn start_reset(&mut self) -> Result<()> {
        self.require_target("start_reset")?;
        self.confirming_reset = true;
        Ok(())
    }

    pub fn cancel_reset(&mut self) -> Result<()> {
        self.require_target("cancel_reset")?;
        self.confirming_reset = false;
        Ok(())
    }

    pub fn confirm_reset(&mut self) -> Result<()> {
        self.require_target("confirm_reset")?;

        info!("Count reset from {}", self.count);
        self.count = 0;
        self.confirming_reset = false;
        self.persist_count();
        Ok(())
    }

    /// Ask `prompt` whether to clear the target. The count is kept either way.
    /// Returns whether the target was cleared.
    pub fn change_target<F>(&mut self, prompt: F) -> Result<bool>
    where
        F: FnOnce(&str) -> bool,
    {
        self.require_target("change_target")?;

        if !prompt(CHANGE_TARGET_PROMPT) {
            debug!("Target change declined");
            return Ok(false);
        }

        info!("Target cleared, keeping count {}", self.count);
        self.target = None;
        Ok(true)
    }

    /// Flip the playing flag and return the command for the audio collaborator.
    /// The caller dispatches it and absorbs any failure.
    pub fn toggle_playback(&mut self) -> Result<PlaybackCommand> {
        self.require_target("toggle_playback")?;
        Ok(self.playback.toggle())
    }

    /// Reconcile the playing flag with a collaborator notification
    pub fn apply_playback_event(&mut self, event: PlaybackEvent) {
        self.playback.apply(event);
    }

    fn require_target(&self, operation: &'static str) -> Result<Target> {
        self.target.ok_or(SessionError::TargetNotSet(operation))
    }

    fn persist_count(&self) {
        if let Err(e) = self.store.set(COUNT_KEY, &self.count.to_string()) {
            warn!("Failed to persist count: {}", e);
        }
    }

    fn persist_target(&self) {
        // Clearing the target leaves the stored key in place.
        if let Some(target) = self.target {
            if let Err(e) = self.store.set(TARGET_KEY, &target.to_string()) {
                warn!("Failed to persist target: {}", e);
            }
        }
    }
}

fn read_key(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read '{}' from storage: {}", key, e);
            None
        }
    }
}
