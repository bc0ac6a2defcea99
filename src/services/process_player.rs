//! Audio playback through an external player process

use std::{
    path::PathBuf,
    process::Stdio,
    sync::{Arc, Mutex, Weak},
    time::{Duration, Instant},
};
use tokio::{
    process::{Child, Command},
    sync::{mpsc, oneshot},
};
use tracing::{debug, info, warn};

use crate::state::PlaybackEvent;
use super::audio::{AudioError, AudioPlayer};

/// How to launch the external player
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Passed as the final argument
    pub track: PathBuf,
    /// Restart the track when it finishes normally
    pub looping: bool,
    /// A track that finishes sooner than this is treated as broken and not
    /// restarted
    pub min_track_runtime: Duration,
}

impl PlayerConfig {
    pub fn new(program: impl Into<String>, args: Vec<String>, track: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            track: track.into(),
            looping: true,
            min_track_runtime: Duration::from_secs(1),
        }
    }

    fn spawn(&self) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(&self.track)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}

/// Plays the track by spawning `program args... track`.
///
/// Emits `Playing` once the process is spawned and `Paused` once playback
/// ends, whether it was paused, the process failed, or the player was dropped.
#[derive(Debug)]
pub struct ProcessPlayer {
    config: Arc<PlayerConfig>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    slot: Arc<Mutex<TrackSlot>>,
}

/// The current track loop. Only the loop whose generation is current may
/// report `Paused`, so a loop still shutting down after a pause cannot
/// override the `Playing` of the play that followed it.
#[derive(Debug, Default)]
struct TrackSlot {
    generation: u64,
    stop: Option<oneshot::Sender<()>>,
}

impl ProcessPlayer {
    pub fn new(config: PlayerConfig, events: mpsc::UnboundedSender<PlaybackEvent>) -> Self {
        Self {
            config: Arc::new(config),
            events,
            slot: Arc::new(Mutex::new(TrackSlot::default())),
        }
    }
}

impl AudioPlayer for ProcessPlayer {
    fn play(&self) -> Result<(), AudioError> {
        let mut slot = self.slot.lock().map_err(|_| AudioError::LockPoisoned)?;
        if slot.stop.as_ref().is_some_and(|stop| !stop.is_closed()) {
            debug!("Play requested while already playing");
            return Ok(());
        }

        let child = self.config.spawn()?;
        info!("Started player for {}", self.config.track.display());

        let (stop_tx, stop_rx) = oneshot::channel();
        slot.generation += 1;
        slot.stop = Some(stop_tx);
        let generation = slot.generation;

        // Sent under the lock so it is ordered against the previous loop's `Paused`.
        let _ = self.events.send(PlaybackEvent::Playing);
        drop(slot);

        tokio::spawn(run_track_loop(
            Arc::clone(&self.config),
            child,
            stop_rx,
            TrackHandle {
                slot: Arc::downgrade(&self.slot),
                generation,
                events: self.events.clone(),
            },
        ));
        Ok(())
    }

    fn pause(&self) -> Result<(), AudioError> {
        let stop = self.slot.lock().map_err(|_| AudioError::LockPoisoned)?.stop.take();
        match stop {
            Some(stop) => {
                debug!("Stopping player");
                let _ = stop.send(());
            }
            None => debug!("Pause requested while not playing"),
        }
        Ok(())
    }
}

/// What a track loop needs to report its end. The slot is held weakly so a
/// dropped player releases the stop sender and ends the loop.
struct TrackHandle {
    slot: Weak<Mutex<TrackSlot>>,
    generation: u64,
    events: mpsc::UnboundedSender<PlaybackEvent>,
}

impl TrackHandle {
    fn report_paused(self) {
        let Some(shared) = self.slot.upgrade() else {
            // The player is gone, nothing can supersede this loop.
            let _ = self.events.send(PlaybackEvent::Paused);
            return;
        };
        let Ok(slot) = shared.lock() else {
            warn!("Player state lock poisoned, dropping pause notification");
            return;
        };
        if slot.generation == self.generation {
            let _ = self.events.send(PlaybackEvent::Paused);
        } else {
            debug!("Track loop {} superseded, not reporting pause", self.generation);
        }
    }
}

async fn run_track_loop(
    config: Arc<PlayerConfig>,
    mut child: Child,
    mut stop_rx: oneshot::Receiver<()>,
    handle: TrackHandle,
) {
    let mut started = Instant::now();

    loop {
        tokio::select! {
            // Fires on pause and when the player is dropped
            _ = &mut stop_rx => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to stop player process: {}", e);
                }
                info!("Player stopped");
                break;
            }

            status = child.wait() => {
                match status {
                    Ok(status) if status.success() && config.looping => {
                        if started.elapsed() < config.min_track_runtime {
                            warn!("Track ended after {:?}, not looping", started.elapsed());
                            break;
                        }
                        match config.spawn() {
                            Ok(next) => {
                                debug!("Track finished, restarting");
                                child = next;
                                started = Instant::now();
                            }
                            Err(e) => {
                                warn!("Failed to restart player: {}", e);
                                break;
                            }
                        }
                    }
                    Ok(status) => {
                        info!("Player exited with {}", status);
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to wait for player process: {}", e);
                        break;
                    }
                }
            }
        }
    }

    // Close the stop channel first so a play issued after `Paused` starts fresh.
    drop(stop_rx);
    handle.report_paused();
}

/// Check that the player program can be launched at all
pub async fn check_player_available(program: &str) -> Result<(), AudioError> {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|_| AudioError::PlayerMissing(program.to_string()))?;

    info!("{} is available", program);
    Ok(())
}
