//! Playback notification background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::state::{AppState, PlaybackEvent};

/// Background task that applies audio collaborator notifications to the
/// session. Runs until every sender is dropped.
pub async fn playback_event_task(
    state: Arc<AppState>,
    mut events: mpsc::UnboundedReceiver<PlaybackEvent>,
) {
    info!("Starting playback event task");

    while let Some(event) = events.recv().await {
        debug!("Playback notification: {:?}", event);

        match state.apply_playback_event(event) {
            Ok(snapshot) => debug!("Playback state is now playing={}", snapshot.playing),
            Err(e) => error!("Failed to apply playback notification: {}", e),
        }
    }

    info!("Playback event channel closed");
}
