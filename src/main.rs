//! Mantra Counter - A state-managed HTTP server for counting chant repetitions
//!
//! This is the main entry point for the mantra-counter application.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{info, warn};

use mantra_counter::{
    api::create_router,
    config::Config,
    services::{check_player_available, AudioPlayer, NullPlayer, ProcessPlayer},
    state::{AppState, SessionController},
    storage::FileStore,
    tasks::playback_event_task,
    shutdown::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("mantra_counter={},tower_http=info", config.log_level()))
        .init();

    info!("Starting mantra-counter server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_file={}, presets_only={}",
        config.host,
        config.port,
        config.data_file.display(),
        config.presets_only
    );

    // Restore the session from the data file
    let store = Arc::new(FileStore::open(&config.data_file));
    info!("Session store: {}", store.path().display());
    let session = SessionController::load(store).presets_only(config.presets_only);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let player: Arc<dyn AudioPlayer> = match config.player_config() {
        Some(player_config) => {
            // A missing player only disables playback
            if let Err(e) = check_player_available(&player_config.program).await {
                warn!("{}", e);
            }
            info!("Audio track: {}", player_config.track.display());
            Arc::new(ProcessPlayer::new(player_config, events_tx))
        }
        None => {
            info!("No audio track configured, playback requests will be ignored");
            Arc::new(NullPlayer)
        }
    };

    let state = Arc::new(AppState::new(session, player, config.port, config.host.clone()));

    // Start the playback notification task
    let event_state = Arc::clone(&state);
    tokio::spawn(async move {
        playback_event_task(event_state, events_rx).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /target           - Select a target {{\"value\": n}}");
    info!("  POST /target/change    - Clear the target {{\"confirm\": bool}}");
    info!("  POST /increment        - Count one repetition");
    info!("  POST /reset/start      - Ask to reset the count");
    info!("  POST /reset/cancel     - Keep the count");
    info!("  POST /reset/confirm    - Reset the count to 0");
    info!("  POST /playback/toggle  - Play or pause the track");
    info!("  GET  /targets          - Recommended targets");
    info!("  GET  /events           - Session updates (server-sent events)");
    info!("  GET  /status           - Current session and server status");
    info!("  GET  /health           - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            match signal {
                Ok(signal) => info!("Shutdown signal {} received", signal),
                Err(e) => tracing::error!("Failed to listen for shutdown signals: {}", e),
            }
        }
    }

    state.stop_playback();
    info!("Server shutdown complete");
    Ok(())
}
