//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::{AppState, SessionError, SessionSnapshot, TargetPreset, CHANGE_TARGET_PROMPT};
use super::responses::{
    ApiResponse, ChangeTargetRequest, HealthResponse, SelectTargetRequest, StatusResponse,
};

/// Handle POST /target - Select the target and start counting
pub async fn select_target_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectTargetRequest>,
) -> Result<Json<ApiResponse>, SessionError> {
    let session = state.select_target(request.value)?;
    info!("Target endpoint called - target set to {}", request.value);
    Ok(Json(ApiResponse::ok(
        format!("Target set to {}", request.value),
        session,
    )))
}

/// Handle POST /increment - Count one repetition
pub async fn increment_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, SessionError> {
    let session = state.increment()?;
    Ok(Json(ApiResponse::ok(format!("Count is {}", session.count), session)))
}

/// Handle POST /reset/start - Ask for reset confirmation
pub async fn start_reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, SessionError> {
    let session = state.start_reset()?;
    Ok(Json(ApiResponse::ok("Confirm or cancel the reset", session)))
}

/// Handle POST /reset/cancel - Keep the count
pub async fn cancel_reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, SessionError> {
    let session = state.cancel_reset()?;
    Ok(Json(ApiResponse::ok("Reset cancelled", session)))
}

/// Handle POST /reset/confirm - Zero the count
pub async fn confirm_reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, SessionError> {
    let session = state.confirm_reset()?;
    info!("Reset endpoint called - count zeroed");
    Ok(Json(ApiResponse::ok("Count reset to 0", session)))
}

/// Handle POST /target/change - Clear the target, keeping the count
pub async fn change_target_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChangeTargetRequest>,
) -> Result<Json<ApiResponse>, SessionError> {
    let (cleared, session) = state.change_target(request.confirm)?;
    let message = if cleared {
        format!("Target cleared, count {} kept", session.count)
    } else {
        "Target change declined".to_string()
    };
    Ok(Json(ApiResponse::ok(message, session)))
}

/// Handle POST /playback/toggle - Play or pause the track
pub async fn toggle_playback_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, SessionError> {
    let session = state.toggle_playback()?;
    let message = if session.playing { "Playback requested" } else { "Pause requested" };
    Ok(Json(ApiResponse::ok(message, session)))
}

/// Handle GET /status - Return the session and server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, SessionError> {
    let session = state.snapshot()?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        session,
        presets: &TargetPreset::ALL,
        change_target_prompt: CHANGE_TARGET_PROMPT,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /targets - List the recommended targets
pub async fn targets_handler() -> Json<&'static [TargetPreset]> {
    Json(&TargetPreset::ALL)
}

/// Handle GET /events - Stream a snapshot after every session change
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    // Subscribe before reading the current snapshot so no change is missed.
    let rx = state.state_change_tx.subscribe();
    let initial = state.snapshot().ok().map(session_event);

    let updates = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(snapshot) => return Some((session_event(snapshot), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream::iter(initial).chain(updates)).keep_alive(KeepAlive::default())
}

fn session_event(snapshot: SessionSnapshot) -> Result<Event, axum::Error> {
    Event::default().event("session").json_data(snapshot)
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
