//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/target", post(select_target_handler))
        .route("/target/change", post(change_target_handler))
        .route("/increment", post(increment_handler))
        .route("/reset/start", post(start_reset_handler))
        .route("/reset/cancel", post(cancel_reset_handler))
        .route("/reset/confirm", post(confirm_reset_handler))
        .route("/playback/toggle", post(toggle_playback_handler))
        .route("/targets", get(targets_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
