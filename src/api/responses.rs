//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{SessionError, SessionSnapshot, TargetPreset};

/// Body of `POST /target`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectTargetRequest {
    pub value: u32,
}

/// Body of `POST /target/change`: the client's answer to the prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeTargetRequest {
    pub confirm: bool,
}

/// API response structure for session endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionSnapshot,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, session: SessionSnapshot) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            session,
        }
    }
}

/// Error body returned with a non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let code = match &self {
            SessionError::InvalidTarget(_)
            | SessionError::UnparsableTarget(_)
            | SessionError::NotAPreset(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SessionError::TargetAlreadySet | SessionError::TargetNotSet(_) => StatusCode::CONFLICT,
            SessionError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };
        (code, Json(body)).into_response()
    }
}

/// Status response with presets and server information
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub session: SessionSnapshot,
    pub presets: &'static [TargetPreset],
    pub change_target_prompt: &'static str,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
