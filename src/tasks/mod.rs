//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod playback_events;

// Re-export main functions
pub use playback_events::playback_event_task;
