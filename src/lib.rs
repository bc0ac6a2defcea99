//! Mantra Counter - A state-managed HTTP server for counting chant repetitions
//!
//! The user picks a target, taps to count toward it, and can loop an audio
//! track while chanting. The target and count survive restarts through a
//! key-value store.

pub mod config;
pub mod state;
pub mod storage;
pub mod api;
pub mod services;
pub mod tasks;
pub mod shutdown;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, SessionController};
pub use api::create_router;
pub use shutdown::shutdown_signal;
