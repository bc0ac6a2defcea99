//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::services::PlayerConfig;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "mantra-counter")]
#[command(about = "A state-managed HTTP server for counting chant repetitions toward a target")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20108")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// JSON file holding the persisted target and count
    #[arg(long, default_value = "mantra-counter.json")]
    pub data_file: PathBuf,

    /// Audio track to loop while chanting; playback is disabled without it
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Player program used for the audio track
    #[arg(long, default_value = "mpv")]
    pub player: String,

    /// Argument passed to the player before the track path (repeatable)
    #[arg(
        long = "player-arg",
        allow_hyphen_values = true,
        default_values = ["--no-video", "--really-quiet"]
    )]
    pub player_args: Vec<String>,

    /// Only accept the recommended targets (7, 49, 108)
    #[arg(long)]
    pub presets_only: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Player settings, when an audio track is configured
    pub fn player_config(&self) -> Option<PlayerConfig> {
        self.audio
            .as_ref()
            .map(|track| PlayerConfig::new(self.player.clone(), self.player_args.clone(), track))
    }
}
