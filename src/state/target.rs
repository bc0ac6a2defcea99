//! Repetition targets and the recommended presets

use std::{fmt, num::NonZeroU32, str::FromStr};
use serde::{Deserialize, Serialize};

use super::SessionError;

/// A positive repetition goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(NonZeroU32);

impl Target {
    /// Validate a raw value; zero is rejected.
    pub fn new(value: u32) -> Result<Self, SessionError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(SessionError::InvalidTarget(value))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Whether this value is one of the recommended presets
    pub fn is_preset(self) -> bool {
        TargetPreset::ALL.iter().any(|preset| preset.value == self.get())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Target {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| SessionError::UnparsableTarget(s.to_string()))?;
        Self::new(value)
    }
}

/// A recommended target offered on the selection surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetPreset {
    pub value: u32,
    pub label: &'static str,
}

impl TargetPreset {
    pub const ALL: [TargetPreset; 3] = [
        TargetPreset { value: 7, label: "Rejoicing" },
        TargetPreset { value: 49, label: "Diligence" },
        TargetPreset { value: 108, label: "Fulfilment" },
    ];

    pub fn target(&self) -> Target {
        // Preset values are all non-zero.
        Target(NonZeroU32::new(self.value).unwrap_or(NonZeroU32::MIN))
    }
}
