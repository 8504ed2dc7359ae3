//! Round configuration
//!
//! Loaded from JSON by the runner; every field falls back to its default when
//! missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How many agents play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMode {
    Single,
    #[default]
    Two,
}

impl PlayerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerMode::Single => "single",
            PlayerMode::Two => "two",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "1" | "1p" => Some(PlayerMode::Single),
            "two" | "2" | "2p" => Some(PlayerMode::Two),
            _ => None,
        }
    }

    pub fn agent_count(&self) -> usize {
        match self {
            PlayerMode::Single => 1,
            PlayerMode::Two => 2,
        }
    }
}

/// Speed modifiers outside this range are clamped
const SPEED_MODIFIER_RANGE: (f32, f32) = (0.25, 3.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player_mode: PlayerMode,
    /// Shared lives at the start of a round
    pub starting_lives: u32,
    /// Multiplier on agent speed (1.0 = arcade speed)
    pub agent_speed_modifier: f32,
    /// RNG seed for frightened wandering and bonus spawns
    pub seed: u64,
    pub starting_level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_mode: PlayerMode::Two,
            starting_lives: 3,
            agent_speed_modifier: 1.0,
            seed: 0x5EED,
            starting_level: 1,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a JSON file, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Could not read settings {}: {}, using defaults", path.display(), err);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Invalid settings {}: {}, using defaults", path.display(), err);
                Self::default()
            }
        }
    }

    /// Clamp values into the ranges the simulation supports
    pub fn sanitized(mut self) -> Self {
        self.starting_lives = self.starting_lives.max(1);
        self.starting_level = self.starting_level.max(1);
        self.agent_speed_modifier = if self.agent_speed_modifier.is_finite() {
            self.agent_speed_modifier
                .clamp(SPEED_MODIFIER_RANGE.0, SPEED_MODIFIER_RANGE.1)
        } else {
            1.0
        };
        self
    }
}
