//! Game configuration
//!
//! Loaded from `mowve_it.toml` (or `.ron`) when present. Every section falls
//! back to its defaults field by field, so a partial file is fine.

use mowve_engine::config::{Config, Deserialize, Serialize};
use mowve_engine::EngineConfig;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    /// Engine loop settings
    pub engine: EngineConfig,

    /// Audio settings
    pub audio: AudioConfig,

    /// Gameplay settings
    pub gameplay: GameplayConfig,

    /// Seed for spawn placement; random when unset
    pub seed: Option<u64>,
}

impl Config for GameConfig {}

/// Audio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { music_volume: 1.0 }
    }
}

/// Gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Grass detail: 0.0 (lowest), 0.5 or 1.0 (highest)
    pub grass_density: f32,

    /// Lives at the start of each level
    pub starting_lives: u32,

    /// One spawn per this many frames on average
    pub spawn_chance: u32,

    /// No spawns once the timer drops below this many frames
    pub spawn_threshold: u32,

    /// Frames per floating text stage
    pub text_stage_frames: u32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            grass_density: 1.0,
            starting_lives: 2,
            spawn_chance: 64,
            spawn_threshold: 600,
            text_stage_frames: 60,
        }
    }
}

impl GameplayConfig {
    /// Snap a slider setting to one of the three grass detail levels
    pub fn snap_density(setting: f32) -> f32 {
        if setting < 1.0 / 3.0 {
            0.0
        } else if setting < 2.0 / 3.0 {
            0.5
        } else {
            1.0
        }
    }
}
