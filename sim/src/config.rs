//! Simulation configuration.
//!
//! `StructureConfig` carries the per-tick constants of the structural core and
//! travels inside the `Battlescape`. `SimConfig` is the ECS-level resource that
//! drives the fixed-timestep loop in `SimWorld`.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Constants for collapse timing, falling physics and animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Base delay between losing support and starting to fall.
    pub collapse_delay_ticks: u32,
    /// Added to fall speed every tick.
    pub falling_acceleration: f32,
    /// Game ticks per velocity unit.
    pub tick_scale: f32,
    /// Vertical velocity units per cell.
    pub velocity_scale_z: f32,
    /// Game ticks per animation frame of a map part.
    pub ticks_per_frame: u32,
    /// Seed for the damage roll RNG.
    pub seed: u64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            collapse_delay_ticks: 4,
            falling_acceleration: 0.166_666_67,
            tick_scale: 36.0,
            velocity_scale_z: 40.0,
            ticks_per_frame: 8,
            seed: 0,
        }
    }
}

impl StructureConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Cells travelled per tick at the given fall speed.
    #[inline]
    pub fn fall_step(&self, speed: f32) -> f32 {
        speed / self.tick_scale / self.velocity_scale_z
    }
}

/// Configuration for the fixed-timestep driver.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds (e.g., 1/36 for 36 Hz).
    pub fixed_timestep: f32,
    /// Game ticks simulated by each fixed update.
    pub ticks_per_update: u32,
    pub structure: StructureConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 36.0,
            ticks_per_update: 4, // 144 game ticks per second
            structure: StructureConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "structure": { "seed": 99 } }"#).unwrap();
        assert_eq!(config.structure.seed, 99);
        assert_eq!(config.structure.collapse_delay_ticks, 4);
        assert_eq!(config.ticks_per_update, 4);
    }

    #[test]
    fn test_fall_step_scales_speed() {
        let config = StructureConfig {
            tick_scale: 2.0,
            velocity_scale_z: 5.0,
            ..Default::default()
        };
        assert!((config.fall_step(10.0) - 1.0).abs() < 1e-6);
    }
}
