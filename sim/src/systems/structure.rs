//! Per-tick structural update.

use crate::battlescape::Battlescape;
use crate::config::SimConfig;
use bevy_ecs::prelude::*;

/// Global simulation tick counter. Increments each fixed update.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// System that advances countdowns, falls and animations.
///
/// ## Data Access
/// - Reads: SimConfig
/// - Writes: Battlescape
pub fn map_part_update_system(config: Res<SimConfig>, mut scape: ResMut<Battlescape>) {
    scape.update(config.ticks_per_update);
}
