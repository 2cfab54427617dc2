//! Hand-off of structural events to ECS collaborators.

use crate::battlescape::{Battlescape, MapPartEvent};
use crate::components::*;
use bevy_ecs::prelude::*;

/// Events produced during the current fixed update.
///
/// Cleared at the start of each collection so readers only see this tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct MapPartEventBuffer {
    pub events: Vec<MapPartEvent>,
}

impl MapPartEventBuffer {
    pub fn effects(&self) -> impl Iterator<Item = (EffectKind, WorldPos)> + '_ {
        self.events.iter().filter_map(|e| match e {
            MapPartEvent::Effect { kind, position } => Some((*kind, *position)),
            _ => None,
        })
    }

    pub fn loosened_tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.events.iter().filter_map(|e| match e {
            MapPartEvent::ItemsLoosened { tile } => Some(*tile),
            _ => None,
        })
    }
}

/// System that moves events out of the battlescape into the buffer.
pub fn collect_map_part_events_system(mut scape: ResMut<Battlescape>, mut buffer: ResMut<MapPartEventBuffer>) {
    buffer.events = scape.drain_events();
}

/// System that flags items lying on tiles whose support went away.
pub fn loose_item_system(
    mut commands: Commands,
    buffer: Res<MapPartEventBuffer>,
    items: Query<(Entity, &RestingItem), Without<ItemCollapseRequest>>,
) {
    let tiles: Vec<TilePos> = buffer.loosened_tiles().collect();
    if tiles.is_empty() {
        return;
    }
    for (entity, item) in items.iter() {
        if tiles.contains(&item.tile) {
            commands.entity(entity).insert(ItemCollapseRequest);
        }
    }
}
