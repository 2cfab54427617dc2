//! The battlescape: owner of every map part, the tile grid and the catalog.
//!
//! Parts live in an ordered table keyed by [`PartId`]. The grid and every
//! support edge refer to parts by id or by `(TilePos, PartCategory)`, never by
//! handle, so removing a part can never leave a dangling reference behind.
//! Iteration over the table is in id order, which keeps every pass
//! deterministic.
//!
//! Structural behaviour is split across sibling modules that extend
//! `Battlescape` with further `impl` blocks:
//! - `support.rs`: is this part held up, and by what?
//! - `collapse.rs`: what happens to dependents when a supporter goes away.
//! - `fall.rs`: per-tick countdowns, falling, rubble and destruction.
//! - `doors.rs`: detaching parts from doors.

use crate::catalog::{MapPartType, PartCatalog};
use crate::components::{EffectKind, PartCategory, PartId, TilePos, TypeId, WorldPos};
use crate::config::StructureConfig;
use crate::doors::DoorTable;
use crate::error::{StructureError, StructureResult};
use crate::grid::TileGrid;
use crate::map_part::MapPart;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outbound notifications for collaborators outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MapPartEvent {
    /// Fire-and-forget visual effect.
    Effect { kind: EffectKind, position: WorldPos },
    /// Items resting in this tile must re-check their support.
    ItemsLoosened { tile: TilePos },
    /// A part's collapse countdown fired and it started to fall.
    StartedFalling { part: PartId },
    /// A part was destroyed and removed from the grid.
    Destroyed { part: PartId },
}

#[derive(Resource, Debug, Clone)]
pub struct Battlescape {
    parts: BTreeMap<PartId, MapPart>,
    grid: TileGrid,
    catalog: Arc<PartCatalog>,
    pub(crate) doors: DoorTable,
    config: StructureConfig,
    events: Vec<MapPartEvent>,
    next_id: u32,
}

impl Battlescape {
    pub fn new(catalog: Arc<PartCatalog>, size: (i32, i32, i32), config: StructureConfig) -> Self {
        Self {
            parts: BTreeMap::new(),
            grid: TileGrid::new(size.0, size.1, size.2),
            catalog,
            doors: DoorTable::default(),
            config,
            events: Vec::new(),
            next_id: 0,
        }
    }

    pub fn catalog(&self) -> &PartCatalog {
        &self.catalog
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &StructureConfig {
        &self.config
    }

    pub fn part(&self, id: PartId) -> Option<&MapPart> {
        self.parts.get(&id)
    }

    pub(crate) fn part_mut(&mut self, id: PartId) -> Option<&mut MapPart> {
        self.parts.get_mut(&id)
    }

    pub(crate) fn require(&self, id: PartId) -> StructureResult<&MapPart> {
        self.parts.get(&id).ok_or(StructureError::MissingPart(id))
    }

    /// All parts in id order, including destroyed ones kept for bookkeeping.
    pub fn parts(&self) -> impl Iterator<Item = &MapPart> {
        self.parts.values()
    }

    pub fn part_ids(&self) -> Vec<PartId> {
        self.parts.keys().copied().collect()
    }

    /// Parts that still occupy a grid cell.
    pub fn on_map_count(&self) -> usize {
        self.parts.values().filter(|p| p.on_map()).count()
    }

    /// Descriptor currently active for a part.
    pub fn type_of(&self, id: PartId) -> Option<&MapPartType> {
        self.parts.get(&id).and_then(|p| self.catalog.get(p.type_id))
    }

    pub(crate) fn type_by_id(&self, id: TypeId) -> StructureResult<&MapPartType> {
        self.catalog.get(id).ok_or(StructureError::UnknownType(id))
    }

    /// First part of `category` occupying `pos`.
    pub fn part_at(&self, pos: TilePos, category: PartCategory) -> Option<PartId> {
        self.grid.first_of(pos, category)
    }

    /// Parts whose collapse countdown is running.
    pub fn collapse_pending(&self) -> Vec<PartId> {
        self.parts
            .values()
            .filter(|p| p.on_map() && p.will_collapse())
            .map(|p| p.id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Grid mutation
    // ------------------------------------------------------------------

    /// Place a new part resting in `tile`.
    pub fn add_to_map(&mut self, type_id: TypeId, tile: TilePos) -> StructureResult<PartId> {
        self.add_to_map_at(type_id, tile.resting_position())
    }

    /// Place a new part at an arbitrary position inside the map.
    pub fn add_to_map_at(&mut self, type_id: TypeId, position: WorldPos) -> StructureResult<PartId> {
        let category = self.type_by_id(type_id)?.category;
        let tile = position.tile();
        if !self.grid.in_bounds(tile) {
            return Err(StructureError::OutOfBounds(tile));
        }

        let id = PartId(self.next_id);
        self.next_id += 1;

        let mut part = MapPart::new(id, type_id, category, position);
        part.tile = Some(tile);
        self.grid.insert(tile, id, category)?;
        self.parts.insert(id, part);
        Ok(id)
    }

    /// Take a part off the grid. Edges pointing at it are purged first.
    pub fn remove_from_map(&mut self, id: PartId) {
        let Some(tile) = self.parts.get(&id).and_then(|p| p.tile) else {
            return;
        };
        self.purge_incoming_edges(id);
        self.grid.remove(tile, id);
        if let Some(part) = self.parts.get_mut(&id) {
            part.tile = None;
        }
    }

    /// Move a part, relocating it in the grid when it changes cell.
    pub fn set_position(&mut self, id: PartId, position: WorldPos) -> StructureResult<()> {
        let part = self.require(id)?;
        let from = part.tile.ok_or(StructureError::NotOnMap(id))?;
        let category = part.category;
        let to = position.tile();

        if from != to {
            // Dependents of other parts are keyed by cell; leaving the cell ends those edges.
            self.purge_incoming_edges(id);
            self.grid.relocate(from, to, id, category)?;
        }
        if let Some(part) = self.parts.get_mut(&id) {
            part.position = position;
            part.tile = Some(to);
        }
        Ok(())
    }

    /// Reported by the item collaborator when items come to rest on a part.
    pub fn mark_supporting_items(&mut self, id: PartId) {
        if let Some(part) = self.parts.get_mut(&id) {
            part.supported_items = true;
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub(crate) fn emit(&mut self, event: MapPartEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<MapPartEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------

    pub fn max_frames(&self, id: PartId) -> u32 {
        self.parts
            .get(&id)
            .and_then(|p| self.catalog.get(p.display_type()))
            .map(|t| t.animation_frames)
            .unwrap_or(0)
    }

    /// Frame to draw, or `None` for parts without animation.
    pub fn animation_frame(&self, id: PartId) -> Option<u32> {
        let part = self.parts.get(&id)?;
        if let Some(link) = part.door {
            let max = self.max_frames(id);
            let door_frame = self.doors.get(link.door).map(|d| d.animation_frame).unwrap_or(0);
            return Some(door_frame.min(max.saturating_sub(1)));
        }
        let frames = self.catalog.get(part.type_id)?.animation_frames;
        if frames == 0 {
            return None;
        }
        Some(part.animation_frame_ticks / self.config.ticks_per_frame.max(1))
    }
}
