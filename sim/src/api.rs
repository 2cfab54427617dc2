//! Public API for the simulation.
//!
//! This module provides the main interface for a host (a battle renderer, a
//! replay tool, a test harness) to drive the structural simulation.
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 36 Hz). When
//! `step(dt)` is called, the simulation accumulates time and runs fixed updates
//! as needed. Each fixed update advances map parts by
//! `SimConfig::ticks_per_update` game ticks, so behavior is identical
//! regardless of frame rate.

use crate::battlescape::Battlescape;
use crate::catalog::PartCatalog;
use crate::components::*;
use crate::config::SimConfig;
use crate::damage::{DamageModel, DamageModelResource};
use crate::error::{StructureError, StructureResult};
use crate::rng::SimRng;
use crate::support::SettleReport;
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use std::sync::Arc;
use tracing::info;

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Building a battlescape and settling its initial support graph
/// - Queuing projectile impacts and resting items
/// - Stepping the simulation forward
/// - Extracting state snapshots
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
}

impl SimWorld {
    /// Create an empty battlescape of `size` cells.
    pub fn new(catalog: Arc<PartCatalog>, size: (i32, i32, i32)) -> Self {
        Self::with_config(catalog, size, SimConfig::default())
    }

    /// Create a simulation world with custom configuration.
    pub fn with_config(catalog: Arc<PartCatalog>, size: (i32, i32, i32), config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(Battlescape::new(catalog, size, config.structure.clone()));
        world.insert_resource(SimRng::new(config.structure.seed));
        world.insert_resource(DamageModelResource::default());
        world.insert_resource(ImpactStats::default());
        world.insert_resource(MapPartEventBuffer::default());
        world.insert_resource(SimTick(0));
        world.insert_resource(config);

        // Impacts first so parts destroyed this update start their collapse countdown
        // before the structural tick runs.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                projectile_impact_system,
                map_part_update_system,
                collect_map_part_events_system,
                loose_item_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
        }
    }

    /// Replace the damage model used for projectile impacts.
    pub fn set_damage_model(&mut self, model: impl DamageModel + Send + Sync + 'static) {
        self.world.insert_resource(DamageModelResource(Box::new(model)));
    }

    /// Place a part by catalog name.
    pub fn place_part(&mut self, type_name: &str, tile: TilePos) -> StructureResult<PartId> {
        let mut scape = self.battlescape_mut();
        let type_id = scape
            .catalog()
            .lookup(type_name)
            .ok_or_else(|| StructureError::UnknownTypeName(type_name.to_string()))?;
        scape.add_to_map(type_id, tile)
    }

    pub fn create_door(&mut self) -> DoorId {
        self.battlescape_mut().create_door()
    }

    pub fn attach_to_door(&mut self, part: PartId, door: DoorId, alternative: Option<&str>) -> StructureResult<()> {
        let mut scape = self.battlescape_mut();
        let alternative_type = match alternative {
            Some(name) => Some(
                scape
                    .catalog()
                    .lookup(name)
                    .ok_or_else(|| StructureError::UnknownTypeName(name.to_string()))?,
            ),
            None => None,
        };
        scape.attach_to_door(part, door, alternative_type)
    }

    /// Resolve support for every placed part. Call once after building the map.
    pub fn settle(&mut self) -> SettleReport {
        let report = self.battlescape_mut().settle();
        info!(
            "Settled battlescape: {} anchored, {} hard, {} soft, {} attached, {} queued",
            report.anchored, report.hard, report.soft, report.attached, report.queued
        );
        report
    }

    /// Queue a projectile impact for the next fixed update.
    pub fn spawn_impact(&mut self, target: PartId, damage: i32) {
        self.world.spawn(ProjectileImpact::new(target, damage));
    }

    /// Register a loose item lying in `tile` on top of `resting_on`.
    pub fn spawn_item(&mut self, id: u32, tile: TilePos, resting_on: PartId) -> Entity {
        self.battlescape_mut().mark_supporting_items(resting_on);
        self.world.spawn(RestingItem { id, tile }).id()
    }

    /// Item ids whose support went away and that have not been handled yet.
    pub fn loosened_items(&mut self) -> Vec<u32> {
        let mut query = self
            .world
            .query_filtered::<&RestingItem, With<ItemCollapseRequest>>();
        let mut ids: Vec<u32> = query.iter(&self.world).map(|i| i.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Step the simulation forward by `dt` seconds.
    ///
    /// Uses fixed timestep internally - accumulates time and runs fixed updates
    /// as needed.
    pub fn step(&mut self, dt: f32) {
        let fixed_dt = self
            .world
            .get_resource::<SimConfig>()
            .map(|c| c.fixed_timestep)
            .unwrap_or(1.0 / 36.0);

        self.time_accumulator += dt;

        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
        }
    }

    /// Run a single fixed timestep update.
    fn fixed_update(&mut self, dt: f32) {
        if let Some(mut tick_res) = self.world.get_resource_mut::<SimTick>() {
            tick_res.increment();
        }

        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += dt;
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&self) -> Snapshot {
        let events = self
            .world
            .get_resource::<MapPartEventBuffer>()
            .map(|b| b.events.as_slice())
            .unwrap_or(&[]);
        Snapshot::from_battlescape(self.battlescape(), events, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    pub fn impact_stats(&self) -> ImpactStats {
        *self.world.resource::<ImpactStats>()
    }

    pub fn battlescape(&self) -> &Battlescape {
        self.world.resource::<Battlescape>()
    }

    pub fn battlescape_mut(&mut self) -> Mut<'_, Battlescape> {
        self.world.resource_mut::<Battlescape>()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::catalog;

    fn sim(size: (i32, i32, i32)) -> SimWorld {
        let (b, _) = catalog();
        SimWorld::new(Arc::new(b.build().unwrap()), size)
    }

    #[test]
    fn test_new_world() {
        let sim = sim((4, 4, 4));
        assert_eq!(sim.current_tick(), 0);
        assert!(sim.snapshot().parts.is_empty());
    }

    #[test]
    fn test_step_advances_tick() {
        let mut sim = sim((4, 4, 4));
        sim.step(0.03);
        assert_eq!(sim.current_tick(), 1);
        sim.step(0.03);
        assert_eq!(sim.current_tick(), 2);
    }

    #[test]
    fn test_unknown_type_name() {
        let mut sim = sim((4, 4, 4));
        assert_eq!(
            sim.place_part("NOPE", TilePos::new(0, 0, 0)),
            Err(StructureError::UnknownTypeName("NOPE".to_string()))
        );
    }

    #[test]
    fn test_shot_column_drops_the_one_above_into_rubble() {
        let mut sim = sim((3, 3, 4));
        let base = sim.place_part("COLUMN", TilePos::new(1, 1, 0)).unwrap();
        sim.place_part("COLUMN", TilePos::new(1, 1, 1)).unwrap();
        let report = sim.settle();
        assert_eq!(report.anchored, 1);
        assert_eq!(report.hard, 1);

        sim.spawn_impact(base, 1000);
        for _ in 0..40 {
            sim.step(0.05);
        }

        assert_eq!(sim.impact_stats().destroyed, 1);
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.parts.len(), 1);
        assert_eq!(snapshot.parts[0].type_name, "RUBBLE_1");
        assert_eq!(snapshot.parts[0].tile, Some(TilePos::new(1, 1, 0)));
    }

    #[test]
    fn test_items_on_destroyed_part_are_loosened() {
        let mut sim = sim((3, 3, 3));
        let column = sim.place_part("COLUMN", TilePos::new(1, 1, 0)).unwrap();
        sim.settle();
        sim.spawn_item(7, TilePos::new(1, 1, 0), column);
        sim.spawn_item(8, TilePos::new(2, 2, 0), column);

        sim.spawn_impact(column, 1000);
        sim.step(0.03);

        assert_eq!(sim.loosened_items(), vec![7]);
    }

    #[test]
    fn test_damage_model_can_be_replaced() {
        let mut sim = sim((3, 3, 3));
        let crate_box = sim.place_part("CRATE", TilePos::new(1, 1, 0)).unwrap();
        sim.set_damage_model(crate::damage::PercentTable::new().with(DamageModifier(1), 0));

        sim.spawn_impact(crate_box, 1000);
        sim.step(0.03);

        assert_eq!(sim.impact_stats().absorbed, 1);
        let mut impacts = sim.world_mut().query::<&ProjectileImpact>();
        assert_eq!(impacts.iter(sim.world()).count(), 0);
    }

    #[test]
    fn test_snapshot_json() {
        let mut sim = sim((3, 3, 3));
        sim.place_part("GROUND", TilePos::new(0, 0, 0)).unwrap();
        let json = sim.snapshot_json();
        assert!(json.contains("parts"));
        assert!(json.contains("GROUND"));
    }
}
