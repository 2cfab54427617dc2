//! Shared catalog and battlescape builders for unit tests.

use crate::battlescape::Battlescape;
use crate::catalog::{CatalogBuilder, MapPartType};
use crate::components::{DamageModifier, MapDirection, PartCategory, PartId, TilePos, TypeId};
use crate::config::StructureConfig;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Types {
    pub ground: TypeId,
    pub destroyed_ground: TypeId,
    pub column: TypeId,
    pub crate_box: TypeId,
    pub crate_damaged: TypeId,
    pub beam: TypeId,
    pub lamp: TypeId,
    pub left_wall: TypeId,
    pub right_wall: TypeId,
    pub rubble: [TypeId; 3],
}

pub(crate) fn catalog() -> (CatalogBuilder, Types) {
    let mut b = CatalogBuilder::new();
    let rubble = [
        b.add(MapPartType::new("RUBBLE_1", PartCategory::Feature).providing_support()),
        b.add(MapPartType::new("RUBBLE_2", PartCategory::Feature).providing_support()),
        b.add(MapPartType::new("RUBBLE_3", PartCategory::Feature).providing_support()),
    ];
    let destroyed_ground = b.add(MapPartType::new("DESTROYED_GROUND", PartCategory::Ground).providing_support());
    let ground = b.add(
        MapPartType::new("GROUND", PartCategory::Ground)
            .providing_support()
            .with_constitution(10)
            .with_destroyed_ground(destroyed_ground)
            .with_rubble(rubble.to_vec()),
    );
    let column = b.add(
        MapPartType::new("COLUMN", PartCategory::Feature)
            .providing_support()
            .with_constitution(20)
            .with_rubble(rubble.to_vec()),
    );
    let crate_damaged = b.add(MapPartType::new("CRATE_DAMAGED", PartCategory::Feature).with_constitution(2));
    let crate_box = b.add(
        MapPartType::new("CRATE", PartCategory::Feature)
            .with_constitution(5)
            .with_damage_modifier(DamageModifier(1))
            .with_damaged(crate_damaged),
    );
    let beam = b.add(
        MapPartType::new("BEAM", PartCategory::Feature)
            .providing_support()
            .supported_by(&[MapDirection::East, MapDirection::West], &[]),
    );
    let lamp = b.add(MapPartType::new("LAMP", PartCategory::Feature).floating().with_animation_frames(4));
    let left_wall = b.add(
        MapPartType::new("LEFT_WALL", PartCategory::LeftWall)
            .providing_support()
            .with_constitution(15)
            .with_rubble(rubble.to_vec()),
    );
    let right_wall = b.add(
        MapPartType::new("RIGHT_WALL", PartCategory::RightWall)
            .providing_support()
            .with_constitution(15),
    );
    (
        b,
        Types {
            ground,
            destroyed_ground,
            column,
            crate_box,
            crate_damaged,
            beam,
            lamp,
            left_wall,
            right_wall,
            rubble,
        },
    )
}

pub(crate) fn scape(size: (i32, i32, i32)) -> (Battlescape, Types) {
    let (b, t) = catalog();
    let catalog = Arc::new(b.build().expect("fixture catalog is valid"));
    (Battlescape::new(catalog, size, StructureConfig::default()), t)
}

pub(crate) fn place(bs: &mut Battlescape, type_id: TypeId, x: i32, y: i32, z: i32) -> PartId {
    bs.add_to_map(type_id, TilePos::new(x, y, z))
        .expect("fixture placement is in bounds")
}
