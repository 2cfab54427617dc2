//! Core value types and ECS components for the map-part simulation.
//!
//! Plain data lives here: coordinates, identifiers, categories and the small
//! enums the structural core passes around. All structural logic lives in
//! `battlescape`, `support`, `collapse` and `fall`.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL TYPES
// ============================================================================

/// Integer cell coordinate on the battlescape (x = east, y = south, z = up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Position of a part resting in this cell: centred in x/y, on the floor in z.
    pub fn resting_position(&self) -> WorldPos {
        WorldPos::new(self.x as f32 + 0.5, self.y as f32 + 0.5, self.z as f32)
    }
}

/// Fractional position in cell units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing this position.
    pub fn tile(&self) -> TilePos {
        TilePos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Stable identifier of a placed map part. Never reused within a battlescape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartId(pub u32);

/// Index of a descriptor in the [`PartCatalog`](crate::catalog::PartCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

/// Identifier of a door in the door table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoorId(pub u32);

/// Key into the external damage-modifier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct DamageModifier(pub u16);

// ============================================================================
// STRUCTURAL ENUMS
// ============================================================================

/// Which slot of a cell a map part occupies.
///
/// Left walls lie on the west edge of a cell and run north/south; right walls
/// lie on the north edge and run east/west.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartCategory {
    Ground,
    Feature,
    LeftWall,
    RightWall,
}

impl PartCategory {
    pub const ALL: [PartCategory; 4] = [
        PartCategory::Ground,
        PartCategory::Feature,
        PartCategory::LeftWall,
        PartCategory::RightWall,
    ];

    pub fn is_wall(&self) -> bool {
        matches!(self, PartCategory::LeftWall | PartCategory::RightWall)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartCategory::Ground => "Ground",
            PartCategory::Feature => "Feature",
            PartCategory::LeftWall => "LeftWall",
            PartCategory::RightWall => "RightWall",
        }
    }
}

/// Compass direction on the map plane. North is -y, east is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapDirection {
    North,
    East,
    South,
    West,
}

/// A recorded dependent: "the part of `category` at `pos` leans on me".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportEdge {
    pub pos: TilePos,
    pub category: PartCategory,
}

impl SupportEdge {
    pub fn new(pos: TilePos, category: PartCategory) -> Self {
        Self { pos, category }
    }
}

/// Which descriptor family is currently active for a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartForm {
    #[default]
    Intact,
    /// Switched to the type's damaged variant.
    Damaged,
    /// Floor tile replaced by its destroyed-ground variant.
    DestroyedGround,
    /// Debris deposited by a falling part; `stage` indexes the progression.
    Rubble { stage: usize },
}

impl PartForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartForm::Intact => "Intact",
            PartForm::Damaged => "Damaged",
            PartForm::DestroyedGround => "DestroyedGround",
            PartForm::Rubble { .. } => "Rubble",
        }
    }
}

/// How a part ended up supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportKind {
    /// Floating type or resting on the map floor; needs nothing.
    Anchored,
    /// Direct geometric or declared-direction support.
    Hard,
    /// Clinging to lateral neighbours or bridged by a support ray.
    Soft,
}

impl SupportKind {
    pub fn is_hard(&self) -> bool {
        !matches!(self, SupportKind::Soft)
    }
}

/// Visual effects the core asks the presentation layer to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// A part destroyed in place.
    ExplodingTerrain,
    /// Rubble deposited or piled higher by a falling part.
    RubbleDust,
}

/// Result of a projectile hitting a map part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactOutcome {
    /// Part already gone or falling.
    Ignored,
    /// Damage did not exceed constitution.
    Absorbed,
    /// Damage exceeded constitution and the part went through `die`.
    Destroyed,
}

// ============================================================================
// ECS COMPONENTS
// ============================================================================

/// A projectile impact awaiting resolution this tick.
///
/// Spawned as its own entity and despawned by `projectile_impact_system`.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectileImpact {
    pub target: PartId,
    /// Raw damage before the damage model and the 50-150% roll.
    pub damage: i32,
}

impl ProjectileImpact {
    pub fn new(target: PartId, damage: i32) -> Self {
        Self { target, damage }
    }
}

/// A loose item lying in a cell, owned by the item collaborator.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestingItem {
    pub id: u32,
    pub tile: TilePos,
}

/// Marker asking the item collaborator to re-check this item's support.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ItemCollapseRequest;
