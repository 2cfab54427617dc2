//! Error types for the structural core.
//!
//! None of these escape a simulation tick. Callers inside the core log them and
//! fall back to a concrete state transition (usually "no support found").

use crate::components::{DoorId, PartCategory, PartId, TilePos, TypeId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StructureError {
    #[error("map part {0:?} does not exist")]
    MissingPart(PartId),
    #[error("door {0:?} does not exist")]
    MissingDoor(DoorId),
    #[error("map part {0:?} has no grid presence")]
    NotOnMap(PartId),
    #[error("tile {0:?} is outside the map")]
    OutOfBounds(TilePos),
    #[error("map part disappeared? no {category:?} at {pos:?}")]
    OccupantVanished { pos: TilePos, category: PartCategory },
    #[error("unknown map part type {0:?}")]
    UnknownType(TypeId),
    #[error("no map part type named {0}")]
    UnknownTypeName(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("type {owner} references unknown type index {index}")]
    UnknownReference { owner: String, index: u32 },
    #[error("type {owner} names {variant} as a variant but their categories differ ({expected:?} vs {found:?})")]
    CategoryMismatch {
        owner: String,
        variant: String,
        expected: PartCategory,
        found: PartCategory,
    },
    #[error("type {owner} references unknown type {name}")]
    UnknownName { owner: String, name: String },
    #[error("duplicate type name {0}")]
    DuplicateName(String),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type StructureResult<T> = Result<T, StructureError>;
