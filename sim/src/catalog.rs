//! Map-part type catalog.
//!
//! Descriptors are immutable once the catalog is built and are shared between
//! every placed part through an `Arc<PartCatalog>`. A part never owns its
//! descriptor; it holds a [`TypeId`] and swaps that index when it is damaged,
//! reduced to destroyed ground, or piled up as rubble.
//!
//! Catalogs can be built in code through [`CatalogBuilder`] or loaded from
//! JSON, where variant references are written as type names:
//!
//! ```json
//! { "types": [
//!   { "id": "RUBBLE_1", "category": "Feature", "floating": false },
//!   { "id": "BRICK_WALL", "category": "LeftWall", "provides_support": true,
//!     "constitution": 20, "rubble": ["RUBBLE_1"] }
//! ] }
//! ```

use crate::components::{DamageModifier, MapDirection, PartCategory, TypeId};
use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared descriptor for one kind of map part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPartType {
    /// Human-readable name, unique within a catalog.
    pub id: String,
    pub category: PartCategory,
    /// Never needs support.
    pub floating: bool,
    /// May hold up parts above it.
    pub provides_support: bool,
    /// May hang from a part of the matching kind one level above.
    pub supported_by_above: bool,
    pub supported_by_directions: Vec<MapDirection>,
    pub supported_by_types: Vec<PartCategory>,
    /// Damage must exceed this to destroy the part.
    pub constitution: i32,
    pub damage_modifier: DamageModifier,
    pub damaged_map_part: Option<TypeId>,
    pub destroyed_ground_tile: Option<TypeId>,
    /// Successive debris stages deposited when this part lands after falling.
    pub rubble: Vec<TypeId>,
    pub animation_frames: u32,
}

impl MapPartType {
    pub fn new(id: impl Into<String>, category: PartCategory) -> Self {
        Self {
            id: id.into(),
            category,
            floating: false,
            provides_support: false,
            supported_by_above: false,
            supported_by_directions: Vec::new(),
            supported_by_types: Vec::new(),
            constitution: 0,
            damage_modifier: DamageModifier::default(),
            damaged_map_part: None,
            destroyed_ground_tile: None,
            rubble: Vec::new(),
            animation_frames: 0,
        }
    }

    pub fn floating(mut self) -> Self {
        self.floating = true;
        self
    }

    pub fn providing_support(mut self) -> Self {
        self.provides_support = true;
        self
    }

    pub fn supported_by_above(mut self) -> Self {
        self.supported_by_above = true;
        self
    }

    pub fn supported_by(mut self, directions: &[MapDirection], types: &[PartCategory]) -> Self {
        self.supported_by_directions = directions.to_vec();
        self.supported_by_types = types.to_vec();
        self
    }

    pub fn with_constitution(mut self, constitution: i32) -> Self {
        self.constitution = constitution;
        self
    }

    pub fn with_damage_modifier(mut self, modifier: DamageModifier) -> Self {
        self.damage_modifier = modifier;
        self
    }

    pub fn with_damaged(mut self, damaged: TypeId) -> Self {
        self.damaged_map_part = Some(damaged);
        self
    }

    pub fn with_destroyed_ground(mut self, destroyed: TypeId) -> Self {
        self.destroyed_ground_tile = Some(destroyed);
        self
    }

    pub fn with_rubble(mut self, rubble: Vec<TypeId>) -> Self {
        self.rubble = rubble;
        self
    }

    pub fn with_animation_frames(mut self, frames: u32) -> Self {
        self.animation_frames = frames;
        self
    }

    /// Position of `type_id` within this type's rubble progression.
    pub fn rubble_stage_of(&self, type_id: TypeId) -> Option<usize> {
        self.rubble.iter().position(|t| *t == type_id)
    }
}

/// Immutable table of map-part descriptors.
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    types: Vec<MapPartType>,
    by_name: HashMap<String, TypeId>,
}

impl PartCatalog {
    /// Build and validate a catalog. `TypeId(i)` refers to `types[i]`.
    pub fn new(types: Vec<MapPartType>) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(types.len());
        for (i, t) in types.iter().enumerate() {
            if by_name.insert(t.id.clone(), TypeId(i as u32)).is_some() {
                return Err(CatalogError::DuplicateName(t.id.clone()));
            }
        }
        let catalog = Self { types, by_name };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from JSON. Variant references are type names.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let index: HashMap<&str, u32> = file
            .types
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.as_str(), i as u32))
            .collect();

        let resolve = |owner: &str, name: &str| -> Result<TypeId, CatalogError> {
            index
                .get(name)
                .map(|i| TypeId(*i))
                .ok_or_else(|| CatalogError::UnknownName {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
        };

        let mut types = Vec::with_capacity(file.types.len());
        for def in &file.types {
            let damaged = match &def.damaged_map_part {
                Some(name) => Some(resolve(&def.id, name)?),
                None => None,
            };
            let destroyed = match &def.destroyed_ground_tile {
                Some(name) => Some(resolve(&def.id, name)?),
                None => None,
            };
            let rubble = def
                .rubble
                .iter()
                .map(|name| resolve(&def.id, name))
                .collect::<Result<Vec<_>, _>>()?;

            types.push(MapPartType {
                id: def.id.clone(),
                category: def.category,
                floating: def.floating,
                provides_support: def.provides_support,
                supported_by_above: def.supported_by_above,
                supported_by_directions: def.supported_by_directions.clone(),
                supported_by_types: def.supported_by_types.clone(),
                constitution: def.constitution,
                damage_modifier: def.damage_modifier,
                damaged_map_part: damaged,
                destroyed_ground_tile: destroyed,
                rubble,
                animation_frames: def.animation_frames,
            });
        }
        Self::new(types)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for t in &self.types {
            let check_ref = |r: TypeId| -> Result<&MapPartType, CatalogError> {
                self.types
                    .get(r.0 as usize)
                    .ok_or_else(|| CatalogError::UnknownReference {
                        owner: t.id.clone(),
                        index: r.0,
                    })
            };
            for variant in [t.damaged_map_part, t.destroyed_ground_tile].into_iter().flatten() {
                let v = check_ref(variant)?;
                if v.category != t.category {
                    return Err(CatalogError::CategoryMismatch {
                        owner: t.id.clone(),
                        variant: v.id.clone(),
                        expected: t.category,
                        found: v.category,
                    });
                }
            }
            let mut rubble_category = None;
            for stage in &t.rubble {
                let r = check_ref(*stage)?;
                match rubble_category {
                    None => rubble_category = Some(r.category),
                    Some(expected) if expected != r.category => {
                        return Err(CatalogError::CategoryMismatch {
                            owner: t.id.clone(),
                            variant: r.id.clone(),
                            expected,
                            found: r.category,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: TypeId) -> Option<&MapPartType> {
        self.types.get(id.0 as usize)
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &MapPartType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeId(i as u32), t))
    }
}

/// Incremental catalog construction for code-defined maps and tests.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    types: Vec<MapPartType>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, t: MapPartType) -> TypeId {
        self.types.push(t);
        TypeId(self.types.len() as u32 - 1)
    }

    /// Edit an already added type, e.g. to link a variant added later.
    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut MapPartType> {
        self.types.get_mut(id.0 as usize)
    }

    pub fn build(self) -> Result<PartCatalog, CatalogError> {
        PartCatalog::new(self.types)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    types: Vec<TypeDef>,
}

#[derive(Deserialize)]
struct TypeDef {
    id: String,
    category: PartCategory,
    #[serde(default)]
    floating: bool,
    #[serde(default)]
    provides_support: bool,
    #[serde(default)]
    supported_by_above: bool,
    #[serde(default)]
    supported_by_directions: Vec<MapDirection>,
    #[serde(default)]
    supported_by_types: Vec<PartCategory>,
    #[serde(default)]
    constitution: i32,
    #[serde(default)]
    damage_modifier: DamageModifier,
    #[serde(default)]
    damaged_map_part: Option<String>,
    #[serde(default)]
    destroyed_ground_tile: Option<String>,
    #[serde(default)]
    rubble: Vec<String>,
    #[serde(default)]
    animation_frames: u32,
}
