//! Map-part structural simulation core.
//!
//! Decides whether each piece of destructible battlescape terrain is held up,
//! propagates collapse when a supporter goes away, and drives falling parts
//! into rubble. Uses `bevy_ecs` for the fixed-timestep driver around the core.

pub mod api;
pub mod battlescape;
pub mod catalog;
pub mod collapse;
pub mod components;
pub mod config;
pub mod damage;
pub mod doors;
pub mod error;
pub mod fall;
pub mod grid;
pub mod logging;
pub mod map_part;
pub mod rng;
pub mod support;
pub mod systems;
pub mod world;

#[cfg(test)]
mod fixtures;

pub use api::SimWorld;
pub use battlescape::{Battlescape, MapPartEvent};
pub use catalog::{CatalogBuilder, MapPartType, PartCatalog};
pub use collapse::RelinkReport;
pub use components::*;
pub use config::{SimConfig, StructureConfig};
pub use damage::{DamageModel, DamageModelResource, PercentTable, UnmodifiedDamage};
pub use error::{CatalogError, StructureError, StructureResult};
pub use logging::{init_tracing, init_tracing_default, TracingConfig};
pub use map_part::MapPart;
pub use rng::SimRng;
pub use support::SettleReport;
pub use systems::*;
pub use world::Snapshot;
