//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the battlescape that
//! a presentation layer can consume once per fixed update.

use crate::battlescape::{Battlescape, MapPartEvent};
use crate::components::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single map part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapPartSnapshot {
    pub id: u32,
    pub type_name: String,
    pub category: PartCategory,
    /// `None` once the part has left the map.
    pub tile: Option<TilePos>,
    pub position: WorldPos,
    pub form: String,
    pub damaged: bool,
    pub falling: bool,
    pub hard_support: bool,
    pub ticks_until_collapse: u32,
    pub animation_frame: Option<u32>,
    /// Number of dependents this part holds up.
    pub supports: usize,
}

/// A visual effect requested this tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSnapshot {
    pub kind: EffectKind,
    pub position: WorldPos,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// Every part still on the map, in id order.
    pub parts: Vec<MapPartSnapshot>,
    /// Effects emitted during the last fixed update.
    pub effects: Vec<EffectSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the battlescape and this tick's events.
    pub fn from_battlescape(scape: &Battlescape, events: &[MapPartEvent], tick: u64, time: f32) -> Self {
        let parts = scape
            .parts()
            .filter(|p| p.on_map() && !p.destroyed)
            .map(|p| MapPartSnapshot {
                id: p.id.0,
                type_name: scape
                    .type_of(p.id)
                    .map(|t| t.id.clone())
                    .unwrap_or_default(),
                category: p.category,
                tile: p.tile,
                position: p.position,
                form: p.form.as_str().to_string(),
                damaged: p.damaged,
                falling: p.falling,
                hard_support: p.provides_hard_support,
                ticks_until_collapse: p.ticks_until_collapse,
                animation_frame: scape.animation_frame(p.id),
                supports: p.supported_parts.len(),
            })
            .collect();

        let effects = events
            .iter()
            .filter_map(|e| match e {
                MapPartEvent::Effect { kind, position } => Some(EffectSnapshot {
                    kind: *kind,
                    position: *position,
                }),
                _ => None,
            })
            .collect();

        Self {
            tick,
            time,
            parts,
            effects,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
