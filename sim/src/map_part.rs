//! A placed map part: the mutable unit of the structural simulation.

use crate::components::{DoorId, PartCategory, PartForm, PartId, SupportEdge, TilePos, TypeId, WorldPos};
use serde::{Deserialize, Serialize};

/// Membership of a part in a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorLink {
    pub door: DoorId,
    /// Descriptor shown while the part works as a door.
    pub alternative_type: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPart {
    pub id: PartId,
    /// Active descriptor in the catalog.
    pub type_id: TypeId,
    pub form: PartForm,
    /// Fixed at placement; the grid slot this part occupies.
    pub category: PartCategory,
    pub position: WorldPos,
    pub door: Option<DoorLink>,
    pub damaged: bool,
    pub destroyed: bool,
    pub falling: bool,
    pub provides_hard_support: bool,
    /// Loose items rest on this part.
    pub supported_items: bool,
    pub ticks_until_collapse: u32,
    pub falling_speed: f32,
    pub animation_frame_ticks: u32,
    /// Dependents this part is holding up.
    pub supported_parts: Vec<SupportEdge>,
    /// Cell occupied in the grid; `None` once removed from the map.
    pub tile: Option<TilePos>,
}

impl MapPart {
    pub(crate) fn new(id: PartId, type_id: TypeId, category: PartCategory, position: WorldPos) -> Self {
        Self {
            id,
            type_id,
            form: PartForm::Intact,
            category,
            position,
            door: None,
            damaged: false,
            destroyed: false,
            falling: false,
            provides_hard_support: false,
            supported_items: false,
            ticks_until_collapse: 0,
            falling_speed: 0.0,
            animation_frame_ticks: 0,
            supported_parts: Vec::new(),
            tile: None,
        }
    }

    /// Collapse countdown is running.
    #[inline]
    pub fn will_collapse(&self) -> bool {
        self.ticks_until_collapse > 0
    }

    /// Can act as a support source: not falling, destroyed or collapse-pending.
    #[inline]
    pub fn is_alive(&self) -> bool {
        !(self.falling || self.destroyed || self.will_collapse())
    }

    #[inline]
    pub fn on_map(&self) -> bool {
        self.tile.is_some()
    }

    /// Descriptor driving animation: the door's alternative while linked.
    pub fn display_type(&self) -> TypeId {
        self.door
            .and_then(|d| d.alternative_type)
            .unwrap_or(self.type_id)
    }

    pub(crate) fn add_edge(&mut self, edge: SupportEdge) {
        self.supported_parts.push(edge);
    }

    /// Drop every edge pointing at `edge`. Returns how many were removed.
    pub(crate) fn remove_edge(&mut self, edge: SupportEdge) -> usize {
        let before = self.supported_parts.len();
        self.supported_parts.retain(|e| *e != edge);
        before - self.supported_parts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part() -> MapPart {
        MapPart::new(PartId(1), TypeId(0), PartCategory::Feature, WorldPos::new(0.5, 0.5, 1.0))
    }

    #[test]
    fn test_collapse_pending_is_not_alive() {
        let mut p = part();
        assert!(p.is_alive());
        p.ticks_until_collapse = 3;
        assert!(p.will_collapse());
        assert!(!p.is_alive());
    }

    #[test]
    fn test_terminal_states_not_alive() {
        let mut p = part();
        p.falling = true;
        assert!(!p.is_alive());

        let mut p = part();
        p.destroyed = true;
        assert!(!p.is_alive());
    }

    #[test]
    fn test_remove_edge_removes_duplicates() {
        let mut p = part();
        let e = SupportEdge::new(TilePos::new(1, 1, 2), PartCategory::Feature);
        p.add_edge(e);
        p.add_edge(e);
        p.add_edge(SupportEdge::new(TilePos::new(2, 1, 2), PartCategory::Feature));

        assert_eq!(p.remove_edge(e), 2);
        assert_eq!(p.supported_parts.len(), 1);
        assert_eq!(p.remove_edge(e), 0);
    }

    #[test]
    fn test_display_type_uses_door_alternative() {
        let mut p = part();
        assert_eq!(p.display_type(), TypeId(0));
        p.door = Some(DoorLink {
            door: DoorId(0),
            alternative_type: Some(TypeId(5)),
        });
        assert_eq!(p.display_type(), TypeId(5));
    }
}
