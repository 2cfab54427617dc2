//! Door membership.
//!
//! Opening and closing doors belongs to the door collaborator; the structural
//! core only needs to know which parts belong to which door so it can detach
//! them when they stop working as a door (damage, collapse, destruction).

use crate::battlescape::Battlescape;
use crate::components::{DoorId, PartId, TypeId};
use crate::error::{StructureError, StructureResult};
use crate::map_part::DoorLink;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub parts: Vec<PartId>,
    /// Current frame, driven by the door collaborator.
    pub animation_frame: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DoorTable {
    doors: BTreeMap<DoorId, Door>,
    next_id: u32,
}

impl DoorTable {
    pub fn create(&mut self) -> DoorId {
        let id = DoorId(self.next_id);
        self.next_id += 1;
        self.doors.insert(
            id,
            Door {
                id,
                parts: Vec::new(),
                animation_frame: 0,
            },
        );
        id
    }

    pub fn get(&self, id: DoorId) -> Option<&Door> {
        self.doors.get(&id)
    }

    pub fn get_mut(&mut self, id: DoorId) -> Option<&mut Door> {
        self.doors.get_mut(&id)
    }
}

impl Battlescape {
    pub fn create_door(&mut self) -> DoorId {
        self.doors.create()
    }

    pub fn door(&self, id: DoorId) -> Option<&Door> {
        self.doors.get(id)
    }

    pub fn set_door_frame(&mut self, id: DoorId, frame: u32) {
        if let Some(door) = self.doors.get_mut(id) {
            door.animation_frame = frame;
        }
    }

    /// Make a part a member of a door, optionally shown as `alternative_type`.
    pub fn attach_to_door(
        &mut self,
        part: PartId,
        door: DoorId,
        alternative_type: Option<TypeId>,
    ) -> StructureResult<()> {
        if let Some(t) = alternative_type {
            self.type_by_id(t)?;
        }
        if self.doors.get(door).is_none() {
            return Err(StructureError::MissingDoor(door));
        }
        let p = self.part_mut(part).ok_or(StructureError::MissingPart(part))?;
        p.door = Some(DoorLink {
            door,
            alternative_type,
        });
        if let Some(d) = self.doors.get_mut(door) {
            if !d.parts.contains(&part) {
                d.parts.push(part);
            }
        }
        Ok(())
    }

    /// Stop a part working as a door. No-op for non-members.
    pub fn cease_door_function(&mut self, part: PartId) {
        let Some(link) = self.part_mut(part).and_then(|p| p.door.take()) else {
            return;
        };
        if let Some(door) = self.doors.get_mut(link.door) {
            door.parts.retain(|p| *p != part);
        }
    }
}
