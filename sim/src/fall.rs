//! Per-tick integration: collapse countdowns, falling, rubble and destruction.
//!
//! ```text
//! Stable --queue_collapse--> CollapsePending --countdown--> Falling --impact--> Destroyed
//!   |                              ^
//!   +--die (damaged, unsupported)--+
//! ```

use crate::battlescape::{Battlescape, MapPartEvent};
use crate::components::{EffectKind, ImpactOutcome, PartCategory, PartForm, PartId, TilePos, TypeId};
use crate::damage::DamageModel;
use crate::rng::SimRng;
use tracing::{debug, error};

impl Battlescape {
    /// Advance every part by `ticks`, in id order.
    pub fn update(&mut self, ticks: u32) {
        for id in self.part_ids() {
            self.update_part(id, ticks);
        }
    }

    pub fn update_part(&mut self, id: PartId, ticks: u32) {
        let Some(part) = self.part(id) else {
            return;
        };
        if !part.on_map() {
            return;
        }

        let countdown = part.ticks_until_collapse;
        if countdown > 0 {
            if countdown > ticks {
                if let Some(part) = self.part_mut(id) {
                    part.ticks_until_collapse -= ticks;
                }
            } else {
                self.cancel_collapse(id);
                self.collapse(id);
            }
        }

        let Some(part) = self.part(id) else {
            return;
        };
        if part.falling {
            self.fall(id, ticks);
            return;
        }

        if part.door.is_none() {
            let frames = self.type_of(id).map(|t| t.animation_frames).unwrap_or(0);
            let cycle = self.config().ticks_per_frame.max(1) * frames;
            if cycle > 0 {
                if let Some(part) = self.part_mut(id) {
                    part.animation_frame_ticks = (part.animation_frame_ticks + ticks) % cycle;
                }
            }
        }
    }

    /// Countdown elapsed: detach from everything and start falling.
    pub fn collapse(&mut self, id: PartId) {
        let Some(part) = self.part_mut(id) else {
            return;
        };
        if part.falling || !part.on_map() {
            return;
        }
        part.falling = true;

        self.purge_incoming_edges(id);
        self.cease_support_provision(id);
        self.cease_door_function(id);
        self.emit(MapPartEvent::StartedFalling { part: id });
    }

    /// Destroy a part, or reduce it to its damaged or destroyed-ground form.
    pub fn die(&mut self, id: PartId) {
        let Some(part) = self.part(id) else {
            return;
        };
        let Some(tile) = part.tile else {
            return;
        };

        if part.falling {
            self.remove_from_map(id);
            if let Some(part) = self.part_mut(id) {
                part.destroyed = true;
            }
            self.emit(MapPartEvent::Destroyed { part: id });
            return;
        }

        let position = part.position;
        let floor_ground = part.category == PartCategory::Ground && tile.z == 0;
        let (damaged_variant, destroyed_ground) = match self.type_of(id) {
            Some(t) => (t.damaged_map_part, t.destroyed_ground_tile),
            None => (None, None),
        };
        self.emit(MapPartEvent::Effect {
            kind: EffectKind::ExplodingTerrain,
            position,
        });

        let mut destroyed = false;
        match (damaged_variant, destroyed_ground) {
            (Some(variant), _) => {
                self.switch_type(id, variant, PartForm::Damaged);
                if self.find_support(id) {
                    if let Some(part) = self.part_mut(id) {
                        part.damaged = true;
                    }
                } else {
                    self.queue_collapse(id, 0);
                }
            }
            // Floor tiles are never removed.
            (None, Some(variant)) if floor_ground => {
                self.switch_type(id, variant, PartForm::DestroyedGround);
            }
            _ => {
                destroyed = true;
                if let Some(part) = self.part_mut(id) {
                    part.destroyed = true;
                }
            }
        }

        self.cease_door_function(id);
        self.cease_support_provision(id);

        if destroyed {
            self.remove_from_map(id);
            self.emit(MapPartEvent::Destroyed { part: id });
        }
    }

    /// A projectile hit the part.
    pub fn handle_collision(
        &mut self,
        id: PartId,
        raw_damage: i32,
        model: &dyn DamageModel,
        rng: &mut SimRng,
    ) -> ImpactOutcome {
        let Some(part) = self.part(id) else {
            return ImpactOutcome::Ignored;
        };
        // Several projectiles can hit the same part in one tick.
        if !part.on_map() || part.falling {
            return ImpactOutcome::Ignored;
        }
        let Some(ty) = self.type_of(id) else {
            return ImpactOutcome::Ignored;
        };
        let constitution = ty.constitution;

        let damage = rng.rand_damage_050_150(model.resolve(raw_damage, ty.damage_modifier));
        if damage <= constitution {
            return ImpactOutcome::Absorbed;
        }
        debug!("Map part {:?} took {} damage (constitution {})", id, damage, constitution);
        self.die(id);
        ImpactOutcome::Destroyed
    }

    fn switch_type(&mut self, id: PartId, type_id: TypeId, form: PartForm) {
        if let Some(part) = self.part_mut(id) {
            part.type_id = type_id;
            part.form = form;
        }
    }

    // ------------------------------------------------------------------
    // Falling
    // ------------------------------------------------------------------

    fn fall(&mut self, id: PartId, ticks: u32) {
        let Some(part) = self.part(id) else {
            return;
        };
        let Some(tile) = part.tile else {
            return;
        };
        let category = part.category;
        let mut position = part.position;
        let mut speed = part.falling_speed;

        let mut impact = None;
        'ticks: for _ in 0..ticks {
            speed += self.config().falling_acceleration;
            let from = position.z.floor() as i32;
            position.z -= self.config().fall_step(speed);
            let to = position.z.floor() as i32;

            for z in (to..from).rev() {
                if z < 0 {
                    impact = Some(TilePos::new(tile.x, tile.y, 0));
                    break 'ticks;
                }
                let cell = TilePos::new(tile.x, tile.y, z);
                if self.blocks_fall(id, cell, category) {
                    impact = Some(cell);
                    break 'ticks;
                }
            }
        }

        if let Some(part) = self.part_mut(id) {
            part.falling_speed = speed;
        }

        match impact {
            Some(cell) => {
                debug!("Falling map part {:?} hit {:?}", id, cell);
                self.deposit_rubble(id, cell);
                self.die(id);
            }
            None => {
                if let Err(e) = self.set_position(id, position) {
                    error!("Falling map part {:?} could not move: {}", id, e);
                }
            }
        }
    }

    /// A live Ground, or a live part of the falling category, stops the fall.
    fn blocks_fall(&self, id: PartId, cell: TilePos, category: PartCategory) -> bool {
        self.grid().occupants(cell).iter().any(|o| {
            o.part != id
                && (o.category == category || o.category == PartCategory::Ground)
                && self.part(o.part).is_some_and(|p| p.is_alive())
        })
    }

    /// Spawn or pile up the falling part's rubble in the impact cell.
    fn deposit_rubble(&mut self, id: PartId, cell: TilePos) {
        let Some(rubble) = self.type_of(id).map(|t| t.rubble.clone()) else {
            return;
        };
        let Some(first) = rubble.first().copied() else {
            return;
        };
        let Some(rubble_category) = self.catalog().get(first).map(|t| t.category) else {
            return;
        };

        let candidate = self.grid().occupants(cell).iter().find(|o| {
            o.part != id && o.category == rubble_category && self.part(o.part).is_some_and(|p| p.is_alive())
        });

        match candidate.map(|o| o.part) {
            None => match self.add_to_map(first, cell) {
                Ok(spawned) => {
                    self.switch_type(spawned, first, PartForm::Rubble { stage: 0 });
                    if !self.find_support(spawned) {
                        self.queue_collapse(spawned, 0);
                    }
                    self.emit_dust(cell);
                }
                Err(e) => error!("Could not spawn rubble at {:?}: {}", cell, e),
            },
            Some(existing) => {
                let stage = self
                    .part(existing)
                    .map(|p| p.type_id)
                    .and_then(|current| self.type_of(id).and_then(|t| t.rubble_stage_of(current)));
                // Anything outside the progression blocks the pile; the last stage caps it.
                if let Some(next) = stage.map(|s| s + 1).filter(|s| *s < rubble.len()) {
                    self.switch_type(existing, rubble[next], PartForm::Rubble { stage: next });
                    self.emit_dust(cell);
                }
            }
        }
    }

    fn emit_dust(&mut self, cell: TilePos) {
        self.emit(MapPartEvent::Effect {
            kind: EffectKind::RubbleDust,
            position: cell.resting_position(),
        });
    }
}
