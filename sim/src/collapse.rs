//! Collapse propagation.
//!
//! When a part stops providing support, everything leaning on it is queued to
//! collapse and then re-resolved as a worklist until nothing changes. Parts
//! that find new support are rescued along with their own dependents; the
//! rest stay collapse-pending and fall once their countdown runs out.

use crate::battlescape::{Battlescape, MapPartEvent};
use crate::components::PartId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// What one re-link pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelinkReport {
    pub iterations: usize,
    /// Parts that found new support and had their countdown cancelled.
    pub rescued: BTreeSet<PartId>,
    /// Parts left collapse-pending when the pass ended.
    pub pending: BTreeSet<PartId>,
    /// Every part the pass queued or re-resolved.
    pub visited: BTreeSet<PartId>,
}

impl Battlescape {
    /// Live parts currently recorded as leaning on `id`.
    pub fn supported_parts_of(&self, id: PartId) -> BTreeSet<PartId> {
        let Some(part) = self.part(id) else {
            return BTreeSet::new();
        };
        part.supported_parts
            .iter()
            .flat_map(|edge| {
                self.grid()
                    .occupants(edge.pos)
                    .iter()
                    .filter(move |o| o.category == edge.category)
                    .map(|o| o.part)
            })
            .filter(|dep| {
                self.part(*dep)
                    .is_some_and(|p| p.on_map() && !p.falling && !p.destroyed)
            })
            .collect()
    }

    /// Start the collapse countdown. Clears hard support.
    pub fn queue_collapse(&mut self, id: PartId, extra_delay: u32) {
        let delay = self.config().collapse_delay_ticks + extra_delay;
        if let Some(part) = self.part_mut(id) {
            part.ticks_until_collapse = delay;
            part.provides_hard_support = false;
        }
    }

    /// Stop a running countdown. Safe on parts that are not pending.
    pub fn cancel_collapse(&mut self, id: PartId) {
        if let Some(part) = self.part_mut(id) {
            part.ticks_until_collapse = 0;
        }
    }

    /// Stop holding anything up: re-link dependents and loosen resting items.
    pub fn cease_support_provision(&mut self, id: PartId) -> RelinkReport {
        self.set_hard_support(id, false);
        let dependents = self.supported_parts_of(id);
        let report = self.attempt_relink_supports(dependents);

        let mut loosened = None;
        if let Some(part) = self.part_mut(id) {
            part.supported_parts.clear();
            if part.supported_items {
                part.supported_items = false;
                loosened = part.tile;
            }
        }
        if let Some(tile) = loosened {
            self.emit(MapPartEvent::ItemsLoosened { tile });
        }
        report
    }

    /// Queue `set` to collapse, then re-resolve it to a fixed point.
    pub fn attempt_relink_supports(&mut self, set: BTreeSet<PartId>) -> RelinkReport {
        let mut report = RelinkReport::default();
        if set.is_empty() {
            return report;
        }

        for &id in &set {
            self.queue_collapse(id, 0);
        }

        let cap = self.on_map_count().max(1);
        let mut working = set;
        loop {
            report.iterations += 1;
            debug!(
                "Re-link iteration {}: {} parts in working set",
                report.iterations,
                working.len()
            );

            let mut next = BTreeSet::new();
            let mut changed = false;
            for &id in &working {
                report.visited.insert(id);
                let delay = self.part(id).map(|p| p.ticks_until_collapse).unwrap_or(0);
                let dependents = self.supported_parts_of(id);
                for &dep in &dependents {
                    self.queue_collapse(dep, delay);
                    report.visited.insert(dep);
                }

                if self.find_support(id) {
                    self.cancel_collapse(id);
                    for &dep in &dependents {
                        self.cancel_collapse(dep);
                    }
                    report.rescued.insert(id);
                    changed = true;
                } else {
                    if let Some(part) = self.part_mut(id) {
                        part.supported_parts.clear();
                    }
                    next.insert(id);
                    if !dependents.is_empty() {
                        changed = true;
                    }
                    next.extend(dependents);
                }
            }

            working = next;
            if !changed || working.is_empty() {
                break;
            }
            if report.iterations >= cap {
                warn!(
                    "Re-link stopped after {} iterations with {} parts unresolved",
                    report.iterations,
                    working.len()
                );
                break;
            }
        }

        report.pending = working
            .into_iter()
            .filter(|id| self.part(*id).is_some_and(|p| p.on_map() && p.will_collapse()))
            .collect();
        // A part rescued early may have been re-queued through a later failure.
        report.rescued.retain(|id| !report.pending.contains(id));

        for id in &report.pending {
            if let Some(part) = self.part(*id) {
                info!(
                    "Map part {:?} ({}) at {:?} is going to fall",
                    id,
                    self.type_of(*id).map(|t| t.id.as_str()).unwrap_or("?"),
                    part.tile
                );
            }
        }
        report
    }
}
