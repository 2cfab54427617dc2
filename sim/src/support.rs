//! Support resolution.
//!
//! A part is held up by the first rule that succeeds, in this order:
//!
//! 1. Hard geometric rules over a narrowed 3x3x3 neighbourhood.
//! 2. The type's declared directions and supporting categories.
//! 3. Soft clinging to two lateral neighbours (map edges count as one each).
//! 4. Soft support lines: both rays along an axis end at a hard supporter or
//!    the map bound.
//!
//! Whatever supports a part records the edge `(tile, category)` of its
//! dependent. Edge lists never hold ids, only cells, so re-resolving a part
//! starts by purging those cells from the neighbourhood.

use crate::battlescape::Battlescape;
use crate::components::{MapDirection, PartCategory, PartId, SupportEdge, SupportKind, TilePos};
use crate::error::{StructureError, StructureResult};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::{debug, error};

/// The part being resolved, captured before any of its neighbours change.
struct Subject {
    id: PartId,
    pos: TilePos,
    category: PartCategory,
    supported_by_above: bool,
    directions: Vec<MapDirection>,
    types: Vec<PartCategory>,
}

impl Subject {
    fn edge(&self) -> SupportEdge {
        SupportEdge::new(self.pos, self.category)
    }
}

/// Outcome counts of [`Battlescape::settle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleReport {
    pub anchored: usize,
    pub hard: usize,
    pub soft: usize,
    /// Held only by the looser attachment fallback.
    pub attached: usize,
    /// Left without support and queued to collapse.
    pub queued: usize,
}

impl Battlescape {
    /// Remove every edge that points at this part's cell and category.
    pub fn purge_incoming_edges(&mut self, id: PartId) {
        let Some((tile, category)) = self.part(id).and_then(|p| p.tile.map(|t| (t, p.category))) else {
            return;
        };
        let edge = SupportEdge::new(tile, category);
        for neighbour in self.occupants_around(tile) {
            if let Some(part) = self.part_mut(neighbour) {
                part.remove_edge(edge);
            }
        }
    }

    /// Whether the part is currently supported. Registers the supporting edge.
    ///
    /// Invariant violations are logged and count as unsupported.
    pub fn find_support(&mut self, id: PartId) -> bool {
        match self.resolve_support(id) {
            Ok(kind) => kind.is_some(),
            Err(e) => {
                error!("Support resolution for {:?} aborted: {}", id, e);
                if let Some(part) = self.part_mut(id) {
                    part.provides_hard_support = false;
                }
                false
            }
        }
    }

    /// Resolve support for a part, reporting which kind was found.
    pub fn resolve_support(&mut self, id: PartId) -> StructureResult<Option<SupportKind>> {
        let part = self.require(id)?;
        let pos = part.tile.ok_or(StructureError::NotOnMap(id))?;
        let category = part.category;
        let ty = self.type_by_id(part.type_id)?;
        let floating = ty.floating;
        let subject = Subject {
            id,
            pos,
            category,
            supported_by_above: ty.supported_by_above,
            directions: ty.supported_by_directions.clone(),
            types: ty.supported_by_types.clone(),
        };

        self.set_hard_support(id, true);
        self.purge_incoming_edges(id);

        if floating || pos.z == 0 {
            return Ok(Some(SupportKind::Anchored));
        }

        if let Some(supporter) = self.hard_supporter(&subject) {
            self.register_edge(supporter, subject.edge());
            return Ok(Some(SupportKind::Hard));
        }

        if let Some(supporter) = self.directional_supporter(&subject) {
            self.register_edge(supporter, subject.edge());
            return Ok(Some(SupportKind::Hard));
        }

        self.set_hard_support(id, false);

        if let Some(supporters) = self.cling_supporters(&subject) {
            for supporter in supporters {
                self.register_edge(supporter, subject.edge());
            }
            return Ok(Some(SupportKind::Soft));
        }

        if let Some(supporters) = self.support_line(&subject)? {
            for supporter in supporters {
                self.register_edge(supporter, subject.edge());
            }
            return Ok(Some(SupportKind::Soft));
        }

        Ok(None)
    }

    /// Looser first-match attachment used when settling a freshly built map.
    ///
    /// With `check_type` only parts of the same category qualify; without it
    /// any category does, except that walls never hang off the other wall
    /// orientation.
    pub fn attach_to_something(&mut self, id: PartId, check_type: bool) -> bool {
        let Some((pos, category)) = self.part(id).and_then(|p| p.tile.map(|t| (t, p.category))) else {
            return false;
        };
        let directions: &[(i32, i32, i32)] = match category {
            PartCategory::LeftWall => &[(0, 0, -1), (0, -1, 0), (0, 1, 0), (0, 0, 1)],
            PartCategory::RightWall => &[(0, 0, -1), (1, 0, 0), (-1, 0, 0), (0, 0, 1)],
            PartCategory::Ground | PartCategory::Feature => &[
                (0, 0, -1),
                (0, -1, 0),
                (1, 0, 0),
                (0, 1, 0),
                (-1, 0, 0),
                (0, 0, 1),
            ],
        };

        for &(dx, dy, dz) in directions {
            let at = pos.offset(dx, dy, dz);
            let found = self.grid().occupants(at).iter().find(|o| {
                let accepted = o.category == category
                    || (!check_type
                        && match o.category {
                            PartCategory::Ground | PartCategory::Feature => true,
                            PartCategory::LeftWall => category != PartCategory::RightWall,
                            PartCategory::RightWall => category != PartCategory::LeftWall,
                        });
                accepted && self.can_support(o.part, id, at, pos.z)
            });
            if let Some(supporter) = found.map(|o| o.part) {
                self.register_edge(supporter, SupportEdge::new(pos, category));
                return true;
            }
        }
        false
    }

    /// Resolve every on-map part once, in id order.
    pub fn settle(&mut self) -> SettleReport {
        let mut report = SettleReport::default();
        for id in self.part_ids() {
            if !self.part(id).is_some_and(|p| p.on_map() && !p.falling) {
                continue;
            }
            match self.resolve_support(id) {
                Ok(Some(kind)) => {
                    self.rescue(id);
                    match kind {
                        SupportKind::Anchored => report.anchored += 1,
                        SupportKind::Hard => report.hard += 1,
                        SupportKind::Soft => report.soft += 1,
                    }
                }
                Ok(None) | Err(_) => {
                    if self.attach_to_something(id, true) || self.attach_to_something(id, false) {
                        self.rescue(id);
                        report.attached += 1;
                    } else {
                        self.queue_collapse(id, 0);
                        report.queued += 1;
                    }
                }
            }
        }
        debug!(
            "Settled map: {} anchored, {} hard, {} soft, {} attached, {} queued",
            report.anchored, report.hard, report.soft, report.attached, report.queued
        );
        report
    }

    /// Cancel the countdown of a part that found support, and of its dependents.
    fn rescue(&mut self, id: PartId) {
        self.cancel_collapse(id);
        for dep in self.supported_parts_of(id) {
            self.cancel_collapse(dep);
        }
    }

    // ------------------------------------------------------------------
    // Step 1: hard geometric rules
    // ------------------------------------------------------------------

    fn hard_supporter(&self, s: &Subject) -> Option<PartId> {
        let (xs, ys, zs) = hard_search_bounds(s.category, s.pos);
        for x in xs {
            for y in ys.clone() {
                for z in zs.clone() {
                    let at = TilePos::new(x, y, z);
                    let found = self.grid().occupants(at).iter().find(|o| {
                        hard_rule(s, at, o.category) && self.can_support(o.part, s.id, at, s.pos.z)
                    });
                    if let Some(o) = found {
                        return Some(o.part);
                    }
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Step 2: declared directions
    // ------------------------------------------------------------------

    fn directional_supporter(&self, s: &Subject) -> Option<PartId> {
        directional_probes(s).into_iter().find_map(|(at, category)| {
            self.grid()
                .occupants(at)
                .iter()
                .find(|o| o.category == category && self.can_support(o.part, s.id, at, s.pos.z))
                .map(|o| o.part)
        })
    }

    // ------------------------------------------------------------------
    // Step 3: soft clinging
    // ------------------------------------------------------------------

    fn cling_supporters(&self, s: &Subject) -> Option<Vec<PartId>> {
        let directions: &[(i32, i32)] = match s.category {
            PartCategory::LeftWall => &[(0, -1), (0, 1)],
            PartCategory::RightWall => &[(1, 0), (-1, 0)],
            PartCategory::Ground | PartCategory::Feature => &[(0, -1), (1, 0), (0, 1), (-1, 0)],
        };

        let mut found = Vec::new();
        for &(dx, dy) in directions {
            let at = s.pos.offset(dx, dy, 0);
            let supporter = self.grid().occupants(at).iter().find(|o| {
                let accepted =
                    o.category == s.category || (o.category == PartCategory::Feature && s.category.is_wall());
                accepted && self.can_support(o.part, s.id, at, s.pos.z)
            });
            if let Some(o) = supporter {
                found.push(o.part);
            }
        }

        let mut count = found.len();
        if self.grid().is_map_edge_x(s.pos) {
            count += 1;
        }
        if self.grid().is_map_edge_y(s.pos) {
            count += 1;
        }
        (count >= 2).then_some(found)
    }

    // ------------------------------------------------------------------
    // Step 4: support lines
    // ------------------------------------------------------------------

    /// Immediate neighbours on the first axis whose rays both succeed.
    fn support_line(&self, s: &Subject) -> StructureResult<Option<Vec<PartId>>> {
        let mut axes = Vec::with_capacity(2);
        if s.category != PartCategory::LeftWall {
            axes.push((1, 0));
        }
        if s.category != PartCategory::RightWall {
            axes.push((0, 1));
        }

        for (ax, ay) in axes {
            if !(self.ray_reaches_support(s, -ax, -ay) && self.ray_reaches_support(s, ax, ay)) {
                continue;
            }
            let mut neighbours = Vec::with_capacity(2);
            for sign in [-1, 1] {
                let at = s.pos.offset(ax * sign, ay * sign, 0);
                if !self.grid().in_bounds(at) {
                    continue;
                }
                let part = self
                    .grid()
                    .last_of(at, s.category)
                    .ok_or(StructureError::OccupantVanished {
                        pos: at,
                        category: s.category,
                    })?;
                neighbours.push(part);
            }
            return Ok(Some(neighbours));
        }
        Ok(None)
    }

    /// Walk outward until the map bound, a gap, or a hard supporter.
    fn ray_reaches_support(&self, s: &Subject, dx: i32, dy: i32) -> bool {
        let mut at = s.pos.offset(dx, dy, 0);
        loop {
            if !self.grid().in_bounds(at) {
                return true;
            }
            // The newest occupant decides. Collapse-pending parts may still be rescued, so they carry the line.
            let Some(part) = self.grid().last_of(at, s.category).and_then(|id| self.part(id)) else {
                return false;
            };
            if part.destroyed || part.damaged || part.falling {
                return false;
            }
            if part.provides_hard_support {
                return true;
            }
            at = at.offset(dx, dy, 0);
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// A live, undamaged candidate at `at` able to hold a part at `subject_z`.
    fn can_support(&self, candidate: PartId, subject: PartId, at: TilePos, subject_z: i32) -> bool {
        if candidate == subject {
            return false;
        }
        let Some(part) = self.part(candidate) else {
            return false;
        };
        let Some(ty) = self.catalog().get(part.type_id) else {
            return false;
        };
        part.is_alive()
            && !part.damaged
            && (part.category != PartCategory::Ground || at.z == subject_z)
            && (ty.provides_support || at.z <= subject_z)
    }

    pub(crate) fn register_edge(&mut self, supporter: PartId, edge: SupportEdge) {
        if let Some(part) = self.part_mut(supporter) {
            part.add_edge(edge);
        }
    }

    pub(crate) fn set_hard_support(&mut self, id: PartId, hard: bool) {
        if let Some(part) = self.part_mut(id) {
            part.provides_hard_support = hard;
        }
    }

    /// Every part in the 3x3x3 block centred on `tile`.
    fn occupants_around(&self, tile: TilePos) -> Vec<PartId> {
        let mut out = Vec::new();
        for x in tile.x - 1..=tile.x + 1 {
            for y in tile.y - 1..=tile.y + 1 {
                for z in tile.z - 1..=tile.z + 1 {
                    out.extend(self.grid().occupants(TilePos::new(x, y, z)).iter().map(|o| o.part));
                }
            }
        }
        out
    }
}

type Bounds = (RangeInclusive<i32>, RangeInclusive<i32>, RangeInclusive<i32>);

/// Cells inspected by the hard rules, narrowed per category.
fn hard_search_bounds(category: PartCategory, p: TilePos) -> Bounds {
    match category {
        // Current level and below.
        PartCategory::Ground => (p.x - 1..=p.x + 1, p.y - 1..=p.y + 1, p.z - 1..=p.z),
        // Own column.
        PartCategory::Feature => (p.x..=p.x, p.y..=p.y, p.z - 1..=p.z + 1),
        // Above, below and to the west.
        PartCategory::LeftWall => (p.x - 1..=p.x, p.y..=p.y, p.z - 1..=p.z + 1),
        // Above, below and to the north.
        PartCategory::RightWall => (p.x..=p.x, p.y - 1..=p.y, p.z - 1..=p.z + 1),
    }
}

fn hard_rule(s: &Subject, at: TilePos, candidate: PartCategory) -> bool {
    use PartCategory::*;
    let p = s.pos;
    match s.category {
        Ground => {
            let feature_in_column = at.x == p.x && at.y == p.y && candidate == Feature;
            let wall_below = (at.x >= p.x || at.y >= p.y)
                && at.z < p.z
                && ((at.x >= p.x && candidate == LeftWall) || (at.y >= p.y && candidate == RightWall));
            let feature_adjacent_below = (at.x == p.x || at.y == p.y) && at.z < p.z && candidate == Feature;
            feature_in_column || wall_below || feature_adjacent_below
        }
        Feature => {
            (at.z == p.z && candidate == Ground)
                || (at.z < p.z && candidate == Feature)
                || (at.z > p.z && candidate == Feature && s.supported_by_above)
        }
        LeftWall | RightWall => {
            let on_axis = if s.category == LeftWall { at.x == p.x } else { at.y == p.y };
            (at == p && candidate == Feature)
                || (at.z == p.z && candidate == Ground)
                || (at.z < p.z && candidate == Feature)
                || (on_axis && at.z < p.z && candidate == s.category)
                || (on_axis && at.z > p.z && candidate == s.category && s.supported_by_above)
        }
    }
}

/// Cells and categories probed for declared directional support, in order.
fn directional_probes(s: &Subject) -> Vec<(TilePos, PartCategory)> {
    use MapDirection::*;
    use PartCategory::*;

    let mut probes = Vec::new();
    if s.directions.is_empty() {
        return probes;
    }

    // Same category on the same level is always accepted.
    let mut kinds = vec![(0, s.category)];
    kinds.extend(s.types.iter().map(|t| match t {
        Feature => (-1, Feature),
        other => (0, *other),
    }));

    let p = s.pos;
    for &d in &s.directions {
        for &(dz, kind) in &kinds {
            if s.category == Feature && dz == 0 && kind == Feature {
                let (dx, dy, wall) = match d {
                    North => (0, 0, RightWall),
                    East => (1, 0, LeftWall),
                    South => (0, 1, RightWall),
                    West => (0, 0, LeftWall),
                };
                probes.push((p.offset(dx, dy, dz), wall));
            }

            // A wall never supports its own orientation along its running axis.
            let along_own_axis = (kind == RightWall && s.category == RightWall && matches!(d, North | South))
                || (kind == LeftWall && s.category == LeftWall && matches!(d, East | West));
            if along_own_axis {
                continue;
            }

            // North into a right wall and west into a left wall stay in this cell.
            let back = if (d == North && kind == RightWall) || (d == West && kind == LeftWall) {
                0
            } else {
                -1
            };
            let (dx, dy) = match d {
                North => (0, back),
                East => (1, 0),
                South => (0, 1),
                West => (back, 0),
            };
            probes.push((p.offset(dx, dy, dz), kind));

            if kind.is_wall() {
                continue;
            }
            for &d2 in &s.directions {
                let diagonal = match (d, d2) {
                    (North | South, East) => Some((1, dy)),
                    (North | South, West) => Some((-1, dy)),
                    (East | West, North) => Some((dx, -1)),
                    (East | West, South) => Some((dx, 1)),
                    _ => None,
                };
                if let Some((ddx, ddy)) = diagonal {
                    probes.push((p.offset(ddx, ddy, dz), kind));
                }
            }
        }
    }
    probes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{place, scape};

    fn edges_of(bs: &Battlescape, id: PartId) -> Vec<SupportEdge> {
        bs.part(id).unwrap().supported_parts.clone()
    }

    #[test]
    fn test_floor_and_floating_are_anchored() {
        let (mut bs, t) = scape((4, 4, 4));
        let ground = place(&mut bs, t.ground, 1, 1, 0);
        let lamp = place(&mut bs, t.lamp, 2, 2, 3);

        assert_eq!(bs.resolve_support(ground), Ok(Some(SupportKind::Anchored)));
        assert_eq!(bs.resolve_support(lamp), Ok(Some(SupportKind::Anchored)));
        assert!(bs.part(ground).unwrap().provides_hard_support);
        assert!(bs.parts().all(|p| p.supported_parts.is_empty()));
    }

    #[test]
    fn test_feature_on_ground_is_hard_supported() {
        let (mut bs, t) = scape((4, 4, 3));
        let ground = place(&mut bs, t.ground, 1, 1, 1);
        let column = place(&mut bs, t.column, 1, 1, 1);

        assert_eq!(bs.resolve_support(column), Ok(Some(SupportKind::Hard)));
        assert!(bs.part(column).unwrap().provides_hard_support);
        assert_eq!(
            edges_of(&bs, ground),
            vec![SupportEdge::new(TilePos::new(1, 1, 1), PartCategory::Feature)]
        );
    }

    #[test]
    fn test_resolving_twice_keeps_one_edge() {
        let (mut bs, t) = scape((4, 4, 3));
        let below = place(&mut bs, t.column, 2, 2, 0);
        let above = place(&mut bs, t.column, 2, 2, 1);

        assert!(bs.find_support(above));
        assert!(bs.find_support(above));
        assert_eq!(edges_of(&bs, below).len(), 1);
    }

    #[test]
    fn test_purge_is_idempotent() {
        let (mut bs, t) = scape((4, 4, 3));
        let below = place(&mut bs, t.column, 2, 2, 0);
        let above = place(&mut bs, t.column, 2, 2, 1);
        place(&mut bs, t.column, 3, 2, 1);
        bs.register_edge(below, SupportEdge::new(TilePos::new(3, 2, 1), PartCategory::Feature));
        assert!(bs.find_support(above));

        bs.purge_incoming_edges(above);
        let once = edges_of(&bs, below);
        bs.purge_incoming_edges(above);
        assert_eq!(edges_of(&bs, below), once);
        assert_eq!(once, vec![SupportEdge::new(TilePos::new(3, 2, 1), PartCategory::Feature)]);
    }

    #[test]
    fn test_damaged_or_pending_candidates_do_not_support() {
        let (mut bs, t) = scape((4, 4, 3));
        let below = place(&mut bs, t.column, 1, 1, 0);
        let above = place(&mut bs, t.column, 1, 1, 1);

        bs.part_mut(below).unwrap().damaged = true;
        assert_eq!(bs.resolve_support(above), Ok(None));
        assert!(!bs.part(above).unwrap().provides_hard_support);

        bs.part_mut(below).unwrap().damaged = false;
        bs.part_mut(below).unwrap().ticks_until_collapse = 3;
        assert_eq!(bs.resolve_support(above), Ok(None));
    }

    #[test]
    fn test_ground_rests_on_adjacent_feature_below() {
        let (mut bs, t) = scape((4, 4, 3));
        let column = place(&mut bs, t.column, 2, 1, 0);
        let ground = place(&mut bs, t.ground, 1, 1, 1);

        assert_eq!(bs.resolve_support(ground), Ok(Some(SupportKind::Hard)));
        assert_eq!(edges_of(&bs, column).len(), 1);
    }

    #[test]
    fn test_ground_ignores_diagonal_feature_below() {
        let (mut bs, t) = scape((4, 4, 3));
        place(&mut bs, t.column, 2, 2, 0);
        let ground = place(&mut bs, t.ground, 1, 1, 1);

        assert_eq!(bs.resolve_support(ground), Ok(None));
    }

    #[test]
    fn test_wall_stacks_on_wall_below() {
        let (mut bs, t) = scape((4, 4, 3));
        let lower = place(&mut bs, t.left_wall, 1, 1, 0);
        let upper = place(&mut bs, t.left_wall, 1, 1, 1);
        let right = place(&mut bs, t.right_wall, 2, 1, 1);

        assert_eq!(bs.resolve_support(upper), Ok(Some(SupportKind::Hard)));
        assert_eq!(edges_of(&bs, lower).len(), 1);
        // A right wall does not stand on a left wall.
        assert_eq!(bs.resolve_support(right), Ok(None));
    }

    #[test]
    fn test_declared_direction_finds_same_level_neighbour() {
        let (mut bs, t) = scape((5, 5, 3));
        let beam = place(&mut bs, t.beam, 1, 2, 1);
        let column = place(&mut bs, t.column, 2, 2, 1);

        assert_eq!(bs.resolve_support(beam), Ok(Some(SupportKind::Hard)));
        assert_eq!(
            edges_of(&bs, column),
            vec![SupportEdge::new(TilePos::new(1, 2, 1), PartCategory::Feature)]
        );
    }

    #[test]
    fn test_declared_direction_accepts_perpendicular_wall() {
        let (mut bs, t) = scape((5, 5, 3));
        let beam = place(&mut bs, t.beam, 2, 2, 1);
        // West probes the left wall in the beam's own cell.
        let wall = place(&mut bs, t.left_wall, 2, 2, 1);

        assert_eq!(bs.resolve_support(beam), Ok(Some(SupportKind::Hard)));
        assert_eq!(edges_of(&bs, wall).len(), 1);
    }

    #[test]
    fn test_diagonal_probes_use_second_direction() {
        let s = Subject {
            id: PartId(0),
            pos: TilePos::new(2, 2, 1),
            category: PartCategory::Ground,
            supported_by_above: false,
            directions: vec![MapDirection::North, MapDirection::East],
            types: vec![],
        };
        let probes = directional_probes(&s);
        assert!(probes.contains(&(TilePos::new(2, 1, 1), PartCategory::Ground)));
        assert!(probes.contains(&(TilePos::new(3, 2, 1), PartCategory::Ground)));
        assert!(probes.contains(&(TilePos::new(3, 1, 1), PartCategory::Ground)));
    }

    #[test]
    fn test_wall_never_probes_own_orientation_along_axis() {
        let s = Subject {
            id: PartId(0),
            pos: TilePos::new(2, 2, 1),
            category: PartCategory::RightWall,
            supported_by_above: false,
            directions: vec![MapDirection::North, MapDirection::East],
            types: vec![],
        };
        let probes = directional_probes(&s);
        assert_eq!(probes, vec![(TilePos::new(3, 2, 1), PartCategory::RightWall)]);
    }

    #[test]
    fn test_cling_to_two_neighbours_is_soft() {
        let (mut bs, t) = scape((5, 5, 3));
        let west = place(&mut bs, t.ground, 1, 2, 1);
        let middle = place(&mut bs, t.ground, 2, 2, 1);
        let east = place(&mut bs, t.ground, 3, 2, 1);

        assert_eq!(bs.resolve_support(middle), Ok(Some(SupportKind::Soft)));
        assert!(!bs.part(middle).unwrap().provides_hard_support);
        assert_eq!(edges_of(&bs, west).len(), 1);
        assert_eq!(edges_of(&bs, east).len(), 1);
    }

    #[test]
    fn test_map_edge_counts_toward_cling() {
        let (mut bs, t) = scape((5, 5, 3));
        let edge = place(&mut bs, t.ground, 0, 2, 1);
        assert_eq!(bs.resolve_support(edge), Ok(None));

        place(&mut bs, t.ground, 1, 2, 1);
        assert_eq!(bs.resolve_support(edge), Ok(Some(SupportKind::Soft)));
    }

    fn bridge() -> (Battlescape, Vec<PartId>) {
        let (mut bs, t) = scape((7, 3, 2));
        place(&mut bs, t.column, 1, 1, 0);
        place(&mut bs, t.column, 5, 1, 0);
        let row: Vec<PartId> = (1..=5).map(|x| place(&mut bs, t.column, x, 1, 1)).collect();
        assert!(bs.find_support(row[0]));
        assert!(bs.find_support(row[4]));
        for id in &row[1..4] {
            bs.part_mut(*id).unwrap().ticks_until_collapse = 4;
        }
        (bs, row)
    }

    #[test]
    fn test_support_line_holds_bridge() {
        let (mut bs, row) = bridge();
        for id in &row[1..4] {
            assert_eq!(bs.resolve_support(*id), Ok(Some(SupportKind::Soft)), "{:?}", id);
        }
        // The middle span hangs off both its neighbours.
        let middle = SupportEdge::new(TilePos::new(3, 1, 1), PartCategory::Feature);
        assert!(edges_of(&bs, row[1]).contains(&middle));
        assert!(edges_of(&bs, row[3]).contains(&middle));
    }

    #[test]
    fn test_support_line_breaks_at_gap() {
        let (mut bs, row) = bridge();
        bs.remove_from_map(row[3]);
        assert_eq!(bs.resolve_support(row[2]), Ok(None));
    }

    #[test]
    fn test_support_line_breaks_at_damaged_part() {
        let (mut bs, row) = bridge();
        bs.part_mut(row[3]).unwrap().damaged = true;
        assert_eq!(bs.resolve_support(row[2]), Ok(None));
    }

    #[test]
    fn test_support_line_is_judged_by_newest_occupant() {
        let (mut bs, row) = bridge();
        let column = bs.part(row[0]).unwrap().type_id;
        let newer = place(&mut bs, column, 4, 1, 1);
        bs.part_mut(newer).unwrap().damaged = true;
        assert_eq!(bs.resolve_support(row[2]), Ok(None));
    }

    #[test]
    fn test_attach_to_something_falls_back_to_other_categories() {
        let (mut bs, t) = scape((5, 5, 3));
        let ground = place(&mut bs, t.ground, 1, 1, 1);
        let crate_box = place(&mut bs, t.crate_box, 2, 1, 1);

        assert_eq!(bs.resolve_support(crate_box), Ok(None));
        assert!(!bs.attach_to_something(crate_box, true));
        assert!(bs.attach_to_something(crate_box, false));
        assert_eq!(edges_of(&bs, ground).len(), 1);
    }

    #[test]
    fn test_settle_reports_outcomes() {
        let (mut bs, t) = scape((5, 5, 3));
        place(&mut bs, t.column, 1, 1, 0);
        place(&mut bs, t.ground, 1, 1, 1);
        place(&mut bs, t.ground, 3, 3, 1);
        let floater = place(&mut bs, t.crate_box, 3, 1, 2);

        let report = bs.settle();
        assert_eq!(report.anchored, 1);
        assert_eq!(report.hard, 1);
        assert_eq!(report.queued, 2);
        assert!(bs.part(floater).unwrap().will_collapse());
    }

    #[test]
    fn test_settle_cancels_countdown_of_part_that_regained_support() {
        let (mut bs, t) = scape((3, 3, 4));
        let top = place(&mut bs, t.column, 1, 1, 1);
        bs.queue_collapse(top, 0);
        assert!(bs.part(top).unwrap().will_collapse());

        place(&mut bs, t.column, 1, 1, 0);
        let report = bs.settle();

        assert_eq!(report.anchored, 1);
        assert_eq!(report.hard, 1);
        assert_eq!(report.queued, 0);
        assert!(!bs.part(top).unwrap().will_collapse());

        bs.update(10);
        assert!(!bs.part(top).unwrap().falling);
        assert!(bs.part(top).unwrap().on_map());
    }

    #[test]
    fn test_missing_part_is_an_error() {
        let (mut bs, _) = scape((2, 2, 2));
        assert_eq!(bs.resolve_support(PartId(99)), Err(StructureError::MissingPart(PartId(99))));
        assert!(!bs.find_support(PartId(99)));
    }
}
