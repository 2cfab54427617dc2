//! Dense 3D tile grid for map-part occupancy.
//!
//! Each cell holds the list of map parts occupying it, tagged with their
//! category. Cells are stored flat, indexed `x + y * size_x + z * size_x *
//! size_y`, giving O(1) lookup. Out-of-bounds reads return an empty slice;
//! out-of-bounds writes fail with [`StructureError::OutOfBounds`].
//!
//! The grid never owns parts. It stores [`PartId`]s; the `Battlescape` part
//! table owns the parts themselves.

use crate::components::{PartCategory, PartId, TilePos};
use crate::error::{StructureError, StructureResult};

/// Entry in a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub part: PartId,
    pub category: PartCategory,
}

/// Occupancy grid bounded by the map extents.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    cells: Vec<Vec<Occupant>>,
    pub size_x: i32,
    pub size_y: i32,
    pub size_z: i32,
}

impl TileGrid {
    pub fn new(size_x: i32, size_y: i32, size_z: i32) -> Self {
        let total = (size_x.max(0) as usize) * (size_y.max(0) as usize) * (size_z.max(0) as usize);
        Self {
            cells: vec![Vec::new(); total],
            size_x,
            size_y,
            size_z,
        }
    }

    #[inline]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && pos.x < self.size_x
            && pos.y < self.size_y
            && pos.z < self.size_z
    }

    #[inline]
    fn index(&self, pos: TilePos) -> Option<usize> {
        if self.in_bounds(pos) {
            let sx = self.size_x as usize;
            let sy = self.size_y as usize;
            Some(pos.x as usize + pos.y as usize * sx + pos.z as usize * sx * sy)
        } else {
            None
        }
    }

    /// Occupants of a cell, in insertion order.
    pub fn occupants(&self, pos: TilePos) -> &[Occupant] {
        match self.index(pos) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    /// First occupant of the given category in a cell.
    pub fn first_of(&self, pos: TilePos, category: PartCategory) -> Option<PartId> {
        self.occupants(pos)
            .iter()
            .find(|o| o.category == category)
            .map(|o| o.part)
    }

    /// Most recently placed occupant of the given category in a cell.
    pub fn last_of(&self, pos: TilePos, category: PartCategory) -> Option<PartId> {
        self.occupants(pos)
            .iter()
            .rev()
            .find(|o| o.category == category)
            .map(|o| o.part)
    }

    pub fn insert(&mut self, pos: TilePos, part: PartId, category: PartCategory) -> StructureResult<()> {
        let i = self.index(pos).ok_or(StructureError::OutOfBounds(pos))?;
        let cell = &mut self.cells[i];
        if !cell.iter().any(|o| o.part == part) {
            cell.push(Occupant { part, category });
        }
        Ok(())
    }

    /// Remove a part from a cell. Removing an absent part is a no-op.
    pub fn remove(&mut self, pos: TilePos, part: PartId) {
        if let Some(i) = self.index(pos) {
            self.cells[i].retain(|o| o.part != part);
        }
    }

    /// Move a part between cells. Fails without touching `from` if `to` is off the map.
    pub fn relocate(&mut self, from: TilePos, to: TilePos, part: PartId, category: PartCategory) -> StructureResult<()> {
        if from == to {
            return Ok(());
        }
        if !self.in_bounds(to) {
            return Err(StructureError::OutOfBounds(to));
        }
        self.remove(from, part);
        self.insert(to, part, category)
    }

    /// Whether the cell touches the west or east map edge.
    pub fn is_map_edge_x(&self, pos: TilePos) -> bool {
        pos.x == 0 || pos.x == self.size_x - 1
    }

    /// Whether the cell touches the north or south map edge.
    pub fn is_map_edge_y(&self, pos: TilePos) -> bool {
        pos.y == 0 || pos.y == self.size_y - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query() {
        let mut grid = TileGrid::new(4, 4, 2);
        let pos = TilePos::new(1, 2, 1);
        grid.insert(pos, PartId(7), PartCategory::Feature).unwrap();
        grid.insert(pos, PartId(8), PartCategory::LeftWall).unwrap();

        assert_eq!(grid.occupants(pos).len(), 2);
        assert_eq!(grid.first_of(pos, PartCategory::LeftWall), Some(PartId(8)));
        assert_eq!(grid.first_of(pos, PartCategory::Ground), None);
    }

    #[test]
    fn test_first_and_last_of_same_category() {
        let mut grid = TileGrid::new(2, 2, 1);
        let pos = TilePos::new(1, 1, 0);
        grid.insert(pos, PartId(1), PartCategory::Feature).unwrap();
        grid.insert(pos, PartId(2), PartCategory::Ground).unwrap();
        grid.insert(pos, PartId(3), PartCategory::Feature).unwrap();

        assert_eq!(grid.first_of(pos, PartCategory::Feature), Some(PartId(1)));
        assert_eq!(grid.last_of(pos, PartCategory::Feature), Some(PartId(3)));
        assert_eq!(grid.last_of(pos, PartCategory::LeftWall), None);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = TileGrid::new(2, 2, 1);
        let outside = TilePos::new(2, 0, 0);
        assert!(grid.occupants(outside).is_empty());
        assert_eq!(
            grid.insert(outside, PartId(1), PartCategory::Ground),
            Err(StructureError::OutOfBounds(outside))
        );
        assert!(!grid.in_bounds(TilePos::new(0, 0, -1)));
    }

    #[test]
    fn test_relocate() {
        let mut grid = TileGrid::new(3, 3, 3);
        let from = TilePos::new(1, 1, 2);
        let to = TilePos::new(1, 1, 1);
        grid.insert(from, PartId(3), PartCategory::Feature).unwrap();
        grid.relocate(from, to, PartId(3), PartCategory::Feature).unwrap();

        assert!(grid.occupants(from).is_empty());
        assert_eq!(grid.first_of(to, PartCategory::Feature), Some(PartId(3)));

        // Moving off the map leaves the part where it was.
        assert!(grid
            .relocate(to, TilePos::new(1, 1, -1), PartId(3), PartCategory::Feature)
            .is_err());
        assert_eq!(grid.occupants(to).len(), 1);
    }

    #[test]
    fn test_map_edges() {
        let grid = TileGrid::new(5, 3, 1);
        assert!(grid.is_map_edge_x(TilePos::new(0, 1, 0)));
        assert!(grid.is_map_edge_x(TilePos::new(4, 1, 0)));
        assert!(!grid.is_map_edge_x(TilePos::new(2, 1, 0)));
        assert!(grid.is_map_edge_y(TilePos::new(2, 2, 0)));
    }
}
