//! Positional geometry
//!
//! Rows are numbered from 1 at the root so the root sits one spacing below
//! the top edge. Column `c` of row `r` is centred in its `1 / 2^r` share of
//! the surface width. Locations are computed from root-to-node paths, so
//! a node deeper than a `usize` index can address still gets a place.

use std::ops::Sub;

use crate::tree::{IndexPath, Side};

/// 2D point on the layout surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (grows downwards)
    pub y: f64,
}

impl Point {
    /// Create point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Maps positional indices and array slots to surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    width: f64,
    height: f64,
}

impl Layout {
    /// Layout for a surface
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Surface width
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Distance between tree rows
    pub fn vertical_spacing(&self) -> f64 {
        self.height / 6.0
    }

    /// Node circle radius
    pub fn node_radius(&self) -> f64 {
        self.vertical_spacing() / 4.0
    }

    /// Centre of the node at the end of a root-to-node path
    ///
    /// Each level halves the horizontal interval the node is centred in.
    pub fn path_location(&self, path: &IndexPath) -> Point {
        let (mut lo, mut hi) = (0.0f64, 1.0f64);
        for side in path.sides() {
            let mid = (lo + hi) / 2.0;
            match side {
                Side::Left => hi = mid,
                Side::Right => lo = mid,
            }
        }
        let x = (lo + hi) / 2.0 * self.width;
        let y = (path.depth() + 1) as f64 * self.vertical_spacing();
        Point::new(x, y)
    }

    /// Centre of the node at a positional index
    pub fn index_location(&self, index: usize) -> Point {
        self.path_location(&IndexPath::from_index(index))
    }

    /// Resting place for an element shown "next to" a point: just above it
    pub fn next_to(&self, location: Point) -> Point {
        location - Point::new(0.0, self.node_radius() + self.vertical_spacing() / 2.0)
    }

    /// "Next to" location of the node at the end of a path
    pub fn next_to_path(&self, path: &IndexPath) -> Point {
        self.next_to(self.path_location(path))
    }

    /// Side length of one array panel cell
    pub fn array_cell(&self) -> f64 {
        self.width / 33.0
    }

    /// Centre of cell `slot` in an array panel of `len` cells
    ///
    /// The panel is centred horizontally near the bottom edge.
    pub fn array_slot(&self, slot: usize, len: usize) -> Point {
        let cell = self.array_cell();
        let centre = Point::new(
            self.width / 2.0,
            self.height - self.vertical_spacing() / 4.0,
        );
        let offset = -(len as f64) / 2.0 * cell + cell / 2.0 + slot as f64 * cell;
        Point::new(centre.x + offset, centre.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_location() {
        let layout = Layout::new(800.0, 600.0);
        assert_eq!(layout.index_location(0), Point::new(400.0, 100.0));
        assert_eq!(layout.node_radius(), 25.0);
    }

    #[test]
    fn test_second_row_locations() {
        let layout = Layout::new(800.0, 600.0);
        assert_eq!(layout.index_location(1), Point::new(200.0, 200.0));
        assert_eq!(layout.index_location(2), Point::new(600.0, 200.0));
        assert_eq!(layout.index_location(6), Point::new(700.0, 300.0));
    }

    #[test]
    fn test_next_to_sits_above() {
        let layout = Layout::new(800.0, 600.0);
        let p = layout.next_to_path(&IndexPath::new());
        assert_eq!(p, Point::new(400.0, 25.0));
    }

    #[test]
    fn test_path_below_index_range_still_placed() {
        let layout = Layout::new(800.0, 600.0);
        let mut path = IndexPath::new();
        for _ in 0..80 {
            path.push_level(Side::Left);
        }
        assert_eq!(path.to_index(), None);
        let p = layout.path_location(&path);
        assert_eq!(p.y, 81.0 * 100.0);
        assert!(p.x > 0.0 && p.x < 1e-10);
    }

    #[test]
    fn test_array_slots_centred() {
        let layout = Layout::new(660.0, 600.0);
        let left = layout.array_slot(0, 2);
        let right = layout.array_slot(1, 2);
        assert_eq!(left.x, 320.0);
        assert_eq!(right.x, 340.0);
        assert_eq!(left.y, 575.0);
    }
}
