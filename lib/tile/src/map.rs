//! # Map: Square Tile Storage with World Space Conversion
//!
//! Stores a value per grid cell (typically an elevation level) and converts
//! between grid coordinates ([`Cell`]) and 3D world space (`Vec3`).
//!
//! Cell `(x, y)` is centred on world `(x * tile_size, 0, y * tile_size)`;
//! elevation levels lift that centre by `rise` world units each.
//!
//! ## Example
//!
//! ```rust
//! use tile::{Cell, Convert, Map};
//! use glam::Vec3;
//!
//! let mut map: Map<i32> = Map::new(1.0, 0.25);
//! map.insert(Cell::new(2, 3), 4);
//!
//! let centre: Vec3 = map.convert(Cell::new(2, 3));
//! let back: Cell = map.convert(centre);
//! assert_eq!(back, Cell::new(2, 3));
//! assert_eq!(map.world(Cell::new(2, 3), 4).y, 1.0);
//! ```

use std::collections::{BTreeMap, HashMap};

use derive_more::*;
use glam::{Vec2, Vec3, Vec3Swizzles};

use crate::cell::{self, Cell};

/// Trait for bidirectional coordinate conversion
pub trait Convert<T, U> {
    /// Convert from type T to type U
    fn convert(&self, it: T) -> U;
}

/// A square tile map with world space conversion
///
/// - `tile_size`: edge length of a tile in world units
/// - `rise`: world units per elevation level
/// - `tree`: BTreeMap for ordered iteration
/// - `hash`: HashMap for fast O(1) lookup
/// - `extent`: inclusive min/max cell of everything ever inserted
#[derive(Clone, Debug, Default, IntoIterator)]
pub struct Map<T> {
    tile_size: f32,
    rise: f32,
    #[into_iterator(owned)]
    tree: BTreeMap<Cell, T>,
    hash: HashMap<Cell, T>,
    extent: Option<(Cell, Cell)>,
}

impl<T> Map<T>
where T : Copy {
    pub fn new(tile_size: f32, rise: f32) -> Self {
        Self { tile_size, rise, tree: BTreeMap::new(), hash: HashMap::new(), extent: None }
    }

    pub fn tile_size(&self) -> f32 { self.tile_size }
    pub fn rise(&self) -> f32 { self.rise }

    /// World position of a cell centre lifted to an elevation level.
    pub fn world(&self, cell: Cell, level: i32) -> Vec3 {
        let centre: Vec3 = self.convert(cell);
        Vec3 { y: level as f32 * self.rise, ..centre }
    }

    /// Cells visited walking a straight line from `a` to `b`, excluding `a`.
    pub fn line(&self, a: &Cell, b: &Cell) -> Vec<Cell> {
        let dist = a.chebyshev_distance(b);
        if dist == 0 { return Vec::new(); }
        let step = 1. / dist as f32;
        let (pa, pb): (Vec3, Vec3) = (self.convert(*a), self.convert(*b));
        (1..=dist).map(|i| self.convert(pa.lerp(pb, i as f32 * step))).collect()
    }

    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.hash.get(&cell)
    }

    pub fn insert(&mut self, cell: Cell, obj: T) {
        self.tree.insert(cell, obj);
        self.hash.insert(cell, obj);
        self.extent = Some(match self.extent {
            None => (cell, cell),
            Some((lo, hi)) => (
                Cell { x: lo.x.min(cell.x), y: lo.y.min(cell.y) },
                Cell { x: hi.x.max(cell.x), y: hi.y.max(cell.y) },
            ),
        });
    }

    pub fn remove(&mut self, cell: Cell) -> Option<T> {
        self.tree.remove(&cell);
        self.hash.remove(&cell)
    }

    pub fn len(&self) -> usize {
        self.hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Cell, &T)> {
        self.tree.iter()
    }

    /// Inclusive min/max cell of everything inserted. Removal does not shrink it.
    pub fn extent(&self) -> Option<(Cell, Cell)> {
        self.extent
    }

    /// World-space XZ rectangle covered by [`Map::extent`], tile edges included.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let (lo, hi) = self.extent?;
        let half = self.tile_size / 2.;
        let (lo, hi): (Vec3, Vec3) = (self.convert(lo), self.convert(hi));
        Some((lo.xz() - Vec2::splat(half), hi.xz() + Vec2::splat(half)))
    }
}

impl<T> Convert<Vec3, Cell> for Map<T> {
    fn convert(&self, other: Vec3) -> Cell {
        if self.tile_size <= 0. { return Cell::ORIGIN; }
        let x = other.x as f64 / self.tile_size as f64;
        let y = other.z as f64 / self.tile_size as f64;
        cell::round(x, y)
    }
}

impl<T> Convert<Cell, Vec3> for Map<T> {
    fn convert(&self, other: Cell) -> Vec3 {
        let x = other.x as f64 * self.tile_size as f64;
        let z = other.y as f64 * self.tile_size as f64;
        Vec3 { x: x as f32, y: 0., z: z as f32 }
    }
}
