use bevy_ecs::prelude::*;
use derive_more::{Deref, DerefMut};
use glam::{Vec2, Vec3};
use tile::{Cell, Convert};

/// Elevation per grid cell. Never fails: unknown cells read as level 0.
pub trait HeightField {
    fn height_at(&self, cell: Cell) -> i32;
}

/// Grid ↔ world conversion.
pub trait SpatialMapper {
    fn grid_to_world(&self, cell: Cell, level: i32) -> Vec3;
    fn world_to_grid(&self, pos: Vec3) -> Cell;
    fn tile_world_size(&self) -> f32;
    /// World units per elevation level.
    fn elevation_unit(&self) -> f32;
    /// Ground-plane rectangle tokens are kept inside, if the world is bounded.
    fn world_bounds(&self) -> Option<(Vec2, Vec2)>;

    /// Height of the terrain surface under a world position.
    fn ground_height(&self, terrain: &dyn HeightField, pos: Vec3) -> f32 {
        let cell = self.world_to_grid(pos);
        self.grid_to_world(cell, terrain.height_at(cell)).y
    }

    fn clamp_to_bounds(&self, pos: Vec2) -> Vec2 {
        match self.world_bounds() {
            Some((lo, hi)) => pos.clamp(lo, hi),
            None => pos,
        }
    }
}

/// Height-mapped grid backing both collaborator contracts.
#[derive(Clone, Debug, Deref, DerefMut, Resource)]
pub struct Terrain(tile::Map<i32>);

impl Default for Terrain {
    fn default() -> Self {
        Self(tile::Map::new(1., 0.25))
    }
}

impl Terrain {
    pub fn new(map: tile::Map<i32>) -> Self {
        Self(map)
    }

    /// A `width` × `depth` block of cells at `level`, starting at the origin.
    pub fn flat(tile_size: f32, rise: f32, width: i32, depth: i32, level: i32) -> Self {
        let mut map = tile::Map::new(tile_size, rise);
        for x in 0..width {
            for y in 0..depth {
                map.insert(Cell::new(x, y), level);
            }
        }
        Self(map)
    }
}

impl HeightField for Terrain {
    fn height_at(&self, cell: Cell) -> i32 {
        self.get(cell).copied().unwrap_or(0)
    }
}

impl SpatialMapper for Terrain {
    fn grid_to_world(&self, cell: Cell, level: i32) -> Vec3 {
        let pos = self.world(cell, level);
        if pos.is_finite() { pos } else { Vec3::ZERO }
    }

    /// Cell under `pos`, pinned to the stored extent: a position on the outer
    /// tile edge rounds into the last stored cell, not past it.
    fn world_to_grid(&self, pos: Vec3) -> Cell {
        let cell: Cell = self.convert(pos);
        match self.extent() {
            Some((lo, hi)) => Cell::new(cell.x.clamp(lo.x, hi.x), cell.y.clamp(lo.y, hi.y)),
            None => cell,
        }
    }

    fn tile_world_size(&self) -> f32 {
        self.tile_size()
    }

    fn elevation_unit(&self) -> f32 {
        self.rise()
    }

    fn world_bounds(&self) -> Option<(Vec2, Vec2)> {
        self.bounds()
    }
}
