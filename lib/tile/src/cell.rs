use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// The eight neighbouring offsets, counter-clockwise from east.
pub const DIRECTIONS: [Cell; 8] = [
    Cell { x: 1, y: 0 },   // east
    Cell { x: 1, y: 1 },   // north-east
    Cell { x: 0, y: 1 },   // north
    Cell { x: -1, y: 1 },  // north-west
    Cell { x: -1, y: 0 },  // west
    Cell { x: -1, y: -1 }, // south-west
    Cell { x: 0, y: -1 },  // south
    Cell { x: 1, y: -1 },  // south-east
];

/// A square grid coordinate. `y` grows along world +Z.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(&self, other: &Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn chebyshev_distance(&self, other: &Cell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Sign of each component, i.e. the unit step in this direction.
    pub fn normalize(&self) -> Cell {
        Cell { x: self.x.signum(), y: self.y.signum() }
    }

    pub fn neighbors(&self) -> [Cell; 8] {
        DIRECTIONS.map(|d| *self + d)
    }

    pub fn is_adjacent(&self, other: &Cell) -> bool {
        self.chebyshev_distance(other) == 1
    }
}

impl Mul<i32> for Cell {
    type Output = Cell;
    fn mul(self, rhs: i32) -> Self::Output {
        Cell { x: self.x * rhs, y: self.y * rhs }
    }
}

impl Add<Cell> for Cell {
    type Output = Cell;
    fn add(self, rhs: Cell) -> Self::Output {
        Cell { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub<Cell> for Cell {
    type Output = Cell;
    fn sub(self, rhs: Cell) -> Self::Output {
        Cell { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

/// Round fractional grid coordinates to the nearest cell.
///
/// Non-finite or out of range input collapses to the origin.
pub fn round(x0: f64, y0: f64) -> Cell {
    let in_range = |v: f64| v.is_finite() && v.abs() < i32::MAX as f64;
    if !in_range(x0) || !in_range(y0) { return Cell::ORIGIN; }
    Cell { x: x0.round() as i32, y: y0.round() as i32 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, -4);
        assert_eq!(a.manhattan_distance(&b), 7);
        assert_eq!(b.manhattan_distance(&a), 7);
    }

    #[test]
    fn test_chebyshev_distance_counts_diagonals_once() {
        assert_eq!(Cell::new(0, 0).chebyshev_distance(&Cell::new(2, 2)), 2);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let c = Cell::new(5, -2);
        for n in c.neighbors() {
            assert!(c.is_adjacent(&n), "{n:?} should neighbour {c:?}");
        }
    }

    #[test]
    fn test_round_rejects_non_finite() {
        assert_eq!(round(f64::NAN, 1.0), Cell::ORIGIN);
        assert_eq!(round(1.0, f64::INFINITY), Cell::ORIGIN);
        assert_eq!(round(1.4, -2.6), Cell::new(1, -3));
    }
}
