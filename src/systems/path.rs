//! Goal seeking: synthetic forward intent toward a grid cell.

use glam::{Vec2, Vec3};
use tile::Cell;

use crate::{
    components::{heading::ground, step::EPSILON, Gait},
    resources::{
        config::MotionConfig,
        terrain::{HeightField, SpatialMapper},
    },
};

/// Gait for a whole path, from its Manhattan length in tiles.
pub fn gait_for_distance(from: Cell, target: Cell, config: &MotionConfig) -> Gait {
    match from.manhattan_distance(&target) {
        d if d <= config.path_walk_max_tiles => Gait::Walk,
        d if d <= config.path_run_max_tiles => Gait::Run,
        _ => Gait::Sprint,
    }
}

/// World-space goal point: the target cell's centre on its terrain level,
/// pulled inside the world bounds when the cell lies outside them.
pub fn goal_position(target: Cell, terrain: &dyn HeightField, mapper: &dyn SpatialMapper) -> Vec3 {
    let centre = mapper.grid_to_world(target, terrain.height_at(target));
    let xz = mapper.clamp_to_bounds(ground(centre));
    if xz == ground(centre) { return centre; }
    let pos = Vec3::new(xz.x, centre.y, xz.y);
    Vec3::new(xz.x, mapper.ground_height(terrain, pos), xz.y)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Homing {
    /// Move along this unit ground direction.
    Advance(Vec2),
    /// Close enough this tick: snap to the goal.
    Arrive(Vec3),
}

/// Re-derive the homing direction from `pos` toward `goal`, given how far the
/// entity will travel this tick. Arrival happens when what would remain after
/// the move is within `tolerance`, so the goal is never overshot.
pub fn steer(pos: Vec3, goal: Vec3, travel: f32, tolerance: f32) -> Homing {
    let offset = ground(goal) - ground(pos);
    let remaining = offset.length();
    if !remaining.is_finite() || remaining <= EPSILON || remaining - travel.max(0.) <= tolerance {
        return Homing::Arrive(goal);
    }
    Homing::Advance(offset / remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::terrain::Terrain;

    #[test]
    fn test_gait_thresholds() {
        let config = MotionConfig::default();
        let from = Cell::ORIGIN;
        assert_eq!(gait_for_distance(from, Cell::new(2, 1), &config), Gait::Walk);
        assert_eq!(gait_for_distance(from, Cell::new(3, 3), &config), Gait::Run);
        assert_eq!(gait_for_distance(from, Cell::new(4, 3), &config), Gait::Sprint);
        assert_eq!(gait_for_distance(from, from, &config), Gait::Walk);
    }

    #[test]
    fn test_arrival_within_tolerance_snaps() {
        let goal = Vec3::new(2., 0.5, 0.);
        let pos = Vec3::new(1.92, 0.5, 0.);
        assert_eq!(steer(pos, goal, 0., 0.1), Homing::Arrive(goal), "0.08 remaining is inside 0.1");
    }

    #[test]
    fn test_arrival_instead_of_overshoot() {
        let goal = Vec3::new(2., 0., 0.);
        let pos = Vec3::new(1.5, 0., 0.);
        assert_eq!(steer(pos, goal, 0.9, 0.1), Homing::Arrive(goal));
    }

    #[test]
    fn test_homing_direction_tracks_goal() {
        let goal = Vec3::new(3., 0., 4.);
        let Homing::Advance(dir) = steer(Vec3::ZERO, goal, 0.1, 0.1) else { panic!("should still advance") };
        assert!((dir - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_height_difference_does_not_count() {
        let goal = Vec3::new(1., 5., 0.);
        let pos = Vec3::new(0.95, 0., 0.);
        assert_eq!(steer(pos, goal, 0., 0.1), Homing::Arrive(goal));
    }

    #[test]
    fn test_goal_position_uses_target_level() {
        let mut terrain = Terrain::flat(1., 0.25, 4, 4, 0);
        terrain.insert(Cell::new(2, 2), 4);
        assert_eq!(goal_position(Cell::new(2, 2), &terrain, &terrain), Vec3::new(2., 1., 2.));
    }

    #[test]
    fn test_goal_outside_the_world_is_clamped() {
        let mut terrain = Terrain::flat(1., 0.25, 10, 10, 0);
        terrain.insert(Cell::new(2, 9), 2);
        assert_eq!(goal_position(Cell::new(2, 30), &terrain, &terrain), Vec3::new(2., 0.5, 9.5));
    }

    #[test]
    fn test_tolerance_has_floor() {
        let config = MotionConfig::default();
        assert!((config.path_tolerance(1.) - 0.1).abs() < 1e-6);
        assert_eq!(config.path_tolerance(0.2), 0.05);
    }
}
