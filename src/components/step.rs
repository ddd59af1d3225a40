//! Discrete movement segments between two grid cells.
//!
//! Ordinary walking integrates position continuously. A [`Step`] is planted
//! only where start/target/drop semantics matter: approaching a drop that
//! needs a fall, and the deceleration glide into a stop.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tile::Cell;

/// Distances below this are treated as zero.
pub const EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StepKind {
    /// Walk toward a neighbouring cell that sits far enough below to fall.
    Drop,
    /// Deceleration glide planted when entering the stop phase.
    Glide,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum LandingVariant {
    #[default]
    Normal,
    Hard,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Step {
    pub kind: StepKind,
    pub start_cell: Cell,
    pub target_cell: Cell,
    pub start: Vec3,
    pub target: Vec3,
    pub start_level: i32,
    pub target_level: i32,
    pub total_distance: f32,
    pub horizontal_distance: f32,
    pub traveled: f32,
    pub horizontal_traveled: f32,
    /// `start_level - target_level`
    pub height_drop: i32,
    pub requires_fall: bool,
    pub fall_trigger_progress: f32,
    pub landing_variant: LandingVariant,
}

impl Step {
    /// Fraction of horizontal travel completed, in [0, 1].
    pub fn horizontal_ratio(&self) -> f32 {
        if self.horizontal_distance <= EPSILON { return 1.; }
        (self.horizontal_traveled / self.horizontal_distance).clamp(0., 1.)
    }

    /// Move `distance` further along the step; returns the new ratio.
    pub fn advance(&mut self, distance: f32) -> f32 {
        let distance = if distance.is_finite() { distance.max(0.) } else { 0. };
        let ratio = if self.horizontal_distance <= EPSILON { 1. }
            else { (self.horizontal_traveled + distance) / self.horizontal_distance };
        self.set_ratio(ratio);
        self.horizontal_ratio()
    }

    /// Jump to a ratio of horizontal travel. Never regresses.
    pub fn set_ratio(&mut self, ratio: f32) {
        let ratio = ratio.clamp(0., 1.).max(self.horizontal_ratio().min(1.));
        let ratio = if self.horizontal_distance <= EPSILON { 1. } else { ratio };
        self.horizontal_traveled = if ratio >= 1. { self.horizontal_distance } else { self.horizontal_distance * ratio };
        self.traveled = if ratio >= 1. { self.total_distance } else { self.total_distance * ratio };
    }

    pub fn is_complete(&self) -> bool {
        self.horizontal_traveled >= self.horizontal_distance - EPSILON
    }

    /// Ground-plane position at the current ratio.
    pub fn ground_position(&self) -> Vec2 {
        let (a, b) = (Vec2::new(self.start.x, self.start.z), Vec2::new(self.target.x, self.target.z));
        a.lerp(b, self.horizontal_ratio())
    }

    /// Unit ground-plane direction of travel, if the step moves at all.
    pub fn ground_direction(&self) -> Option<Vec2> {
        let d = Vec2::new(self.target.x - self.start.x, self.target.z - self.start.z);
        (d.length() > EPSILON).then(|| d.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_step() -> Step {
        let start = Vec3::new(0., 1., 0.);
        let target = Vec3::new(1., 0., 0.);
        Step {
            kind: StepKind::Drop,
            start_cell: Cell::new(0, 0),
            target_cell: Cell::new(1, 0),
            start,
            target,
            start_level: 4,
            target_level: 0,
            total_distance: start.distance(target),
            horizontal_distance: 1.,
            traveled: 0.,
            horizontal_traveled: 0.,
            height_drop: 4,
            requires_fall: true,
            fall_trigger_progress: 0.5,
            landing_variant: LandingVariant::Normal,
        }
    }

    #[test]
    fn test_traveled_never_exceeds_total() {
        let mut step = create_test_step();
        for _ in 0..10 {
            step.advance(0.37);
            assert!(step.traveled <= step.total_distance);
            assert!(step.horizontal_traveled <= step.horizontal_distance);
        }
        assert!(step.is_complete());
        assert_eq!(step.traveled, step.total_distance);
    }

    #[test]
    fn test_advance_tracks_ratio() {
        let mut step = create_test_step();
        let ratio = step.advance(0.25);
        assert!((ratio - 0.25).abs() < 1e-6);
        assert!((step.ground_position().x - 0.25).abs() < 1e-6);
        assert!(!step.is_complete());
    }

    #[test]
    fn test_advance_rejects_bad_distances() {
        let mut step = create_test_step();
        step.advance(f32::NAN);
        step.advance(-3.);
        assert_eq!(step.horizontal_traveled, 0.);
    }

    #[test]
    fn test_zero_length_step_is_complete() {
        let mut step = create_test_step();
        step.target = step.start;
        step.horizontal_distance = 0.;
        step.total_distance = 0.;
        assert_eq!(step.horizontal_ratio(), 1.);
        assert!(step.ground_direction().is_none());
        step.advance(0.);
        assert!(step.is_complete());
    }
}
