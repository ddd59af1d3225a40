use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Facing of a token, with at most one deferred write.
///
/// `facing` is what the transform currently shows. `pending` holds the latest
/// request while an in-flight step forbids applying it; it is cleared exactly
/// when applied.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Heading {
    pub facing: f32,
    pub pending: Option<f32>,
    /// Whether `facing` has been read back from the transform yet.
    pub synced: bool,
}

impl Heading {
    pub fn new(facing: f32) -> Self {
        Self { facing: normalize(facing), pending: None, synced: true }
    }

    /// The most recently requested angle, applied or not.
    pub fn latest(&self) -> f32 {
        self.pending.unwrap_or(self.facing)
    }
}

impl From<Heading> for Quat {
    fn from(value: Heading) -> Self {
        Quat::from_rotation_y(value.facing)
    }
}

/// Wrap an angle into (-π, π].
pub fn normalize(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Unit travel vector on the ground plane for a yaw (yaw 0 faces +Z).
pub fn forward(yaw: f32) -> Vec2 {
    Vec2::new(yaw.sin(), yaw.cos())
}

/// Yaw that faces along a ground-plane vector.
pub fn yaw_of(dir: Vec2) -> f32 {
    dir.x.atan2(dir.y)
}

pub fn ground(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}
