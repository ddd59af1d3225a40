//! Movement behaviour.
//!
//! Everything here is a plain function over a [`MovementState`] and a [`Ctx`]
//! of collaborators, so it can be driven by the Bevy [`tick::update`] system or
//! directly from tests. Per tick the order is fixed: rotation integration,
//! phase advancement, orientation flush.
//!
//! [`MovementState`]: crate::components::movement::MovementState

pub mod clips;
pub mod fall;
pub mod gait;
pub mod orientation;
pub mod path;
pub mod phase;
pub mod step;
pub mod tick;

use glam::Vec3;
use tile::Cell;

use crate::{
    components::{animation::AnimationPlayback, transform::TransformSink},
    resources::{
        config::MotionConfig,
        hooks::{MotionEvent, MotionObserver},
        terrain::{HeightField, SpatialMapper},
    },
};

/// Collaborators for ticking one entity.
pub struct Ctx<'a> {
    pub config: &'a MotionConfig,
    pub terrain: &'a dyn HeightField,
    pub mapper: &'a dyn SpatialMapper,
    pub run_modifier: bool,
    pub animator: &'a mut dyn AnimationPlayback,
    pub transform: &'a mut dyn TransformSink,
    /// The entity's committed grid cell.
    pub loc: &'a mut Cell,
    pub observer: &'a mut dyn MotionObserver,
}

impl Ctx<'_> {
    pub fn translation(&self) -> Vec3 {
        self.transform.translation()
    }

    pub fn notify(&mut self, event: MotionEvent) {
        self.observer.notify(&event);
    }
}
