use bevy_app::prelude::*;
use bevy_time::Time;

use crate::{
    resources::{
        config::MotionConfig,
        hooks::MotionHooks,
        registry::Movements,
        terrain::Terrain,
        RunModifier,
    },
    systems::tick,
};

/// Movement controller for every entity with `Loc`, `Transform` and
/// `ClipPlayer`.
///
/// Inserts default resources where the app has none yet; insert a
/// [`Terrain`] or [`MotionConfig`] before or after adding the plugin to
/// override them. Time is read from `Res<Time>`, so pair this with
/// `TimePlugin` or advance time by hand.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MotionConfig>()
            .init_resource::<Movements>()
            .init_resource::<MotionHooks>()
            .init_resource::<RunModifier>()
            .init_resource::<Terrain>()
            .init_resource::<Time>()
            .add_systems(Update, tick::update);
    }
}
