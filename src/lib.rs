//! Terrain-following movement and animation control for tokens on a
//! height-mapped grid.
//!
//! Directional intent (held keys, or a path goal) is reduced per entity into
//! continuous motion, gait selection and animation crossfades. Drops in the
//! terrain are detected through discrete [`components::step::Step`]s and
//! resolved by a scripted fall/landing sequence.
//!
//! The pure controller lives in [`systems`]; [`plugins::LocomotionPlugin`]
//! wires it into a Bevy `App`.

pub mod components;
pub mod plugins;
pub mod resources;
pub mod systems;

pub mod prelude {
    pub use crate::components::{
        animation::{AnimationPlayback, ClipPlayer, PlayOptions},
        keyset::{Axis, HolderId},
        movement::MovementState,
        step::{LandingVariant, Step},
        transform::{Pose, TransformSink},
        Direction, FallMode, Gait, Loc, Phase, Style,
    };
    pub use crate::plugins::LocomotionPlugin;
    pub use crate::resources::{
        config::MotionConfig,
        hooks::{MotionEvent, MotionHooks, MotionObserver},
        registry::{Movements, Registry},
        terrain::{HeightField, SpatialMapper, Terrain},
        RunModifier,
    };
    pub use crate::systems::{tick::TickOutcome, Ctx};
    pub use tile::Cell;
}
