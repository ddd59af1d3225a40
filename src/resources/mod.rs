pub mod config;
pub mod hooks;
pub mod registry;
pub mod terrain;

use bevy_ecs::prelude::*;
use derive_more::{Deref, DerefMut};

/// Externally toggled "run" modifier (e.g. a held shift key).
#[derive(Clone, Copy, Debug, Default, Deref, DerefMut, Resource)]
pub struct RunModifier(pub bool);
