pub mod animation;
pub mod heading;
pub mod keyset;
pub mod movement;
pub mod step;
pub mod transform;

use bevy_ecs::prelude::*;
use derive_more::{Deref, DerefMut, Display};
use serde::{Deserialize, Serialize};
use tile::Cell;

/// The grid cell an entity is committed to. Only rewritten when a movement
/// settles (idle cleanup), never mid-stride.
#[derive(Clone, Component, Copy, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
pub struct Loc(Cell);

impl Loc {
    pub fn new(cell: Cell) -> Self {
        Loc(cell)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Start,
    Walk,
    Stop,
    Fall,
}

/// Sub-phase of [`Phase::Fall`]; `None` in every other phase.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum FallMode {
    #[default]
    None,
    Loop,
    Landing,
}

/// Net linear intent.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    Backward,
    #[default]
    Still,
    Forward,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Backward => -1.,
            Direction::Still => 0.,
            Direction::Forward => 1.,
        }
    }

    pub fn is_moving(self) -> bool {
        self != Direction::Still
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Style {
    #[default]
    Standard,
    Drunk,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Gait {
    #[default]
    Walk,
    Run,
    Sprint,
}

impl Gait {
    /// This gait followed by each slower gait, fastest first.
    pub fn fallbacks(self) -> &'static [Gait] {
        match self {
            Gait::Sprint => &[Gait::Sprint, Gait::Run, Gait::Walk],
            Gait::Run => &[Gait::Run, Gait::Walk],
            Gait::Walk => &[Gait::Walk],
        }
    }

    pub fn is_running(self) -> bool {
        self != Gait::Walk
    }
}
