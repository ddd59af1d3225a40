use glam::Vec2;
use tile::Cell;

use crate::components::{
    heading::Heading,
    keyset::KeySets,
    step::{LandingVariant, Step},
    Direction, FallMode, Gait, Phase, Style,
};

/// Goal-seeking request: synthesizes forward intent until the goal is reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathGoal {
    pub target: Cell,
    /// Chosen once when seeking starts; never changes mid-path.
    pub gait: Gait,
    pub reached: bool,
}

/// Bookkeeping of an active fall, from the moment the step crosses its
/// trigger point until touchdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallTrack {
    /// Step ratio when the fall began.
    pub entry_ratio: f32,
    /// Height when the fall began; vertical interpolation starts here.
    pub entry_y: f32,
    pub target_y: f32,
    /// Synthetic free-fall duration.
    pub duration: f32,
    pub elapsed: f32,
    /// Horizontal world units per second for the rest of the step.
    pub horizontal_rate: f32,
    pub landing_threshold: f32,
    pub landing_key: Option<&'static str>,
    pub landing_duration: f32,
    pub landing_elapsed: f32,
    pub variant: LandingVariant,
}

/// Derived animation inputs; clips are only re-triggered when this changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimSnapshot {
    pub loop_key: Option<String>,
    pub start_key: Option<String>,
    pub stop_key: Option<String>,
    pub speed: f32,
    pub style: Style,
    pub running: bool,
    pub direction: Direction,
}

/// Per-entity movement controller state.
///
/// Created lazily on first intent and discarded once idle with nothing held.
#[derive(Clone, Debug, Default)]
pub struct MovementState {
    pub phase: Phase,
    pub fall_mode: FallMode,
    pub direction: Direction,
    pub style: Style,
    pub gait: Gait,
    /// Last resolved scalar speed, world units per second.
    pub speed: f32,
    pub sprint_accumulated: f32,
    pub step: Option<Step>,
    pub step_finalized: bool,
    pub path: Option<PathGoal>,
    pub heading: Heading,
    pub keys: KeySets,
    pub pending_stop: bool,
    /// Seconds spent in the current phase.
    pub phase_elapsed: f32,
    /// Speed of the last moving tick, used to size the stop glide.
    pub recent_speed: f32,
    /// Ground-plane direction of the last moving tick.
    pub travel: Vec2,
    pub start_duration: f32,
    pub stop_duration: f32,
    pub glide_duration: f32,
    /// The stop phase already crossfaded into idle.
    pub idle_blended: bool,
    pub fall: Option<FallTrack>,
    pub snapshot: Option<AnimSnapshot>,
}

impl MovementState {
    /// Idle with nothing held: the state should not outlive this tick.
    pub fn is_spent(&self) -> bool {
        self.phase == Phase::Idle && self.keys.is_empty()
    }

    /// Orientation writes are held back while a step is in flight.
    pub fn defers_orientation(&self) -> bool {
        self.step.is_some() && !self.step_finalized
    }
}
