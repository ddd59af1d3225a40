//! Speed and style resolution.
//!
//! Walk speed prefers what the walk clip implies (one tile per cycle) and
//! falls back to configuration; the other variants are measured the same way
//! or derived from walk speed by multipliers. Sprint is a timed refinement of
//! running forward and drops out the moment that stops.

use crate::{
    components::{
        animation::AnimationPlayback,
        movement::MovementState,
        Direction, Gait, Style,
    },
    resources::config::MotionConfig,
    systems::clips::{self, ClipKind},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    pub gait: Gait,
    pub style: Style,
    pub speed: f32,
}

/// Speed implied by a clip covering one tile per cycle.
pub fn measured(animator: &dyn AnimationPlayback, key: &str, tile_size: f32, config: &MotionConfig) -> Option<f32> {
    let duration = clips::usable_duration(animator, Some(key), config.min_clip_duration);
    let speed = tile_size / duration;
    (duration > 0. && speed.is_finite() && speed > 0.).then_some(speed)
}

/// Speed for a style and gait, before any per-tick state.
pub fn base_speed(
    animator: &dyn AnimationPlayback,
    style: Style,
    gait: Gait,
    tile_size: f32,
    config: &MotionConfig,
) -> f32 {
    let measure = |g: Gait, s: Style| {
        measured(animator, &clips::clip_name(s, g, Direction::Forward, ClipKind::Loop), tile_size, config)
    };
    let walk = measure(Gait::Walk, Style::Standard).unwrap_or(config.fallback_walk_speed);
    let run = |s: Style| match s {
        Style::Standard => measure(Gait::Run, s).unwrap_or(walk * config.run_multiplier),
        Style::Drunk => measure(Gait::Run, s).unwrap_or(walk * config.drunk_run_multiplier),
    };
    let speed = match (style, gait) {
        (Style::Standard, Gait::Walk) => walk,
        (Style::Drunk, Gait::Walk) => measure(Gait::Walk, style).unwrap_or(walk * config.drunk_walk_multiplier),
        (_, Gait::Run) => run(style),
        (_, Gait::Sprint) => run(style) * config.sprint_multiplier,
    };
    if speed.is_finite() && speed > 0. { speed } else { config.fallback_walk_speed }
}

/// Resolve gait, style and speed for this tick, advancing the sprint timer by `dt`.
pub fn resolve(
    state: &mut MovementState,
    direction: Direction,
    run_modifier: bool,
    dt: f32,
    animator: &dyn AnimationPlayback,
    tile_size: f32,
    config: &MotionConfig,
) -> Resolved {
    let style = state.keys.style_for(direction);
    let gait = match (state.path, run_modifier, direction) {
        // fixed for the whole path
        (Some(path), _, _) => {
            state.sprint_accumulated = 0.;
            path.gait
        }
        (None, true, Direction::Forward) => {
            if dt.is_finite() && dt > 0. { state.sprint_accumulated += dt; }
            if state.sprint_accumulated >= config.sprint_delay { Gait::Sprint } else { Gait::Run }
        }
        (None, run, _) => {
            state.sprint_accumulated = 0.;
            if run { Gait::Run } else { Gait::Walk }
        }
    };

    let speed = base_speed(animator, style, gait, tile_size, config);
    state.gait = gait;
    state.style = style;
    state.speed = speed;
    Resolved { gait, style, speed }
}
