//! Animation key naming and selection.
//!
//! Keys are camel-cased from style, gait, direction and kind, e.g. `walk`,
//! `runBackward`, `drunkWalkStart`, `sprintStop`. Selection degrades through
//! slower gaits and then the standard style until an existing clip is found.

use crate::components::{
    animation::AnimationPlayback,
    movement::AnimSnapshot,
    step::LandingVariant,
    Direction, Gait, Style,
};

pub const IDLE: &str = "idle";
pub const FALL_LOOP: &str = "fall";
pub const LANDING: &str = "landing";
pub const HARD_LANDING: &str = "hardLanding";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClipKind {
    Loop,
    Start,
    Stop,
}

pub fn clip_name(style: Style, gait: Gait, direction: Direction, kind: ClipKind) -> String {
    let gait = match gait {
        Gait::Walk => "walk",
        Gait::Run => "run",
        Gait::Sprint => "sprint",
    };
    let mut name = match style {
        Style::Standard => gait.to_owned(),
        Style::Drunk => format!("drunk{}{}", gait[..1].to_uppercase(), &gait[1..]),
    };
    if direction == Direction::Backward { name.push_str("Backward"); }
    match kind {
        ClipKind::Loop => {}
        ClipKind::Start => name.push_str("Start"),
        ClipKind::Stop => name.push_str("Stop"),
    }
    name
}

/// First existing clip for the request, degrading gait then style.
pub fn select(
    animator: &dyn AnimationPlayback,
    style: Style,
    gait: Gait,
    direction: Direction,
    kind: ClipKind,
) -> Option<String> {
    let styles: &[Style] = match style {
        Style::Drunk => &[Style::Drunk, Style::Standard],
        Style::Standard => &[Style::Standard],
    };
    styles.iter()
        .flat_map(|&s| gait.fallbacks().iter().map(move |&g| clip_name(s, g, direction, kind)))
        .find(|key| animator.has_action(key))
}

/// Clip duration if the clip exists and is long enough to matter, else 0.
pub fn usable_duration(animator: &dyn AnimationPlayback, key: Option<&str>, min: f32) -> f32 {
    let Some(key) = key else { return 0. };
    if !animator.has_action(key) { return 0. }
    let duration = animator.duration_of(key);
    if duration.is_finite() && duration > min { duration } else { 0. }
}

pub fn landing_key(animator: &dyn AnimationPlayback, variant: LandingVariant) -> Option<&'static str> {
    let keys: &[&'static str] = match variant {
        LandingVariant::Hard => &[HARD_LANDING, LANDING],
        LandingVariant::Normal => &[LANDING],
    };
    keys.iter().copied().find(|key| animator.has_action(key))
}

/// Everything that should restart the loop clip when it changes.
pub fn snapshot(
    animator: &dyn AnimationPlayback,
    style: Style,
    gait: Gait,
    direction: Direction,
    speed: f32,
) -> AnimSnapshot {
    AnimSnapshot {
        loop_key: select(animator, style, gait, direction, ClipKind::Loop),
        start_key: select(animator, style, gait, direction, ClipKind::Start),
        stop_key: select(animator, style, gait, direction, ClipKind::Stop),
        speed,
        style,
        running: gait.is_running(),
        direction,
    }
}
