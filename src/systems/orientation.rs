//! Facing integration and the single deferred transform write.

use glam::Vec2;

use crate::components::{
    heading::{normalize, yaw_of, Heading},
    movement::MovementState,
    step::EPSILON,
    transform::TransformSink,
};

/// Adopt the transform's yaw the first time a state touches it.
pub fn sync(heading: &mut Heading, transform: &dyn TransformSink) {
    if heading.synced { return; }
    let yaw = transform.yaw();
    heading.facing = if yaw.is_finite() { normalize(yaw) } else { 0. };
    heading.synced = true;
}

/// The transform write. A pure function of `angle`.
pub fn apply(transform: &mut dyn TransformSink, angle: f32) {
    transform.set_yaw(normalize(angle));
}

/// Request a facing; applied now unless a step in flight defers it.
/// Non-finite angles are ignored.
pub fn request(state: &mut MovementState, transform: &mut dyn TransformSink, angle: f32) -> bool {
    if !angle.is_finite() { return false; }
    let angle = normalize(angle);
    if state.defers_orientation() {
        state.heading.pending = Some(angle);
    } else {
        state.heading.pending = None;
        state.heading.facing = angle;
        apply(transform, angle);
    }
    true
}

/// Integrate held rotation intent (+1 left, -1 right).
pub fn integrate(state: &mut MovementState, transform: &mut dyn TransformSink, dt: f32, speed: f32) {
    let rotation = state.keys.rotation();
    if rotation == 0. || !(dt > 0.) { return; }
    let angle = state.heading.latest() + rotation * speed * dt;
    request(state, transform, angle);
}

/// Apply the pending write if nothing defers it any longer.
pub fn flush(state: &mut MovementState, transform: &mut dyn TransformSink) -> bool {
    if state.defers_orientation() { return false; }
    let Some(angle) = state.heading.pending.take() else { return false };
    state.heading.facing = angle;
    apply(transform, angle);
    true
}

/// Rotate `current` toward `target` by at most `max_delta`, the short way round.
pub fn turn_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = normalize(target - current);
    if delta.abs() <= max_delta { return normalize(target); }
    normalize(current + delta.signum() * max_delta.max(0.))
}

/// Turn toward a ground-plane direction at `turn_speed` rad/s.
pub fn steer_toward(
    state: &mut MovementState,
    transform: &mut dyn TransformSink,
    dir: Vec2,
    dt: f32,
    turn_speed: f32,
) {
    if !dir.is_finite() || dir.length_squared() <= EPSILON * EPSILON || !(dt > 0.) { return; }
    let angle = turn_toward(state.heading.latest(), yaw_of(dir), turn_speed * dt);
    request(state, transform, angle);
}
