//! Scripted fall and landing, nested inside [`Phase::Fall`].
//!
//! Not a physics integrator: the drop takes a synthetic duration derived from
//! its height, horizontal travel finishes the same [`Step`] that triggered it,
//! and height eases in from wherever the token was when the fall began.
//!
//! [`Step`]: crate::components::step::Step

use glam::Vec3;

use crate::{
    components::{
        animation::{AnimationPlayback, PlayOptions},
        movement::{FallTrack, MovementState},
        step::{LandingVariant, EPSILON},
        transform::TransformSink,
        FallMode, Phase,
    },
    resources::{config::MotionConfig, hooks::MotionEvent},
    systems::{clips, phase, Ctx},
};

/// Free-fall duration for a drop of `height` world units. Drops past the
/// attenuation knee grow with the square root of the excess.
pub fn fall_duration(height: f32, config: &MotionConfig) -> f32 {
    if !height.is_finite() || height <= 0. { return config.fall_min_duration; }
    let knee = config.fall_attenuation_knee;
    let effective = if height <= knee { height } else { knee + (height - knee).sqrt() };
    (effective / config.fall_vertical_speed).clamp(config.fall_min_duration, config.fall_max_duration)
}

/// Remaining height at which the loop hands over to the landing clip.
pub fn landing_threshold(height: f32, variant: LandingVariant, config: &MotionConfig) -> f32 {
    let window = match variant {
        LandingVariant::Normal => config.landing_normal,
        LandingVariant::Hard => config.landing_hard,
    };
    window.threshold(config.landing_drop_factor, height.max(0.))
}

/// Switch into the fall phase. The active step must require a fall.
pub fn enter(state: &mut MovementState, ctx: &mut Ctx) {
    let Some(step) = state.step.filter(|s| s.requires_fall) else { return };
    let entry_y = ctx.translation().y;
    let height = (entry_y - step.target.y).max(0.);
    let duration = fall_duration(height, ctx.config);
    let landing_key = clips::landing_key(&*ctx.animator, step.landing_variant);

    state.fall = Some(FallTrack {
        entry_ratio: step.horizontal_ratio(),
        entry_y,
        target_y: step.target.y,
        duration,
        elapsed: 0.,
        horizontal_rate: (step.horizontal_distance - step.horizontal_traveled).max(0.) / duration,
        landing_threshold: landing_threshold(height, step.landing_variant, ctx.config),
        landing_key,
        landing_duration: clips::usable_duration(&*ctx.animator, landing_key, ctx.config.min_clip_duration),
        landing_elapsed: 0.,
        variant: step.landing_variant,
    });
    state.snapshot = None;
    state.sprint_accumulated = 0.;
    state.pending_stop = false;
    phase::transition(state, ctx, Phase::Fall);

    log::debug!("fall: drop {} levels over {duration:.2}s ({:?})", step.height_drop, step.landing_variant);
    ctx.notify(MotionEvent::FallStarted { height_drop: step.height_drop, variant: step.landing_variant });

    if ctx.animator.has_action(clips::FALL_LOOP) {
        state.fall_mode = FallMode::Loop;
        ctx.animator.play(clips::FALL_LOOP, PlayOptions::fade(ctx.config.fall_fade).forced());
    } else {
        begin_landing(state, ctx);
    }
}

fn begin_landing(state: &mut MovementState, ctx: &mut Ctx) {
    let Some(track) = state.fall.as_mut() else { return };
    state.fall_mode = FallMode::Landing;
    track.landing_elapsed = 0.;
    if let Some(key) = track.landing_key {
        ctx.animator.play(key, PlayOptions::fade(ctx.config.fall_fade).forced());
    }
    log::debug!("landing ({:?})", track.variant);
    ctx.notify(MotionEvent::LandingStarted { variant: track.variant });
}

/// Advance the fall by `dt`. Returns true once the token has touched down:
/// horizontal travel is complete and the landing clip (or its time budget)
/// has run out.
pub fn advance(state: &mut MovementState, ctx: &mut Ctx, dt: f32) -> bool {
    let (Some(track), Some(step)) = (state.fall.as_mut(), state.step.as_mut()) else { return true };

    track.elapsed += dt;
    if state.fall_mode == FallMode::Landing { track.landing_elapsed += dt; }
    if track.elapsed >= track.duration {
        step.set_ratio(1.);
    } else {
        step.advance(track.horizontal_rate * dt);
    }

    let span = 1. - track.entry_ratio;
    let v = if span <= EPSILON { 1. } else { ((step.horizontal_ratio() - track.entry_ratio) / span).clamp(0., 1.) };
    let y = track.entry_y + (track.target_y - track.entry_y) * v * v;
    let xz = step.ground_position();
    ctx.transform.set_translation(Vec3::new(xz.x, y, xz.y));

    let remaining = (y - track.target_y).abs();
    let touching = state.fall_mode == FallMode::Loop && remaining <= track.landing_threshold;

    let landed = step.is_complete()
        && state.fall_mode == FallMode::Landing
        && (track.landing_elapsed >= track.landing_duration
            || track.elapsed >= ctx.config.fall_max_duration + track.landing_duration);
    let target = step.target;

    if touching { begin_landing(state, ctx); }
    if landed {
        ctx.transform.set_translation(target);
        state.step_finalized = true;
    }
    landed
}
