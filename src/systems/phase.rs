//! The primary state machine.
//!
//! `idle → start → walk → stop → idle`, with `walk → fall` handed to
//! [`fall`]. Ordinary walking integrates position continuously; a [`Step`]
//! is only planted when a drop ahead needs a fall or a stop needs a glide.
//! Every path back to idle goes through [`finish`], which is the only place
//! the committed grid cell changes.

use std::mem;

use glam::{Vec2, Vec3};

use crate::{
    components::{
        animation::{AnimationPlayback, PlayOptions},
        heading::{forward, ground},
        keyset::{Axis, HolderId},
        movement::MovementState,
        step::Step,
        transform::TransformSink,
        Direction, FallMode, Phase,
    },
    resources::{
        hooks::MotionEvent,
        terrain::{HeightField, SpatialMapper},
    },
    systems::{
        clips::{self, ClipKind},
        fall, gait, orientation,
        path::{self, Homing},
        step, Ctx,
    },
};

pub fn transition(state: &mut MovementState, ctx: &mut Ctx, to: Phase) {
    let from = state.phase;
    if from == to { return; }
    log::debug!("{from} -> {to}");
    state.phase = to;
    state.phase_elapsed = 0.;
    if to != Phase::Fall { state.fall_mode = FallMode::None; }
    ctx.notify(MotionEvent::PhaseChanged { from, to });
}

fn play_idle(ctx: &mut Ctx) {
    if ctx.animator.has_action(clips::IDLE) {
        ctx.animator.play(clips::IDLE, PlayOptions::fade(ctx.config.idle_fade));
    }
}

/// One tick of the state machine.
pub fn advance(state: &mut MovementState, ctx: &mut Ctx, dt: f32) {
    match state.phase {
        Phase::Idle => {
            let direction = state.keys.linear();
            if direction.is_moving() { begin(state, ctx, direction, dt); }
        }
        Phase::Start => start_tick(state, ctx, dt),
        Phase::Walk => walk_tick(state, ctx, dt),
        Phase::Stop => stop_tick(state, ctx, dt),
        Phase::Fall => {
            if fall::advance(state, ctx, dt) { finish(state, ctx); }
        }
    }
}

/// Leave idle: play the start clip if there is a usable one, else walk at
/// once. Either way this tick's `dt` is spent moving.
pub fn begin(state: &mut MovementState, ctx: &mut Ctx, direction: Direction, dt: f32) {
    state.direction = direction;
    state.step = None;
    state.step_finalized = false;
    state.pending_stop = false;
    state.idle_blended = false;
    state.snapshot = None;
    state.recent_speed = 0.;
    state.travel = Vec2::ZERO;
    state.phase_elapsed = 0.;

    let tile_size = ctx.mapper.tile_world_size();
    let resolved = gait::resolve(state, direction, ctx.run_modifier, 0., &*ctx.animator, tile_size, ctx.config);
    let start_key = clips::select(&*ctx.animator, resolved.style, resolved.gait, direction, ClipKind::Start);
    let duration = clips::usable_duration(&*ctx.animator, start_key.as_deref(), ctx.config.min_clip_duration);

    match start_key.filter(|_| duration > 0.) {
        Some(key) => {
            state.start_duration = duration;
            ctx.animator.play(&key, PlayOptions::fade(ctx.config.start_fade).forced());
            transition(state, ctx, Phase::Start);
            start_tick(state, ctx, dt);
        }
        None => {
            state.start_duration = 0.;
            transition(state, ctx, Phase::Walk);
            walk_tick(state, ctx, dt);
        }
    }
}

fn start_tick(state: &mut MovementState, ctx: &mut Ctx, dt: f32) {
    let direction = state.keys.linear();
    if !direction.is_moving() {
        state.pending_stop = true;
        begin_stop(state, ctx);
        return;
    }
    if direction != state.direction {
        if fall_if_overhanging(state, ctx) { return; }
        reverse(state, direction);
        begin(state, ctx, direction, dt);
        return;
    }

    state.phase_elapsed += dt;
    let tile_size = ctx.mapper.tile_world_size();
    let resolved = gait::resolve(state, direction, ctx.run_modifier, dt, &*ctx.animator, tile_size, ctx.config);
    // speed ramps up across the start clip
    let ease = if state.start_duration > 0. { (state.phase_elapsed / state.start_duration).clamp(0., 1.) } else { 1. };
    locomote(state, ctx, direction, resolved.speed * ease * dt, dt);
    if state.phase != Phase::Start { return; }

    let lead = ctx.config.start_blend_lead.min(state.start_duration);
    if state.phase_elapsed >= state.start_duration - lead {
        transition(state, ctx, Phase::Walk);
        sync_loop(state, ctx);
    }
}

fn walk_tick(state: &mut MovementState, ctx: &mut Ctx, dt: f32) {
    let direction = state.keys.linear();
    if !direction.is_moving() {
        state.pending_stop = true;
        begin_stop(state, ctx);
        return;
    }
    if direction != state.direction {
        if fall_if_overhanging(state, ctx) { return; }
        reverse(state, direction);
    }

    state.phase_elapsed += dt;
    let tile_size = ctx.mapper.tile_world_size();
    let resolved = gait::resolve(state, direction, ctx.run_modifier, dt, &*ctx.animator, tile_size, ctx.config);
    sync_loop(state, ctx);
    locomote(state, ctx, direction, resolved.speed * dt, dt);
}

/// Re-trigger the loop clip only when the derived animation inputs changed.
fn sync_loop(state: &mut MovementState, ctx: &mut Ctx) {
    let snapshot = clips::snapshot(&*ctx.animator, state.style, state.gait, state.direction, state.speed);
    if state.snapshot.as_ref() == Some(&snapshot) { return; }

    if let Some(key) = snapshot.loop_key.as_deref() {
        let clip_speed = gait::measured(&*ctx.animator, key, ctx.mapper.tile_world_size(), ctx.config);
        let scale = clip_speed.map_or(1., |s| snapshot.speed / s);
        ctx.animator.play(key, PlayOptions::fade(ctx.config.loop_fade).scaled(scale));
    }
    state.snapshot = Some(snapshot);
}

/// Direction flipped without passing through zero: no stop, no step.
fn reverse(state: &mut MovementState, direction: Direction) {
    log::trace!("reverse {:?} -> {direction:?}", state.direction);
    if state.phase != Phase::Fall {
        state.step = None;
        state.step_finalized = false;
    }
    state.direction = direction;
    state.sprint_accumulated = 0.;
    state.snapshot = None;
    state.recent_speed = 0.;
    state.travel = Vec2::ZERO;
}

fn record(state: &mut MovementState, travel: Vec2, distance: f32, dt: f32) {
    if dt > 0. { state.recent_speed = distance / dt; }
    let travel = travel.normalize_or_zero();
    if travel != Vec2::ZERO { state.travel = travel; }
}

/// Move `distance` this tick: along an active drop step, toward a path goal,
/// or freely along the facing.
fn locomote(state: &mut MovementState, ctx: &mut Ctx, direction: Direction, distance: f32, dt: f32) {
    let distance = if distance.is_finite() { distance.max(0.) } else { 0. };
    let pos = ctx.translation();

    if state.step.is_none() {
        let heading = match state.path {
            Some(goal) => {
                let target = path::goal_position(goal.target, ctx.terrain, ctx.mapper);
                let tolerance = ctx.config.path_tolerance(ctx.mapper.tile_world_size());
                match path::steer(pos, target, distance, tolerance) {
                    Homing::Arrive(target) => {
                        match step::entering(pos, ground(target), ctx.terrain, ctx.mapper, ctx.config) {
                            Some(drop) => plant(state, drop),
                            None => arrive(state, ctx, target, distance, dt),
                        }
                        if state.step.is_none() { return; }
                        ground(target) - ground(pos)
                    }
                    Homing::Advance(dir) => {
                        orientation::steer_toward(state, ctx.transform, dir, dt, ctx.config.path_turn_speed);
                        dir
                    }
                }
            }
            None => forward(state.heading.latest()) * direction.sign(),
        };

        if state.step.is_none() {
            let next = ctx.mapper.clamp_to_bounds(ground(pos) + heading * distance);
            let drop = step::probe(pos, heading, ctx.terrain, ctx.mapper, ctx.config)
                .or_else(|| step::entering(pos, next, ctx.terrain, ctx.mapper, ctx.config));
            match drop {
                Some(drop) => plant(state, drop),
                None => {
                    let y = ctx.mapper.ground_height(ctx.terrain, Vec3::new(next.x, pos.y, next.y));
                    ctx.transform.set_translation(Vec3::new(next.x, y, next.y));
                    record(state, heading, distance, dt);
                    return;
                }
            }
        }
    }

    let Some(step) = state.step.as_mut() else { return };
    let ratio = step.advance(distance);
    let xz = step.ground_position();
    ctx.transform.set_translation(Vec3::new(xz.x, step.start.y, xz.y));
    let triggered = step.requires_fall && ratio >= step.fall_trigger_progress;
    let complete = step.is_complete();
    let travel = step.ground_direction().unwrap_or(state.travel);
    record(state, travel, distance, dt);

    if triggered {
        fall::enter(state, ctx);
    } else if complete {
        state.step = None;
    }
}

fn plant(state: &mut MovementState, drop: Step) {
    log::trace!("drop of {} ahead at {:?}", drop.height_drop, drop.target_cell);
    state.step = Some(drop);
    state.step_finalized = false;
}

fn arrive(state: &mut MovementState, ctx: &mut Ctx, target: Vec3, distance: f32, dt: f32) {
    let moved = ground(target) - ground(ctx.translation());
    let xz = ctx.mapper.clamp_to_bounds(ground(target));
    ctx.transform.set_translation(Vec3::new(xz.x, target.y, xz.y));
    record(state, moved, distance, dt);

    let Some(goal) = state.path.as_mut() else { return };
    goal.reached = true;
    let cell = goal.target;
    state.keys.set_held(Axis::Forward, HolderId::Path, false);
    log::debug!("reached {cell:?}");
    ctx.notify(MotionEvent::PathReached { cell });
    finish(state, ctx);
}

/// An untriggered drop step can only be abandoned while the token still
/// stands on its ledge. Once over low ground it falls from where it is.
fn fall_if_overhanging(state: &mut MovementState, ctx: &mut Ctx) -> bool {
    let Some(drop) = state.step.filter(|s| s.requires_fall) else { return false };
    let under = ctx.terrain.height_at(ctx.mapper.world_to_grid(ctx.translation()));
    if drop.start_level - under < ctx.config.fall_threshold { return false; }
    log::trace!("over the edge of {:?}, falling", drop.start_cell);
    fall::enter(state, ctx);
    true
}

/// Enter `stop`: play the stop clip with a deceleration glide, or settle into
/// idle at once when there is no usable stop clip.
pub fn begin_stop(state: &mut MovementState, ctx: &mut Ctx) {
    if matches!(state.phase, Phase::Idle | Phase::Stop | Phase::Fall) { return; }
    if fall_if_overhanging(state, ctx) { return; }

    // an untriggered drop step is abandoned
    state.step = None;
    state.step_finalized = false;
    state.sprint_accumulated = 0.;
    state.snapshot = None;

    let stop_key = clips::select(&*ctx.animator, state.style, state.gait, state.direction, ClipKind::Stop);
    let duration = clips::usable_duration(&*ctx.animator, stop_key.as_deref(), ctx.config.min_clip_duration);
    let Some(key) = stop_key.filter(|_| duration > 0.) else {
        play_idle(ctx);
        state.idle_blended = true;
        finish(state, ctx);
        return;
    };

    ctx.animator.play(&key, PlayOptions::fade(ctx.config.stop_fade).forced());
    state.stop_duration = duration;
    state.glide_duration = duration * ctx.config.stop_travel_portion;
    let distance = state.recent_speed * state.glide_duration;
    state.step = Some(step::glide(ctx.translation(), state.travel, distance, ctx.terrain, ctx.mapper, ctx.config));
    state.pending_stop = false;
    transition(state, ctx, Phase::Stop);
}

fn stop_tick(state: &mut MovementState, ctx: &mut Ctx, dt: f32) {
    let direction = state.keys.linear();
    if direction.is_moving() {
        // abandon the glide where it is and go again
        state.step = None;
        state.idle_blended = true;
        finish(state, ctx);
        begin(state, ctx, direction, dt);
        return;
    }

    state.phase_elapsed += dt;
    let t = if state.glide_duration > 0. { (state.phase_elapsed / state.glide_duration).min(1.) } else { 1. };
    if let Some(glide) = state.step.as_mut() {
        glide.set_ratio(1. - (1. - t) * (1. - t));
        let xz = glide.ground_position();
        let y = ctx.mapper.ground_height(ctx.terrain, Vec3::new(xz.x, glide.start.y, xz.y));
        ctx.transform.set_translation(Vec3::new(xz.x, y, xz.y));
    }

    let lead = ctx.config.stop_blend_lead.min(state.stop_duration);
    if !state.idle_blended && state.phase_elapsed >= state.stop_duration - lead {
        play_idle(ctx);
        state.idle_blended = true;
    }

    if state.phase_elapsed >= state.stop_duration {
        if let Some(glide) = state.step.as_mut() {
            glide.set_ratio(1.);
            ctx.transform.set_translation(glide.target);
        }
        state.step_finalized = true;
        finish(state, ctx);
    }
}

/// Idle cleanup: commit the grid cell and clear everything transient.
pub fn finish(state: &mut MovementState, ctx: &mut Ctx) {
    let cell = match state.step {
        Some(step) => step.target_cell,
        None => ctx.mapper.world_to_grid(ctx.translation()),
    };
    *ctx.loc = cell;
    ctx.notify(MotionEvent::StepCommitted { cell });

    state.step_finalized = true;
    state.step = None;
    state.path = None;
    state.keys.set_held(Axis::Forward, HolderId::Path, false);
    state.fall = None;
    state.pending_stop = false;
    state.sprint_accumulated = 0.;
    state.snapshot = None;
    state.recent_speed = 0.;
    state.travel = Vec2::ZERO;
    transition(state, ctx, Phase::Idle);
    if !mem::take(&mut state.idle_blended) { play_idle(ctx); }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use tile::Cell;

    use super::*;
    use crate::{
        components::{
            animation::ClipPlayer,
            movement::PathGoal,
            step::{LandingVariant, StepKind},
            Gait,
        },
        resources::terrain::Terrain,
        systems::{testing::Rig, tick::TickOutcome},
    };

    fn create_walker(clips: &[(&str, f32)]) -> (Rig, MovementState) {
        let mut rig = Rig::new(Cell::new(2, 2));
        rig.clips = ClipPlayer::new(clips.iter().copied());
        let mut state = MovementState::default();
        state.keys.set_held(Axis::Forward, HolderId::Key(1), true);
        (rig, state)
    }

    fn release(state: &mut MovementState) {
        state.keys.set_held(Axis::Forward, HolderId::Key(1), false);
    }

    // ===== Walking =====

    #[test]
    fn test_half_tile_in_half_second() {
        let (mut rig, mut state) = create_walker(&[("idle", 1.), ("walk", 1.)]);
        rig.tick(&mut state, 0.5);

        assert_eq!(state.phase, Phase::Walk);
        assert!((rig.position().z - 2.5).abs() < 1e-5, "walk speed 1 tile/s for 0.5s");
        assert!((rig.position().x - 2.).abs() < 1e-5);
        assert_eq!(rig.loc, Cell::new(2, 2), "no commit mid-stride");
    }

    #[test]
    fn test_fallback_speed_without_clips() {
        let (mut rig, mut state) = create_walker(&[]);
        rig.tick(&mut state, 0.1);
        assert!((rig.position().z - (2. + 0.12)).abs() < 1e-5);
    }

    #[test]
    fn test_loop_clip_is_not_restarted_every_tick() {
        let (mut rig, mut state) = create_walker(&[("idle", 1.), ("walk", 1.), ("run", 0.5)]);
        rig.tick(&mut state, 0.05);
        let plays = rig.clips.plays();
        for _ in 0..20 { rig.tick(&mut state, 0.05); }
        assert_eq!(rig.clips.plays(), plays, "unchanged snapshot must not re-trigger");

        rig.run = true;
        rig.tick(&mut state, 0.05);
        assert_eq!(rig.clips.current_key(), Some("run"));
        assert_eq!(rig.clips.plays(), plays + 1);
    }

    #[test]
    fn test_loop_time_scale_follows_speed() {
        let (mut rig, mut state) = create_walker(&[("walk", 1.)]);
        rig.run = true;
        rig.tick(&mut state, 0.05);
        let playing = rig.clips.current().unwrap();
        assert_eq!(playing.key, "walk", "run falls back to walk clip");
        assert!((playing.options.time_scale - 2.).abs() < 1e-5);
    }

    #[test]
    fn test_walk_clamps_to_bounds() {
        let (mut rig, mut state) = create_walker(&[("walk", 1.)]);
        for _ in 0..200 { rig.tick(&mut state, 0.1); }
        assert!((rig.position().z - 9.5).abs() < 1e-5, "stops at the far edge");
    }

    // ===== Start =====

    #[test]
    fn test_start_clip_crossfades_into_loop() {
        let (mut rig, mut state) = create_walker(&[("idle", 1.), ("walk", 1.), ("walkStart", 0.5)]);
        rig.tick(&mut state, 0.1);
        assert_eq!(state.phase, Phase::Start);
        assert_eq!(rig.clips.current_key(), Some("walkStart"));
        assert!(rig.position().z - 2. < 0.1, "speed eases in");

        for _ in 0..3 { rig.tick(&mut state, 0.1); }
        assert_eq!(state.phase, Phase::Walk, "blend lead of 0.15 before the clip ends");
        assert_eq!(rig.clips.current_key(), Some("walk"));
    }

    // ===== Stop =====

    #[test]
    fn test_stop_glides_then_commits() {
        let (mut rig, mut state) = create_walker(&[("idle", 1.), ("walk", 1.), ("walkStop", 0.4)]);
        rig.tick(&mut state, 0.5);
        release(&mut state);

        rig.tick(&mut state, 0.1);
        assert_eq!(state.phase, Phase::Stop);
        assert_eq!(rig.clips.current_key(), Some("walkStop"));
        let glide = state.step.unwrap();
        assert_eq!(glide.kind, StepKind::Glide);
        assert!((glide.horizontal_distance - 0.4 * 0.35).abs() < 1e-5);

        let mut outcome = TickOutcome::Continue;
        for _ in 0..10 {
            assert_eq!(rig.loc, Cell::new(2, 2), "cell only commits when the glide completes");
            outcome = rig.tick(&mut state, 0.1);
            if state.phase == Phase::Idle { break; }
        }
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(rig.position(), glide.target, "snapped to the glide target");
        assert_eq!(rig.loc, rig.terrain.world_to_grid(glide.target));
        assert_eq!(rig.clips.current_key(), Some("idle"));
        assert_eq!(outcome, TickOutcome::Discard, "idle with nothing held");
    }

    #[test]
    fn test_missing_stop_clip_settles_immediately() {
        let (mut rig, mut state) = create_walker(&[("idle", 1.), ("walk", 1.)]);
        rig.tick(&mut state, 0.6);
        release(&mut state);
        let outcome = rig.tick(&mut state, 0.1);
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.step.is_none());
        assert_eq!(rig.loc, Cell::new(2, 3));
        assert_eq!(rig.clips.current_key(), Some("idle"));
        assert_eq!(outcome, TickOutcome::Discard);
    }

    #[test]
    fn test_intent_during_stop_goes_again() {
        let (mut rig, mut state) = create_walker(&[("idle", 1.), ("walk", 1.), ("walkStop", 0.4)]);
        rig.tick(&mut state, 0.5);
        release(&mut state);
        rig.tick(&mut state, 0.1);
        assert_eq!(state.phase, Phase::Stop);

        state.keys.set_held(Axis::Forward, HolderId::Key(1), true);
        rig.tick(&mut state, 0.1);
        assert_eq!(state.phase, Phase::Walk);
        assert!(state.step.is_none(), "glide abandoned");
    }

    // ===== Reversal =====

    #[test]
    fn test_reversal_skips_stop() {
        let (mut rig, mut state) =
            create_walker(&[("idle", 1.), ("walk", 1.), ("walkBackward", 1.), ("walkStop", 0.4)]);
        rig.tick(&mut state, 0.5);
        release(&mut state);
        state.keys.set_held(Axis::Backward, HolderId::Key(2), true);

        rig.tick(&mut state, 0.25);
        assert_eq!(state.phase, Phase::Walk);
        assert_eq!(state.direction, Direction::Backward);
        assert_eq!(rig.clips.current_key(), Some("walkBackward"));
        assert!((rig.position().z - 2.25).abs() < 1e-5);
    }

    #[test]
    fn test_opposed_keys_cancel_into_stop() {
        let (mut rig, mut state) = create_walker(&[("idle", 1.), ("walk", 1.)]);
        rig.tick(&mut state, 0.3);
        state.keys.set_held(Axis::Backward, HolderId::Key(2), true);
        rig.tick(&mut state, 0.1);
        assert_eq!(state.phase, Phase::Idle);
    }

    // ===== Fall =====

    fn create_cliff_walker(drop: i32) -> (Rig, MovementState) {
        let mut map = tile::Map::new(1., 0.25);
        for x in 0..6 { map.insert(Cell::new(x, 0), if x == 0 { drop } else { 0 }); }
        let mut rig = Rig::new(Cell::ORIGIN).with_terrain(Terrain::new(map));
        rig.clips = ClipPlayer::new([("idle", 1.), ("walk", 1.), ("fall", 0.5), ("landing", 0.2)]);
        rig.pose.yaw = FRAC_PI_2;
        let mut state = MovementState::default();
        state.keys.set_held(Axis::Forward, HolderId::Key(1), true);
        (rig, state)
    }

    #[test]
    fn test_fall_triggers_at_tile_edge() {
        let (mut rig, mut state) = create_cliff_walker(3);
        for _ in 0..3 {
            rig.tick(&mut state, 0.125);
            assert_eq!(state.phase, Phase::Walk, "no fall before half way");
            let step = state.step.unwrap();
            assert!(step.requires_fall);
            assert_eq!(step.fall_trigger_progress, 0.5);
            assert!(step.horizontal_ratio() < 0.5);
            assert_eq!(rig.position().y, 0.75, "height held over the ledge");
        }
        rig.tick(&mut state, 0.125);
        assert_eq!(state.phase, Phase::Fall, "enters on the tick progress reaches 0.5");
        assert!(rig.events.0.contains(&MotionEvent::FallStarted { height_drop: 3, variant: LandingVariant::Normal }));
    }

    #[test]
    fn test_fall_lands_and_commits_target() {
        let (mut rig, mut state) = create_cliff_walker(5);
        let mut fell = false;
        for _ in 0..200 {
            rig.tick(&mut state, 1. / 30.);
            fell |= state.phase == Phase::Fall;
            if fell && state.phase != Phase::Fall { break; }
        }
        assert!(fell);
        assert_eq!(rig.loc, Cell::new(1, 0));
        assert!(rig.events.0.contains(&MotionEvent::StepCommitted { cell: Cell::new(1, 0) }));
    }

    #[test]
    fn test_rotation_deferred_during_drop_step() {
        let (mut rig, mut state) = create_cliff_walker(3);
        rig.tick(&mut state, 0.125);
        state.keys.set_held(Axis::RotateLeft, HolderId::Key(3), true);
        rig.tick(&mut state, 0.125);
        assert_eq!(rig.pose.yaw, FRAC_PI_2, "no facing write mid-step");
        assert!(state.heading.pending.is_some());
    }

    #[test]
    fn test_release_before_trigger_drops_step() {
        let (mut rig, mut state) = create_cliff_walker(4);
        rig.clips.insert("walkStop", 0.4);
        for _ in 0..3 { rig.tick(&mut state, 0.125); }
        assert!(state.step.is_some_and(|s| s.kind == StepKind::Drop));
        release(&mut state);
        rig.tick(&mut state, 0.1);
        assert_eq!(state.phase, Phase::Stop);
        let glide = state.step.unwrap();
        assert_eq!(glide.kind, StepKind::Glide);
        assert_eq!(glide.target_cell, Cell::ORIGIN, "never glides off the cliff");
        assert_eq!(glide.horizontal_distance, 0.);
    }

    /// 4×4 plateau at level 6 with a pit at (1, 2); the token faces about 30°
    /// off +Z, so it heads for the diagonal but crosses into the pit first.
    fn create_corner_walker() -> (Rig, MovementState) {
        let mut terrain = Terrain::flat(1., 0.25, 4, 4, 6);
        terrain.insert(Cell::new(1, 2), 0);
        let mut rig = Rig::new(Cell::new(1, 1)).with_terrain(terrain);
        rig.clips = ClipPlayer::new([("idle", 1.), ("walk", 1.), ("walkStop", 0.4), ("fall", 0.5), ("landing", 0.2)]);
        rig.pose.yaw = 0.52;
        let mut state = MovementState::default();
        state.keys.set_held(Axis::Forward, HolderId::Key(1), true);
        (rig, state)
    }

    #[test]
    fn test_drop_entered_at_an_angle_still_falls() {
        let (mut rig, mut state) = create_corner_walker();
        let mut fell = false;
        for _ in 0..200 {
            rig.tick(&mut state, 1. / 30.);
            if !fell && state.phase != Phase::Fall {
                assert_eq!(rig.position().y, 1.5, "held on the ledge until the fall");
            }
            fell |= state.phase == Phase::Fall;
            if fell && state.phase != Phase::Fall { break; }
        }
        assert!(fell, "the pit is only reached through the fall phase");
        assert_eq!(rig.loc, Cell::new(1, 2));
        assert_eq!(rig.position().y, 0.);
    }

    #[test]
    fn test_release_over_the_edge_falls() {
        let (mut rig, mut state) = create_corner_walker();
        let mut overhanging = false;
        for _ in 0..100 {
            rig.tick(&mut state, 1. / 30.);
            overhanging = state.phase == Phase::Walk
                && state.step.is_some()
                && rig.terrain.world_to_grid(rig.position()) == Cell::new(1, 2);
            if overhanging { break; }
        }
        assert!(overhanging, "drop step planted and already past the edge");

        release(&mut state);
        rig.tick(&mut state, 1. / 30.);
        assert_eq!(state.phase, Phase::Fall, "too late to step back onto the ledge");
        for _ in 0..100 {
            if rig.tick(&mut state, 1. / 30.) == TickOutcome::Discard { break; }
        }
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(rig.loc, Cell::new(1, 2));
    }

    #[test]
    fn test_map_edge_is_not_a_cliff() {
        let mut rig = Rig::new(Cell::new(1, 0)).with_terrain(Terrain::flat(1., 0.25, 3, 1, 5));
        rig.clips = ClipPlayer::new([("idle", 1.), ("walk", 1.), ("fall", 0.5), ("landing", 0.2)]);
        rig.pose.yaw = FRAC_PI_2;
        let mut state = MovementState::default();
        state.keys.set_held(Axis::Forward, HolderId::Key(1), true);

        for _ in 0..30 {
            rig.tick(&mut state, 0.1);
            assert_ne!(state.phase, Phase::Fall);
            assert_eq!(rig.position().y, 1.25, "stays on top of the map");
        }
        assert!((rig.position().x - 2.5).abs() < 1e-5, "held at the rim");

        release(&mut state);
        assert_eq!(rig.tick(&mut state, 0.1), TickOutcome::Discard);
        assert_eq!(rig.loc, Cell::new(2, 0), "commits the last cell on the map");
    }

    // ===== Path =====

    fn create_seeker(target: Cell) -> (Rig, MovementState) {
        let mut rig = Rig::new(Cell::new(2, 2));
        rig.clips = ClipPlayer::new([("idle", 1.), ("walk", 1.)]);
        let mut state = MovementState::default();
        state.path = Some(PathGoal { target, gait: Gait::Walk, reached: false });
        state.keys.set_held(Axis::Forward, HolderId::Path, true);
        (rig, state)
    }

    #[test]
    fn test_path_arrival_snaps_exactly() {
        let (mut rig, mut state) = create_seeker(Cell::new(2, 4));
        rig.pose.translation = Vec3::new(2., 0., 3.92);
        let outcome = rig.tick(&mut state, 1. / 60.);

        assert_eq!(rig.position(), Vec3::new(2., 0., 4.), "exactly on the goal");
        assert_eq!(rig.loc, Cell::new(2, 4));
        assert_eq!(state.phase, Phase::Idle);
        assert!(rig.events.0.contains(&MotionEvent::PathReached { cell: Cell::new(2, 4) }));
        assert_eq!(outcome, TickOutcome::Discard);
    }

    #[test]
    fn test_path_homes_without_overshoot() {
        let (mut rig, mut state) = create_seeker(Cell::new(5, 6));
        let goal = Vec3::new(5., 0., 6.);
        let mut last = rig.position().distance(goal);
        for _ in 0..600 {
            rig.tick(&mut state, 1. / 30.);
            let now = rig.position().distance(goal);
            assert!(now <= last + 1e-4, "distance to goal never grows");
            last = now;
            if state.phase == Phase::Idle { break; }
        }
        assert_eq!(rig.position(), goal);
        assert_eq!(rig.loc, Cell::new(5, 6));
        assert!(state.path.is_none());
    }

    #[test]
    fn test_path_turns_gradually() {
        let (mut rig, mut state) = create_seeker(Cell::new(6, 2));
        rig.tick(&mut state, 1. / 60.);
        let yaw = rig.pose.yaw;
        assert!(yaw > 0. && yaw < FRAC_PI_2, "turning toward +X, not snapped");
    }

    #[test]
    fn test_goal_outside_the_world_settles_at_the_edge() {
        let (mut rig, mut state) = create_seeker(Cell::new(2, 30));
        let mut outcome = TickOutcome::Continue;
        for _ in 0..3000 {
            outcome = rig.tick(&mut state, 0.1);
            if outcome == TickOutcome::Discard { break; }
        }
        assert_eq!(outcome, TickOutcome::Discard, "arrival is judged against the clamped goal");
        assert_eq!(rig.position(), Vec3::new(2., 0., 9.5));
        assert_eq!(rig.loc, Cell::new(2, 9));
        assert!(rig.events.0.contains(&MotionEvent::PathReached { cell: Cell::new(2, 30) }));
    }
}
