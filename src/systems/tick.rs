//! Per-frame driver.

use bevy_ecs::prelude::*;
use bevy_time::Time;
use bevy_transform::components::Transform;

use crate::{
    components::{
        animation::{AnimationPlayback, ClipPlayer, PlayOptions},
        movement::MovementState,
        transform::TransformSink,
        Loc,
    },
    resources::{
        config::MotionConfig,
        hooks::{MotionEvent, MotionHooks},
        registry::Movements,
        terrain::{HeightField, SpatialMapper, Terrain},
        RunModifier,
    },
    systems::{clips, orientation, phase, Ctx},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    Continue,
    /// Drop the state: it is spent, or it malfunctioned and was reset.
    Discard,
}

/// Tick one entity: rotation integration, phase advancement, orientation
/// flush, in that order. `dt` is expected to be clamped already; anything
/// non-finite or negative is treated as zero.
pub fn tick(state: &mut MovementState, ctx: &mut Ctx, dt: f32) -> TickOutcome {
    let dt = if dt.is_finite() && dt > 0. { dt } else { 0. };
    let saved = ctx.translation();
    let saved_loc = *ctx.loc;

    orientation::sync(&mut state.heading, &*ctx.transform);
    orientation::integrate(state, ctx.transform, dt, ctx.config.angular_speed);
    phase::advance(state, ctx, dt);
    orientation::flush(state, ctx.transform);

    if !ctx.translation().is_finite() {
        let level = ctx.terrain.height_at(saved_loc);
        let restore = if saved.is_finite() { saved } else { ctx.mapper.grid_to_world(saved_loc, level) };
        log::warn!("non-finite translation after {} tick; resetting to {restore}", state.phase);
        ctx.transform.set_translation(restore);
        *ctx.loc = saved_loc;
        if ctx.animator.has_action(clips::IDLE) {
            ctx.animator.play(clips::IDLE, PlayOptions::fade(ctx.config.idle_fade).forced());
        }
        ctx.notify(MotionEvent::Discarded { malfunction: true });
        return TickOutcome::Discard;
    }

    if state.is_spent() && state.heading.pending.is_none() {
        log::trace!("movement settled at {:?}", *ctx.loc);
        ctx.notify(MotionEvent::Discarded { malfunction: false });
        return TickOutcome::Discard;
    }
    TickOutcome::Continue
}

pub fn update(
    mut movements: ResMut<Movements>,
    mut query: Query<(&mut Loc, &mut Transform, &mut ClipPlayer)>,
    mut hooks: ResMut<MotionHooks>,
    config: Res<MotionConfig>,
    terrain: Res<Terrain>,
    run: Res<RunModifier>,
    time: Res<Time>,
) {
    let dt = config.clamp_delta(time.delta_secs());
    let hooks: &mut MotionHooks = &mut hooks;
    movements.retain(|ent, state| {
        // despawned, or not a token
        let Ok((mut loc, mut transform, mut clips)) = query.get_mut(ent) else { return false };
        let mut ctx = Ctx {
            config: &*config,
            terrain: &*terrain,
            mapper: &*terrain,
            run_modifier: **run,
            animator: &mut *clips,
            transform: &mut *transform,
            loc: &mut **loc,
            observer: &mut *hooks,
        };
        tick(state, &mut ctx, dt) == TickOutcome::Continue
    });
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use tile::Cell;

    use super::*;
    use crate::{
        components::{
            keyset::{Axis, HolderId},
            Phase,
        },
        resources::terrain::SpatialMapper,
        systems::testing::Rig,
    };

    #[test]
    fn test_non_finite_dt_does_nothing() {
        let mut rig = Rig::new(Cell::new(1, 1));
        let mut state = MovementState::default();
        state.keys.set_held(Axis::Forward, HolderId::Key(0), true);
        let before = rig.position();
        assert_eq!(rig.tick(&mut state, f32::NAN), TickOutcome::Continue);
        assert_eq!(rig.position(), before);
        rig.tick(&mut state, -1.);
        assert_eq!(rig.position(), before);
    }

    #[test]
    fn test_rotation_only_state_persists() {
        let mut rig = Rig::new(Cell::new(1, 1));
        let mut state = MovementState::default();
        state.keys.set_held(Axis::RotateLeft, HolderId::Key(0), true);
        assert_eq!(rig.tick(&mut state, 0.1), TickOutcome::Continue, "rotation still held");
        assert!(rig.pose.yaw > 0.);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_pending_facing_survives_until_applied() {
        let mut rig = Rig::new(Cell::new(1, 1));
        let mut state = MovementState::default();
        state.heading.pending = Some(1.);
        assert_eq!(rig.tick(&mut state, 0.1), TickOutcome::Discard);
        assert_eq!(rig.pose.yaw, 1., "flushed before discarding");
        assert_eq!(state.heading.pending, None);
    }

    /// Mapper whose world positions are all NaN.
    struct Broken;

    impl SpatialMapper for Broken {
        fn grid_to_world(&self, _: Cell, _: i32) -> Vec3 { Vec3::NAN }
        fn world_to_grid(&self, _: Vec3) -> Cell { Cell::ORIGIN }
        fn tile_world_size(&self) -> f32 { 1. }
        fn elevation_unit(&self) -> f32 { 0.25 }
        fn world_bounds(&self) -> Option<(Vec2, Vec2)> { None }
    }

    #[test]
    fn test_malfunction_resets_to_idle() {
        let mut rig = Rig::new(Cell::new(3, 3));
        rig.clips = ClipPlayer::new([("idle", 1.), ("walk", 1.)]);
        let mut state = MovementState::default();
        state.keys.set_held(Axis::Forward, HolderId::Key(0), true);

        let mut ctx = Ctx {
            config: &rig.config,
            terrain: &rig.terrain,
            mapper: &Broken,
            run_modifier: false,
            animator: &mut rig.clips,
            transform: &mut rig.pose,
            loc: &mut rig.loc,
            observer: &mut rig.events,
        };
        assert_eq!(tick(&mut state, &mut ctx, 0.1), TickOutcome::Discard);

        assert_eq!(rig.position(), Vec3::new(3., 0., 3.), "rolled back to the last good position");
        assert_eq!(rig.loc, Cell::new(3, 3));
        assert_eq!(rig.clips.current_key(), Some("idle"));
        assert!(rig.events.0.contains(&MotionEvent::Discarded { malfunction: true }));
    }
}
