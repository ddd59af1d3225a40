//! Step planning.

use glam::{Vec2, Vec3};
use tile::{Cell, DIRECTIONS};

use crate::{
    components::{
        heading::ground,
        step::{LandingVariant, Step, StepKind, EPSILON},
    },
    resources::{
        config::MotionConfig,
        terrain::{HeightField, SpatialMapper},
    },
};

/// Neighbouring cell offset closest to a ground-plane direction.
pub fn neighbor_toward(dir: Vec2) -> Option<Cell> {
    let dir = dir.try_normalize()?;
    let score = |c: &Cell| dir.dot(Vec2::new(c.x as f32, c.y as f32).normalize());
    DIRECTIONS.into_iter().max_by(|a, b| score(a).total_cmp(&score(b)))
}

/// Fraction of horizontal travel at which a drop starts to fall: where the
/// segment `offset` crosses into the target tile, half a tile from its centre
/// along the dominant axis. Diagonal steps cross at the corner.
pub fn fall_trigger_progress(tile_size: f32, offset: Vec2, config: &MotionConfig) -> f32 {
    let span = offset.abs().max_element();
    if !span.is_finite() || span <= EPSILON { return config.fall_trigger_min; }
    (1. - (tile_size / 2.) / span).clamp(config.fall_trigger_min, config.fall_trigger_max)
}

pub fn landing_variant(height_drop: i32, config: &MotionConfig) -> LandingVariant {
    if height_drop >= config.hard_landing_threshold { LandingVariant::Hard } else { LandingVariant::Normal }
}

/// Step from `start` (inside `start_cell`) to the centre of `target_cell`.
pub fn between(
    kind: StepKind,
    start_cell: Cell,
    start: Vec3,
    target_cell: Cell,
    terrain: &dyn HeightField,
    mapper: &dyn SpatialMapper,
    config: &MotionConfig,
) -> Step {
    let start_level = terrain.height_at(start_cell);
    let target_level = terrain.height_at(target_cell);
    let target = mapper.grid_to_world(target_cell, target_level);
    toward(kind, start_cell, start, start_level, target_cell, target, target_level, mapper, config)
}

#[allow(clippy::too_many_arguments)]
fn toward(
    kind: StepKind,
    start_cell: Cell,
    start: Vec3,
    start_level: i32,
    target_cell: Cell,
    target: Vec3,
    target_level: i32,
    mapper: &dyn SpatialMapper,
    config: &MotionConfig,
) -> Step {
    let horizontal_distance = ground(start).distance(ground(target));
    let height_drop = start_level - target_level;
    let requires_fall = kind == StepKind::Drop && height_drop >= config.fall_threshold;
    Step {
        kind,
        start_cell,
        target_cell,
        start,
        target,
        start_level,
        target_level,
        total_distance: start.distance(target),
        horizontal_distance,
        traveled: 0.,
        horizontal_traveled: 0.,
        height_drop,
        requires_fall,
        fall_trigger_progress: fall_trigger_progress(mapper.tile_world_size(), ground(target) - ground(start), config),
        landing_variant: landing_variant(height_drop, config),
    }
}

/// Look one cell ahead along `dir`; plan a drop step if it needs a fall.
pub fn probe(
    pos: Vec3,
    dir: Vec2,
    terrain: &dyn HeightField,
    mapper: &dyn SpatialMapper,
    config: &MotionConfig,
) -> Option<Step> {
    let start_cell = mapper.world_to_grid(pos);
    let target_cell = start_cell + neighbor_toward(dir)?;
    if !inside(mapper, target_cell) { return None; }
    let step = between(StepKind::Drop, start_cell, pos, target_cell, terrain, mapper, config);
    step.requires_fall.then_some(step)
}

/// Plan a drop step if moving from `pos` to `next` crosses into a cell that
/// needs a fall. Catches drops the one-cell probe misses when travel cuts
/// across a tile corner.
pub fn entering(
    pos: Vec3,
    next: Vec2,
    terrain: &dyn HeightField,
    mapper: &dyn SpatialMapper,
    config: &MotionConfig,
) -> Option<Step> {
    let start_cell = mapper.world_to_grid(pos);
    let target_cell = mapper.world_to_grid(Vec3::new(next.x, pos.y, next.y));
    if target_cell == start_cell || !inside(mapper, target_cell) { return None; }
    let step = between(StepKind::Drop, start_cell, pos, target_cell, terrain, mapper, config);
    step.requires_fall.then_some(step)
}

/// Whether the ground segment from `from` to `to` goes down a fall-sized drop
/// anywhere along the way, measured from the highest ground crossed so far.
fn crosses_drop(
    from: Vec3,
    to: Vec2,
    terrain: &dyn HeightField,
    mapper: &dyn SpatialMapper,
    config: &MotionConfig,
) -> bool {
    let a = ground(from);
    let samples = ((to - a).length() * 16. / mapper.tile_world_size()).ceil().clamp(1., 256.) as usize;
    let mut highest = terrain.height_at(mapper.world_to_grid(from));
    (1..=samples).any(|i| {
        let p = a.lerp(to, i as f32 / samples as f32);
        let level = terrain.height_at(mapper.world_to_grid(Vec3::new(p.x, from.y, p.y)));
        highest = highest.max(level);
        highest - level >= config.fall_threshold
    })
}

/// Whether a cell's centre lies inside the world bounds.
fn inside(mapper: &dyn SpatialMapper, cell: Cell) -> bool {
    let centre = ground(mapper.grid_to_world(cell, 0));
    mapper.world_bounds().is_none_or(|(lo, hi)| centre.cmpge(lo).all() && centre.cmple(hi).all())
}

/// Deceleration glide of `distance` along `dir`. Never glides off a drop that
/// would need a fall; the glide collapses to zero length instead.
pub fn glide(
    pos: Vec3,
    dir: Vec2,
    distance: f32,
    terrain: &dyn HeightField,
    mapper: &dyn SpatialMapper,
    config: &MotionConfig,
) -> Step {
    let start_cell = mapper.world_to_grid(pos);
    let start_level = terrain.height_at(start_cell);
    let distance = if distance.is_finite() { distance.max(0.) } else { 0. };
    let dir = if dir.is_finite() { dir.normalize_or_zero() } else { Vec2::ZERO };

    let end = mapper.clamp_to_bounds(ground(pos) + dir * distance);
    let end_cell = mapper.world_to_grid(Vec3::new(end.x, pos.y, end.y));
    let end_level = terrain.height_at(end_cell);
    let (target_cell, target, target_level) = if crosses_drop(pos, end, terrain, mapper, config) {
        (start_cell, pos, start_level)
    } else {
        let y = mapper.grid_to_world(end_cell, end_level).y;
        (end_cell, Vec3::new(end.x, y, end.y), end_level)
    };
    toward(StepKind::Glide, start_cell, pos, start_level, target_cell, target, target_level, mapper, config)
}
