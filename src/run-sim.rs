use std::{f32::consts::FRAC_PI_2, fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use bevy_app::prelude::*;
use bevy_math::Quat;
use bevy_time::Time;
use bevy_transform::components::Transform;
use clap::Parser;
use noise::{NoiseFn, Perlin};

use grid_locomotion::{prelude::*, resources::hooks::LogObserver};

#[derive(Parser, Debug)]
#[command(name = "stride-sim", version, about = "Drive one token across a generated terrain, headless")]
struct Opts {
    /// Simulated seconds of held intent
    #[arg(long, default_value_t = 4.)]
    seconds: f32,

    /// Frames per simulated second
    #[arg(long, default_value_t = 60)]
    hz: u32,

    /// Seek this cell instead of holding a direction, e.g. `--goal 9,4`
    #[arg(long, value_parser = parse_cell)]
    goal: Option<Cell>,

    /// Hold the run modifier
    #[arg(long)]
    run: bool,

    /// Hold backward instead of forward
    #[arg(long)]
    backward: bool,

    /// Also hold rotate-left
    #[arg(long)]
    turn_left: bool,

    /// Put a six-level cliff across the middle of the map, facing +X
    #[arg(long)]
    cliff: bool,

    /// Perlin terrain from this seed (default: flat)
    #[arg(long)]
    seed: Option<u32>,

    /// JSON file with `MotionConfig` overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Edge length of the square map in tiles
    #[arg(long, default_value_t = 16)]
    size: i32,
}

fn parse_cell(s: &str) -> Result<Cell, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Cell::new(x, y))
}

fn build_terrain(opts: &Opts) -> Terrain {
    let mut map = tile::Map::new(1., 0.25);
    let perlin = opts.seed.map(Perlin::new);
    for x in 0..opts.size {
        for y in 0..opts.size {
            let level = match (&perlin, opts.cliff) {
                (_, true) => if x < opts.size / 2 { 6 } else { 0 },
                (Some(perlin), false) => (perlin.get([x as f64 / 8., y as f64 / 8.]) * 6.).round().max(0.) as i32,
                (None, false) => 0,
            };
            map.insert(Cell::new(x, y), level);
        }
    }
    Terrain::new(map)
}

fn load_config(path: Option<&PathBuf>) -> Result<MotionConfig> {
    let Some(path) = path else { return Ok(MotionConfig::default()) };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: MotionConfig = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn clip_table() -> ClipPlayer {
    ClipPlayer::new([
        ("idle", 2.0),
        ("walk", 0.9),
        ("walkBackward", 1.0),
        ("walkStart", 0.4),
        ("walkStop", 0.5),
        ("run", 0.6),
        ("runStop", 0.5),
        ("drunkWalk", 1.1),
        ("fall", 0.6),
        ("landing", 0.4),
        ("hardLanding", 0.7),
    ])
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();
    anyhow::ensure!(opts.hz > 0, "--hz must be positive");
    anyhow::ensure!(opts.size > 2, "--size must be at least 3");

    let config = load_config(opts.config.as_ref())?;
    let terrain = build_terrain(&opts);

    let start = if opts.cliff { Cell::new(1, opts.size / 2) } else { Cell::new(opts.size / 2, opts.size / 2) };
    let yaw = if opts.cliff { FRAC_PI_2 } else { 0. };
    let pos = terrain.grid_to_world(start, terrain.height_at(start));

    let mut app = App::new();
    app.insert_resource(terrain)
        .insert_resource(config.clone())
        .insert_resource(RunModifier(opts.run))
        .add_plugins(LocomotionPlugin);
    app.world_mut().resource_mut::<MotionHooks>().add(LogObserver);

    let ent = app.world_mut().spawn((
        Loc::new(start),
        Transform::from_xyz(pos.x, pos.y, pos.z).with_rotation(Quat::from_rotation_y(yaw)),
        clip_table(),
    )).id();

    let linear = if opts.backward { Axis::Backward } else { Axis::Forward };
    {
        let mut movements = app.world_mut().resource_mut::<Movements>();
        match opts.goal {
            Some(goal) => movements.seek(ent, start, goal, &config),
            None => { movements.press(ent, linear, HolderId::Key(0)); }
        }
        if opts.turn_left { movements.press(ent, Axis::RotateLeft, HolderId::Key(1)); }
    }

    let dt = Duration::from_secs_f64(1. / opts.hz as f64);
    let frames = (opts.seconds.max(0.) * opts.hz as f32).ceil() as u32;
    log::info!("{frames} frames at {} Hz from {start:?}", opts.hz);
    for _ in 0..frames {
        app.world_mut().resource_mut::<Time>().advance_by(dt);
        app.update();
    }

    {
        let mut movements = app.world_mut().resource_mut::<Movements>();
        movements.release(ent, linear, HolderId::Key(0));
        movements.release(ent, Axis::RotateLeft, HolderId::Key(1));
    }
    // settle: let any stop, fall or path finish
    for _ in 0..opts.hz * 5 {
        if app.world().resource::<Movements>().is_empty() { break; }
        app.world_mut().resource_mut::<Time>().advance_by(dt);
        app.update();
    }

    let world = app.world();
    let loc = world.get::<Loc>(ent).context("token vanished")?;
    let transform = world.get::<Transform>(ent).context("token vanished")?;
    let clip = world.get::<ClipPlayer>(ent).and_then(|c| c.current_key().map(str::to_owned));
    println!("cell      {:?}", **loc);
    println!("position  {}", TransformSink::translation(transform));
    println!("yaw       {:.3}", TransformSink::yaw(transform));
    println!("clip      {}", clip.as_deref().unwrap_or("-"));
    if let Some(state) = world.resource::<Movements>().get(ent) {
        println!("phase     {} (unsettled)", state.phase);
    }
    Ok(())
}
