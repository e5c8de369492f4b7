//! Headless grounding demo.
//!
//! Walks a two-legged rig across a floor, up a short staircase and over a
//! pit, ticking the solver at a fixed 60 Hz and logging what it does to the
//! pelvis and feet. Solver tuning can be overridden by a `grounding.ron`
//! file in the working directory.

use anyhow::ensure;
use glam::Vec3;
use grounding::{Grounding, GroundingConfig};
use ik_core::{Frame, Time};
use physics::{CollisionLayer, PhysicsWorld};
use std::f32::consts::PI;
use std::path::Path;

/// Forward walking speed of the rig, units per second.
const WALK_SPEED: f32 = 1.2;
/// Gait frequency, steps per second per foot.
const STRIDE_RATE: f32 = 1.4;
/// How high a foot lifts mid-swing.
const STEP_LIFT: f32 = 0.22;
/// Total simulated walk time.
const SIM_SECONDS: f32 = 8.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("grounding demo starting");

    let mut config = load_tuning();
    // Probes only care about static walkable geometry.
    config.layers = CollisionLayer::Walkable.mask();

    let world = build_world();

    let mut solver = Grounding::new(config);
    let root = Frame::from_position(Vec3::new(-2.0, 0.0, 0.0));
    solver.bind(&root, 2)?;

    let mut time = Time::new();
    time.set_fixed_rate(60.0);
    let dt = time.fixed_timestep_seconds();
    let total_ticks = (SIM_SECONDS / dt) as u64;

    let mut tick: u64 = 0;
    let mut grounded_ticks: u64 = 0;
    while tick < total_ticks {
        time.update();
        while time.should_fixed_update() && tick < total_ticks {
            let t = tick as f32 * dt;
            let (root, feet) = rig_pose(t);
            solver.update(&root, &feet, dt, &world);

            if solver.is_grounded() {
                grounded_ticks += 1;
            }
            if tick % 60 == 0 {
                report(t, &root, &solver);
            }
            tick += 1;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    let left = solver.foot_offset(0).map(|o| o.vertical).unwrap_or(0.0);
    let right = solver.foot_offset(1).map(|o| o.vertical).unwrap_or(0.0);
    ensure!(
        left.is_finite() && right.is_finite() && solver.pelvis_offset().is_finite(),
        "solver produced non-finite offsets"
    );
    log::info!(
        "done: {}/{} ticks grounded, final pelvis {:+.3}",
        grounded_ticks,
        total_ticks,
        solver.pelvis_offset()
    );
    Ok(())
}

/// Load solver tuning from `grounding.ron` if present; fall back to
/// defaults (and warn) on a parse error.
fn load_tuning() -> GroundingConfig {
    let path = Path::new("grounding.ron");
    match std::fs::read_to_string(path) {
        Ok(data) => match ron::from_str(&data) {
            Ok(config) => {
                log::info!("loaded solver tuning from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("invalid tuning at {:?}: {}, using defaults", path, e);
                GroundingConfig::default()
            }
        },
        Err(_) => GroundingConfig::default(),
    }
}

/// Floor strips with a pit between them, plus a short staircase.
///
/// Walkable surface is y = 0 except the stairs; the pit spans x 4.0..5.5.
fn build_world() -> PhysicsWorld {
    let mut world = PhysicsWorld::new();
    world.add_static_cuboid(
        Vec3::new(-3.0, -0.1, 0.0),
        0.0,
        Vec3::new(7.0, 0.1, 5.0),
        CollisionLayer::Walkable,
    );
    world.add_static_cuboid(
        Vec3::new(10.0, -0.1, 0.0),
        0.0,
        Vec3::new(4.5, 0.1, 5.0),
        CollisionLayer::Walkable,
    );
    // Four rising steps starting at x = 1.0.
    for i in 0..4 {
        let height = 0.12 * (i + 1) as f32;
        world.add_static_cuboid(
            Vec3::new(1.0 + 0.4 * i as f32, height * 0.5, 0.0),
            0.0,
            Vec3::new(0.2, height * 0.5, 1.0),
            CollisionLayer::Walkable,
        );
    }
    world.update_query_pipeline();
    world
}

/// Root and feet frames at walk time `t`: the root slides forward at ground
/// level while the feet swing a sinusoidal gait around it.
fn rig_pose(t: f32) -> (Frame, Vec<Frame>) {
    let root_x = -2.0 + WALK_SPEED * t;
    let root = Frame::from_position(Vec3::new(root_x, 0.0, 0.0));

    let feet = [0.0, PI]
        .iter()
        .enumerate()
        .map(|(i, &phase_offset)| {
            let phase = t * STRIDE_RATE * 2.0 * PI + phase_offset;
            let z = if i == 0 { -0.15 } else { 0.15 };
            let swing = phase.sin();
            Frame::from_position(Vec3::new(
                root_x + 0.25 * swing,
                STEP_LIFT * swing.max(0.0),
                z,
            ))
        })
        .collect();
    (root, feet)
}

fn report(t: f32, root: &Frame, solver: &Grounding) {
    let left = solver.foot_offset(0).map(|o| o.vertical).unwrap_or(0.0);
    let right = solver.foot_offset(1).map(|o| o.vertical).unwrap_or(0.0);
    log::info!(
        "t={:4.1}s x={:+5.2} grounded={:5} pelvis={:+.3} feet=[{:+.3} {:+.3}]",
        t,
        root.position.x,
        solver.is_grounded(),
        solver.pelvis_offset(),
        left,
        right
    );
}
