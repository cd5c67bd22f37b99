//! Stride - headless motion sandbox
//!
//! Runs a scripted input timeline through the motion controller over a small
//! test level and logs what the character does. Set `RUST_LOG=info` (or
//! `debug`/`trace`) to see output.
//!
//! Usage: `stride [config.json]`

use std::error::Error;
use std::fs;

use glam::{Vec2, Vec3};
use stride_motion::{CharacterMotionController, LayerMask, MotionConfig, MotionEvent};
use stride_world::{CollisionWorld, KinematicBody};

/// Physics rate.
const TICK_DELTA: f32 = 1.0 / 64.0;
/// Render rate for look and camera feedback.
const FRAME_DELTA: f32 = 1.0 / 144.0;
const RUN_SECONDS: f32 = 9.0;

#[derive(Debug, Clone, Copy)]
enum Action {
    Move(Vec2),
    Look(Vec2),
    Jump,
    SprintPressed,
    SprintReleased,
    CrouchPressed,
    CrouchReleased,
    Recoil(Vec2),
}

/// Input timeline: (seconds, action), in order.
const TIMELINE: &[(f32, Action)] = &[
    (0.0, Action::Move(Vec2::new(0.0, 1.0))),
    (1.0, Action::SprintPressed),
    (2.2, Action::CrouchPressed),
    (2.4, Action::CrouchReleased),
    (3.5, Action::SprintReleased),
    (3.6, Action::Jump),
    (4.5, Action::Look(Vec2::new(0.0, 0.5))),
    (5.0, Action::Look(Vec2::ZERO)),
    (6.0, Action::Recoil(Vec2::new(2.0, 0.5))),
    (8.0, Action::Move(Vec2::ZERO)),
];

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading motion config from {}", path);
            serde_json::from_str::<MotionConfig>(&fs::read_to_string(&path)?)?
        }
        None => MotionConfig::default(),
    };

    let mut controller = CharacterMotionController::try_new(config)?;
    let world = create_test_level()?;
    let mut body = KinematicBody::new(Vec3::ZERO);

    log::info!("Level has {} brushes", world.brush_count());

    let mut cues = TIMELINE.iter().peekable();
    let mut time = 0.0_f32;
    let mut accumulator = 0.0_f32;
    let mut next_report = 0.0_f32;

    while time < RUN_SECONDS {
        while let Some((_, action)) = cues.next_if(|(at, _)| *at <= time) {
            log::info!("[{:5.2}s] {:?}", time, action);
            apply(&mut controller, *action);
        }

        accumulator += FRAME_DELTA;
        while accumulator >= TICK_DELTA {
            body.step(&mut controller, TICK_DELTA, &world);
            accumulator -= TICK_DELTA;
        }
        controller.tick_variable(FRAME_DELTA);

        for event in controller.drain_events() {
            match event {
                MotionEvent::Footstep { .. } => log::debug!("[{:5.2}s] {:?}", time, event),
                _ => log::info!("[{:5.2}s] {:?}", time, event),
            }
        }

        if time >= next_report {
            let state = controller.state();
            log::info!(
                "[{:5.2}s] feet={:.2} speed={:.2} vy={:.2} mode={:?} grounded={} stamina={:.0}% eye={:.2}",
                time,
                body.feet,
                state.horizontal_speed(),
                state.vertical_velocity,
                controller.mode(),
                controller.is_grounded(),
                state.stamina.fraction(controller.config()) * 100.0,
                controller.eye_height(),
            );
            next_report += 0.5;
        }

        time += FRAME_DELTA;
    }

    log::info!(
        "Finished at {:.2}, camera {:.3}",
        body.feet,
        controller.camera_local_position()
    );
    Ok(())
}

fn apply(controller: &mut CharacterMotionController, action: Action) {
    match action {
        Action::Move(input) => controller.set_move_intent(input),
        Action::Look(input) => controller.set_look_intent(input),
        Action::Jump => controller.on_jump_pressed(),
        Action::SprintPressed => controller.on_sprint_pressed(),
        Action::SprintReleased => controller.on_sprint_released(),
        Action::CrouchPressed => controller.on_crouch_pressed(),
        Action::CrouchReleased => controller.on_crouch_released(),
        Action::Recoil(degrees) => controller.inject_recoil(degrees),
    }
}

/// Walled arena with a crate to vault, a ramp hull, and a trigger volume.
fn create_test_level() -> Result<CollisionWorld, Box<dyn Error>> {
    let mut world = CollisionWorld::new();

    // Floor
    world.add_box(
        Vec3::new(0.0, -5.0, 0.0),
        Vec3::new(50.0, 5.0, 50.0),
        LayerMask::WORLD,
    );

    // Arena walls
    for (center, half) in [
        (Vec3::new(50.5, 2.5, 0.0), Vec3::new(0.5, 2.5, 50.0)),
        (Vec3::new(-50.5, 2.5, 0.0), Vec3::new(0.5, 2.5, 50.0)),
        (Vec3::new(0.0, 2.5, 50.5), Vec3::new(50.0, 2.5, 0.5)),
        (Vec3::new(0.0, 2.5, -50.5), Vec3::new(50.0, 2.5, 0.5)),
    ] {
        world.add_box(center, half, LayerMask::WORLD);
    }

    // Crate in the running lane
    world.add_box(
        Vec3::new(40.0, 0.45, 0.0),
        Vec3::new(0.5, 0.45, 1.5),
        LayerMask::PROPS,
    );

    // Wedge off to the side
    world.add_convex_hull(
        &[
            Vec3::new(10.0, 0.0, 5.0),
            Vec3::new(14.0, 0.0, 5.0),
            Vec3::new(10.0, 0.0, 8.0),
            Vec3::new(14.0, 0.0, 8.0),
            Vec3::new(14.0, 1.5, 5.0),
            Vec3::new(14.0, 1.5, 8.0),
        ],
        LayerMask::WORLD,
    )?;

    // Triggers never block movement.
    world.add_box(
        Vec3::new(20.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 3.0),
        LayerMask::TRIGGER,
    );

    Ok(world)
}
