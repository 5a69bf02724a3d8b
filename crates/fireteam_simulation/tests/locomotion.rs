//! Player locomotion integration tests (flat arena + стены/ступеньки)

use bevy::prelude::*;
use fireteam_simulation::world::{Block, Platform, ZoneId};
use fireteam_simulation::*;

const DT: f32 = 1.0 / 60.0;

fn create_app(world: ArenaWorld) -> (App, Entity) {
    let mut app = create_headless_app(3);
    app.insert_resource(WorldQueries::new(world));
    let player = spawn_player(app.world_mut(), "Player", Vec3::ZERO);
    (app, player)
}

fn set_input(app: &mut App, player: Entity, input: PlayerInput) {
    *app.world_mut().get_mut::<PlayerInput>(player).unwrap() = input;
}

fn step(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        assert!(step_simulation(app.world_mut(), DT).unwrap());
    }
}

fn position(app: &App, player: Entity) -> Vec3 {
    app.world().get::<Transform>(player).unwrap().translation
}

fn forward() -> PlayerInput {
    PlayerInput {
        move_axis: Vec2::new(0.0, 1.0),
        ..default()
    }
}

#[test]
fn test_walks_forward_on_flat_ground() {
    let (mut app, player) = create_app(ArenaWorld::flat(ZoneId(0), 40.0));
    set_input(&mut app, player, forward());

    step(&mut app, 60);

    let position = position(&app, player);
    assert!((position.z + 8.0).abs() < 0.01, "position = {:?}", position);
    assert_eq!(position.y, 0.0);

    let world = app.world();
    assert!(world.get::<Locomotion>(player).unwrap().moving);
    assert_ne!(world.get::<HeadBob>(player).unwrap().offset, HeadBob::default().offset);
    assert_eq!(world.get::<AnimationState>(player).unwrap().current(), Some(Action::Running));
}

#[test]
fn test_run_is_faster() {
    let (mut app, player) = create_app(ArenaWorld::flat(ZoneId(0), 40.0));
    set_input(
        &mut app,
        player,
        PlayerInput {
            run: true,
            ..forward()
        },
    );

    step(&mut app, 60);

    assert!(position(&app, player).z < -12.0);
}

#[test]
fn test_wall_blocks_forward_motion() {
    let arena = ArenaWorld::flat(ZoneId(0), 40.0)
        .with_block(Block::new(Vec3::new(-5.0, 0.0, -4.0), Vec3::new(5.0, 3.0, -3.0)));
    let (mut app, player) = create_app(arena);
    set_input(&mut app, player, forward());

    step(&mut app, 120);

    let position = position(&app, player);
    assert!(position.z > -3.0, "walked into the wall: {:?}", position);
    assert!(position.z < -2.5);
    assert_eq!(position.y, 0.0);
}

#[test]
fn test_climbs_low_step() {
    let arena = ArenaWorld::flat(ZoneId(0), 40.0).with_platform(Platform::new(
        Vec3::new(-5.0, 0.0, -10.0),
        Vec3::new(5.0, 0.3, -2.0),
    ));
    let (mut app, player) = create_app(arena);
    set_input(&mut app, player, forward());

    step(&mut app, 30);

    let position = position(&app, player);
    assert!(position.z < -2.0);
    assert!((position.y - 0.3).abs() < 1e-5, "position = {:?}", position);
}

#[test]
fn test_jump_rises_and_lands() {
    let (mut app, player) = create_app(ArenaWorld::flat(ZoneId(0), 40.0));
    set_input(
        &mut app,
        player,
        PlayerInput {
            jump: true,
            ..default()
        },
    );
    step(&mut app, 1);
    set_input(&mut app, player, PlayerInput::default());

    let mut peak: f32 = 0.0;
    for _ in 0..180 {
        step(&mut app, 1);
        peak = peak.max(position(&app, player).y);
    }

    assert!(peak > 1.0, "peak = {}", peak);
    assert!(peak <= 1.285 + 1e-5);
    assert_eq!(position(&app, player).y, 0.0);
    assert!(!app.world().get::<Locomotion>(player).unwrap().is_airborne());
}

#[test]
fn test_low_ceiling_caps_jump() {
    // Потолок в 0.8 над головой (голова на 1.8)
    let arena = ArenaWorld::flat(ZoneId(0), 40.0).with_block(Block::new(
        Vec3::new(-2.0, 2.6, -2.0),
        Vec3::new(2.0, 3.0, 2.0),
    ));
    let (mut app, player) = create_app(arena);
    set_input(
        &mut app,
        player,
        PlayerInput {
            jump: true,
            ..default()
        },
    );

    step(&mut app, 1);

    match app.world().get::<Locomotion>(player).unwrap().airborne {
        Airborne::Jumping { apex, .. } => assert!((apex - 0.8).abs() < 1e-5, "apex = {}", apex),
        other => panic!("expected jump, got {:?}", other),
    }
}

#[test]
fn test_walking_off_ledge_falls_and_lands() {
    let arena = ArenaWorld::flat(ZoneId(0), 40.0).with_platform(Platform::new(
        Vec3::new(-5.0, 0.0, -1.0),
        Vec3::new(5.0, 2.0, 1.0),
    ));
    let mut app = create_headless_app(3);
    app.insert_resource(WorldQueries::new(arena));
    let player = spawn_player(app.world_mut(), "Player", Vec3::new(0.0, 2.0, 0.0));
    set_input(&mut app, player, forward());

    step(&mut app, 30);
    set_input(&mut app, player, PlayerInput::default());
    step(&mut app, 60);

    let position = position(&app, player);
    assert!(position.z < -1.0);
    assert_eq!(position.y, 0.0);
}

#[test]
fn test_fall_through_is_repaired() {
    let (mut app, player) = create_app(ArenaWorld::flat(ZoneId(0), 40.0));
    app.world_mut().get_mut::<Transform>(player).unwrap().translation = Vec3::new(3.0, -25.0, 4.0);

    step(&mut app, 1);

    assert_eq!(position(&app, player), Vec3::new(3.0, 0.0, 4.0));
}

#[test]
fn test_mouse_look_turns_walk_direction() {
    let (mut app, player) = create_app(ArenaWorld::flat(ZoneId(0), 40.0));
    // 100 px × 0.005 = 0.5 рад вправо
    set_input(
        &mut app,
        player,
        PlayerInput {
            look_delta: Vec2::new(100.0, 0.0),
            ..default()
        },
    );
    step(&mut app, 1);
    set_input(&mut app, player, forward());

    step(&mut app, 30);

    assert!(position(&app, player).x > 1.0);
}
