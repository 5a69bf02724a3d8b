//! Unit tests для locomotion controller

use super::*;
use crate::config::LocomotionConfig;
use crate::world::{ArenaWorld, Block, Platform, UnloadedWorld, ZoneId};
use bevy::prelude::*;

const DT: f32 = 1.0 / 60.0;

// --- Helpers ---

fn config() -> LocomotionConfig {
    LocomotionConfig::default()
}

fn flat() -> ArenaWorld {
    ArenaWorld::flat(ZoneId(0), 20.0)
}

/// Пол на 0, помост 0.4 (ступенька) и уступ 1.2 (стена для ходьбы)
fn stepped() -> ArenaWorld {
    flat()
        .with_platform(Platform::new(Vec3::new(2.0, 0.0, -5.0), Vec3::new(5.0, 0.4, 5.0)))
        .with_platform(Platform::new(Vec3::new(-5.0, 0.0, -5.0), Vec3::new(-2.0, 1.2, 5.0)))
}

fn run_vertical_until_grounded(
    world: &ArenaWorld,
    position: &mut Vec3,
    airborne: &mut Airborne,
    max_ticks: usize,
) -> (usize, f32) {
    let mut peak = position.y;
    for tick in 0..max_ticks {
        integrate_vertical(world, &config(), position, airborne, DT);
        peak = peak.max(position.y);
        if airborne.is_grounded() {
            return (tick + 1, peak);
        }
    }
    panic!("actor never landed, position = {:?}", position);
}

// --- Planar ---

#[test]
fn test_walk_on_flat_ground_keeps_height() {
    let world = flat();
    let mut position = Vec3::ZERO;
    let mut airborne = Airborne::Grounded;

    let result = step_planar(&world, &config(), &mut position, &mut airborne, Vec3::new(0.3, 0.0, 0.0));

    assert_eq!(result, PlanarStep::Moved);
    assert_eq!(position, Vec3::new(0.3, 0.0, 0.0));
    assert!(airborne.is_grounded());
}

#[test]
fn test_step_up_within_tolerance_snaps() {
    let world = stepped();
    let mut position = Vec3::new(1.9, 0.0, 0.0);
    let mut airborne = Airborne::Grounded;

    let result = step_planar(&world, &config(), &mut position, &mut airborne, Vec3::new(0.2, 0.0, 0.0));

    assert_eq!(result, PlanarStep::Moved);
    assert!((position.y - 0.4).abs() < 1e-5);
    assert!(airborne.is_grounded());
}

#[test]
fn test_tall_ledge_blocks_walking() {
    let world = stepped();
    let mut position = Vec3::new(-1.9, 0.0, 0.0);
    let mut airborne = Airborne::Grounded;

    let result = step_planar(&world, &config(), &mut position, &mut airborne, Vec3::new(-0.2, 0.0, 0.0));

    assert_eq!(result, PlanarStep::Blocked);
    assert_eq!(position, Vec3::new(-1.9, 0.0, 0.0));
}

#[test]
fn test_walking_off_ledge_starts_falling() {
    let world = stepped();
    let mut position = Vec3::new(-2.1, 1.2, 0.0);
    let mut airborne = Airborne::Grounded;

    let result = step_planar(&world, &config(), &mut position, &mut airborne, Vec3::new(0.2, 0.0, 0.0));

    assert_eq!(result, PlanarStep::Moved);
    // Без магнитного snap: Y не меняется, дальше ведёт гравитация
    assert!((position.y - 1.2).abs() < 1e-5);
    assert!(matches!(airborne, Airborne::Falling { .. }));

    run_vertical_until_grounded(&world, &mut position, &mut airborne, 120);
    assert!(position.y.abs() < 1e-5);
}

#[test]
fn test_edge_of_world_rejects_step() {
    let world = flat();
    let mut position = Vec3::new(19.9, 0.0, 0.0);
    let mut airborne = Airborne::Grounded;

    let result = step_planar(&world, &config(), &mut position, &mut airborne, Vec3::new(0.5, 0.0, 0.0));

    assert_eq!(result, PlanarStep::Blocked);
    assert_eq!(position.x, 19.9);
}

#[test]
fn test_unloaded_world_never_moves_actor() {
    let mut position = Vec3::ZERO;
    let mut airborne = Airborne::Grounded;

    let result = step_planar(&UnloadedWorld, &config(), &mut position, &mut airborne, Vec3::X);

    assert_eq!(result, PlanarStep::Blocked);
    assert_eq!(position, Vec3::ZERO);
}

#[test]
fn test_airborne_planar_move_keeps_height() {
    let world = stepped();
    let mut position = Vec3::new(1.9, 0.9, 0.0);
    let mut airborne = Airborne::Falling { velocity: 1.0 };

    step_planar(&world, &config(), &mut position, &mut airborne, Vec3::new(0.2, 0.0, 0.0));

    assert!((position.y - 0.9).abs() < 1e-5);
    assert_eq!(airborne, Airborne::Falling { velocity: 1.0 });
}

// --- Jump ---

#[test]
fn test_jump_apex_without_ceiling() {
    let world = flat();
    let mut position = Vec3::ZERO;
    let mut airborne = Airborne::Grounded;

    assert!(begin_jump(&world, &config(), position, &mut airborne));

    let (_, peak) = run_vertical_until_grounded(&world, &mut position, &mut airborne, 600);
    assert!((peak - 1.285).abs() < 1e-4, "peak = {}", peak);
    assert!(position.y.abs() < 1e-5);
}

#[test]
fn test_jump_apex_limited_by_ceiling() {
    // Потолок в 0.8 м над головой (head_height = 1.8)
    let world = flat().with_block(Block::new(Vec3::new(-3.0, 2.6, -3.0), Vec3::new(3.0, 3.0, 3.0)));
    let mut position = Vec3::ZERO;
    let mut airborne = Airborne::Grounded;

    begin_jump(&world, &config(), position, &mut airborne);

    match airborne {
        Airborne::Jumping { apex, velocity } => {
            assert!((apex - 0.8).abs() < 1e-5, "apex = {}", apex);
            assert_eq!(velocity, 4.6);
        }
        other => panic!("expected jumping, got {:?}", other),
    }

    let (_, peak) = run_vertical_until_grounded(&world, &mut position, &mut airborne, 600);
    assert!(peak <= 0.8 + 1e-5, "peak = {}", peak);
}

#[test]
fn test_no_double_jump() {
    let world = flat();
    let mut airborne = Airborne::Falling { velocity: 2.0 };

    assert!(!begin_jump(&world, &config(), Vec3::new(0.0, 1.0, 0.0), &mut airborne));
    assert_eq!(airborne, Airborne::Falling { velocity: 2.0 });
}

#[test]
fn test_fast_fall_does_not_tunnel_through_floor() {
    let world = flat();
    let mut position = Vec3::new(0.0, 0.5, 0.0);
    let mut airborne = Airborne::Falling { velocity: 200.0 };

    let landed = integrate_vertical(&world, &config(), &mut position, &mut airborne, DT);

    assert!(landed);
    assert_eq!(position.y, 0.0);
    assert!(airborne.is_grounded());
}

#[test]
fn test_unloaded_world_keeps_falling() {
    let mut position = Vec3::new(0.0, 5.0, 0.0);
    let mut airborne = Airborne::Falling { velocity: 0.0 };

    for _ in 0..10 {
        integrate_vertical(&UnloadedWorld, &config(), &mut position, &mut airborne, DT);
    }

    assert!(position.y < 5.0);
    assert!(matches!(airborne, Airborne::Falling { .. }));
}

// --- Fall-through safeguard ---

#[test]
fn test_fall_through_resurfaces() {
    let world = flat();
    let mut position = Vec3::new(3.0, -4.0, 3.0);
    let mut airborne = Airborne::Falling { velocity: 9.0 };

    let repair = repair_fall_through(&world, &config(), &mut position, &mut airborne);

    assert_eq!(repair, FallRepair::Resurfaced);
    assert_eq!(position, Vec3::new(3.0, 0.0, 3.0));
    assert!(airborne.is_grounded());
}

#[test]
fn test_fall_through_outside_map_needs_respawn() {
    let world = flat();
    let mut position = Vec3::new(60.0, -4.0, 0.0);
    let mut airborne = Airborne::Falling { velocity: 9.0 };

    let repair = repair_fall_through(&world, &config(), &mut position, &mut airborne);

    assert_eq!(repair, FallRepair::NeedsRespawn);
}

#[test]
fn test_above_floor_is_intact() {
    let world = flat();
    let mut position = Vec3::new(0.0, -0.5, 0.0);
    let mut airborne = Airborne::Grounded;

    assert_eq!(
        repair_fall_through(&world, &config(), &mut position, &mut airborne),
        FallRepair::Intact
    );
}
