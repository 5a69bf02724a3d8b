//! Locomotion ECS systems

use bevy::prelude::*;

use super::controller::{integrate_vertical, repair_fall_through, FallRepair};
use super::Locomotion;
use crate::clock::SimClock;
use crate::components::{Actor, LifeState, NavAgent};
use crate::config::GameConfig;
use crate::logger;
use crate::navigation::PathFollower;
use crate::spawn::pick_spawn_point;
use crate::world::WorldQueries;
use crate::DeterministicRng;

/// Система: jump/fall интегратор для всех живых акторов
pub fn apply_vertical_motion(
    mut actors: Query<(&mut Transform, &mut Locomotion, &LifeState)>,
    world: Res<WorldQueries>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
) {
    let dt = clock.delta_secs();

    for (mut transform, mut locomotion, life) in actors.iter_mut() {
        if life.is_dead() || locomotion.airborne.is_grounded() {
            continue;
        }

        let mut position = transform.translation;
        integrate_vertical(
            world.backend(),
            &config.locomotion,
            &mut position,
            &mut locomotion.airborne,
            dt,
        );
        transform.translation = position;
    }
}

/// Система: защита от провала сквозь navmesh
///
/// Invariant repair, не штатный путь — каждый случай логируется.
pub fn guard_world_floor(
    mut actors: Query<(
        &Actor,
        &mut Transform,
        &mut Locomotion,
        &LifeState,
        Option<&mut NavAgent>,
        Option<&mut PathFollower>,
    )>,
    world: Res<WorldQueries>,
    config: Res<GameConfig>,
    mut rng: ResMut<DeterministicRng>,
) {
    // Порядок по ActorId: respawn fallback потребляет RNG
    let mut ordered: Vec<_> = actors.iter_mut().collect();
    ordered.sort_by_key(|(actor, ..)| actor.id);

    for (actor, mut transform, mut locomotion, life, nav_agent, path) in ordered {
        if life.is_dead() {
            continue;
        }

        let mut position = transform.translation;
        match repair_fall_through(world.backend(), &config.locomotion, &mut position, &mut locomotion.airborne) {
            FallRepair::Intact => continue,
            FallRepair::Resurfaced => {
                logger::log_warning(&format!(
                    "⚠️ {} fell through the navmesh, resurfaced at {:?}",
                    actor.name, position
                ));
            }
            FallRepair::NeedsRespawn => {
                let Some(spawn) = pick_spawn_point(&config, &mut rng) else {
                    logger::log_error(&format!(
                        "❌ {} fell through the navmesh and no spawn point is configured",
                        actor.name
                    ));
                    continue;
                };
                logger::log_warning(&format!(
                    "⚠️ {} fell through the navmesh, no surface below, moved to spawn {:?}",
                    actor.name, spawn
                ));
                position = spawn;
            }
        }

        transform.translation = position;
        locomotion.reset();

        if let Some(mut nav_agent) = nav_agent {
            nav_agent.group = None;
        }
        if let Some(mut path) = path {
            path.clear();
        }
    }
}
