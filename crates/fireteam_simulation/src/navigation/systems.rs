//! Path follower ECS systems

use bevy::prelude::*;

use super::follower::{advance_along_path, request_path, LegOutcome, PathRequest};
use super::PathFollower;
use crate::ai::{next_destination, NpcBrain};
use crate::animation::{Action, AnimationState};
use crate::clock::SimClock;
use crate::components::{Actor, LifeState, MovementSpeed, NavAgent};
use crate::config::GameConfig;
use crate::locomotion::Locomotion;
use crate::world::{HitVolumeIndex, WorldQuery, WorldQueries};
use crate::DeterministicRng;

fn start_next_path(
    world: &dyn WorldQuery,
    nav: &mut NavAgent,
    path: &mut PathFollower,
    position: &mut Vec3,
    destination: Vec3,
    animation: &mut AnimationState,
) -> bool {
    match request_path(world, nav, path, position, destination) {
        PathRequest::Found => {
            animation.request(Action::Running);
            true
        }
        PathRequest::NoPath => {
            animation.request(Action::Idle);
            false
        }
    }
}

/// Система: движение NPC по пути
///
/// - путь пуст → новый путь к `next_destination` (если поведение куда-то ведёт)
/// - нога завершена и путь исчерпан → новый путь, либо snap на waypoint + idle
/// - шаг отклонён ground following → путь сброшен, новый на следующем тике
#[allow(clippy::type_complexity)]
pub fn follow_paths(
    mut npcs: Query<(
        Entity,
        &Actor,
        &NpcBrain,
        &mut Transform,
        &LifeState,
        &mut Locomotion,
        &mut PathFollower,
        &mut NavAgent,
        &MovementSpeed,
        &mut AnimationState,
    )>,
    index: Res<HitVolumeIndex>,
    world: Res<WorldQueries>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
) {
    let dt = clock.delta_secs();
    let world = world.backend();

    let mut ordered: Vec<_> = npcs.iter_mut().collect();
    ordered.sort_by_key(|(_, actor, ..)| actor.id);

    for (entity, actor, brain, mut transform, life, mut locomotion, mut path, mut nav, speed, mut animation) in
        ordered
    {
        if life.is_dead() {
            continue;
        }

        locomotion.moving = false;
        let mut position = transform.translation;

        if path.is_empty() {
            if let Some(destination) = next_destination(brain, entity, position, &index, &mut rng.rng) {
                start_next_path(world, &mut nav, &mut path, &mut position, destination, &mut animation);
                transform.translation = position;
            }
            continue;
        }

        let mut rotation = transform.rotation;
        let outcome = advance_along_path(
            world,
            &config.locomotion,
            &mut path,
            &mut position,
            &mut rotation,
            &mut locomotion.airborne,
            speed.speed,
            dt,
        );

        match outcome {
            LegOutcome::NoPath => {}
            LegOutcome::Advancing | LegOutcome::LegComplete { exhausted: false, .. } => {
                locomotion.moving = true;
            }
            LegOutcome::LegComplete {
                reached,
                exhausted: true,
            } => {
                locomotion.moving = true;
                match next_destination(brain, entity, position, &index, &mut rng.rng) {
                    Some(destination) => {
                        start_next_path(world, &mut nav, &mut path, &mut position, destination, &mut animation);
                    }
                    None => {
                        position = reached;
                        animation.request(Action::Idle);
                    }
                }
            }
            LegOutcome::Blocked => {
                crate::log_warning(&format!(
                    "🚧 {}: path leg blocked at {:?}, dropping path",
                    actor.name, position
                ));
                path.clear();
                animation.request(Action::Idle);
            }
        }

        transform.translation = position;
        transform.rotation = rotation;
    }
}
