//! NPC behavior systems

use bevy::prelude::*;

use super::detection::{pick_target, scan_candidates, CandidateRange};
use super::{Behavior, BehaviorChanged, NpcBrain};
use crate::animation::{Action, AnimationState};
use crate::clock::SimClock;
use crate::components::{Actor, ActorId, LifeState, NavAgent};
use crate::config::GameConfig;
use crate::locomotion::Locomotion;
use crate::navigation::{facing_toward, request_path, PathFollower, PathRequest};
use crate::world::{line_of_fire, HitVolumeIndex, LineOfFire, WorldQueries};
use crate::DeterministicRng;

pub(crate) fn transition(
    npc: Entity,
    actor: &Actor,
    brain: &mut NpcBrain,
    to: Behavior,
    target: Option<ActorId>,
    changes: &mut EventWriter<BehaviorChanged>,
) {
    brain.target = target;
    if brain.behavior == to {
        return;
    }

    crate::log(&format!(
        "🧠 {}: {} → {} (target {:?})",
        actor.name,
        brain.behavior.as_str(),
        to.as_str(),
        target
    ));
    changes.write(BehaviorChanged {
        npc,
        from: brain.behavior,
        to,
        target,
    });
    brain.behavior = to;
}

/// Цели нет: general behavior, путь к старой цели сброшен
/// (follow_paths выберет новый destination на следующем тике)
fn return_to_general(
    npc: Entity,
    actor: &Actor,
    brain: &mut NpcBrain,
    path: &mut PathFollower,
    changes: &mut EventWriter<BehaviorChanged>,
) {
    let general = brain.general;
    if brain.behavior != general {
        path.clear();
    }
    transition(npc, actor, brain, general, None, changes);
}

/// Система: периодический scan целей NPC
///
/// Не каждый тик: следующий scan в `now + detection.interval`.
/// - нет кандидатов → general behavior, цель сброшена
/// - alert кандидаты → чистая линия огня: Alert (стоим, смотрим на цель),
///   закрыта: Hunt
/// - hunt кандидаты → Hunt (новый путь к цели на каждом scan)
///
/// Умершая цель не даёт немедленного перехода — она просто не попадёт
/// в следующий scan.
#[allow(clippy::type_complexity)]
pub fn detect_targets(
    mut npcs: Query<(
        Entity,
        &Actor,
        &mut NpcBrain,
        &mut Transform,
        &LifeState,
        &mut Locomotion,
        &mut AnimationState,
        &mut PathFollower,
        &mut NavAgent,
    )>,
    index: Res<HitVolumeIndex>,
    world: Res<WorldQueries>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut changes: EventWriter<BehaviorChanged>,
) {
    let now = clock.now;

    // Порядок по ActorId: RNG потребляется детерминированно
    let mut ordered: Vec<_> = npcs.iter_mut().collect();
    ordered.sort_by_key(|(_, actor, ..)| actor.id);

    for (entity, actor, mut brain, mut transform, life, mut locomotion, mut animation, mut path, mut nav) in
        ordered
    {
        if life.is_dead() || now < brain.next_detection_at {
            continue;
        }
        brain.next_detection_at = now.after(brain.detection.interval());

        let position = transform.translation;
        let forward = *transform.forward();

        let Some(candidates) = scan_candidates(&index, entity, position, forward, &brain.detection) else {
            return_to_general(entity, actor, &mut brain, &mut path, &mut changes);
            continue;
        };

        let Some(target) = pick_target(brain.target, &candidates, &mut rng.rng).copied() else {
            return_to_general(entity, actor, &mut brain, &mut path, &mut changes);
            continue;
        };

        let line = match candidates.range {
            CandidateRange::Alert => {
                let muzzle = position + Vec3::Y * config.npc.muzzle_height;
                line_of_fire(world.backend(), &index, muzzle, entity, target.entity)
            }
            CandidateRange::Hunt => LineOfFire::NoTarget,
        };

        if line.is_clear() {
            let entering = brain.behavior != Behavior::Alert;
            transition(entity, actor, &mut brain, Behavior::Alert, Some(target.id), &mut changes);

            path.clear();
            locomotion.moving = false;
            if let Some(facing) = facing_toward(position, target.position) {
                transform.rotation = facing;
            }
            if entering {
                animation.request(Action::Idle);
            }
            continue;
        }

        // Hunt: цель дальше alert range или линия огня закрыта
        transition(entity, actor, &mut brain, Behavior::Hunt, Some(target.id), &mut changes);

        let mut position = position;
        match request_path(world.backend(), &mut nav, &mut path, &mut position, target.position) {
            PathRequest::Found => {
                animation.request(Action::Running);
            }
            PathRequest::NoPath => {
                crate::log(&format!(
                    "🚧 {}: no path to target {:?}, holding position",
                    actor.name, target.id
                ));
                animation.request(Action::Idle);
            }
        }
        transform.translation = position;
    }
}
