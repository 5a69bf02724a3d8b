//! Respawn: Dead → Alive после `respawn_at`

use bevy::prelude::*;

use super::events::ActorRespawned;
use crate::ai::NpcBrain;
use crate::animation::{Action, AnimationState};
use crate::clock::SimClock;
use crate::components::{Actor, Health, LifeState, NavAgent};
use crate::config::GameConfig;
use crate::locomotion::Locomotion;
use crate::navigation::{facing_toward, PathFollower};
use crate::player::PlayerLook;
use crate::spawn::{pick_spawn_point, MAP_CENTER};
use crate::world::HitVolume;
use crate::DeterministicRng;

/// Система: respawn акторов с истёкшим таймером
///
/// Полное здоровье, случайный spawn point, hit-volume обратно в арену,
/// idle. NPC возвращается в general behavior без цели; navmesh группа
/// определится заново (spawn point может быть в другой).
#[allow(clippy::type_complexity)]
pub fn respawn_actors(
    mut actors: Query<(
        Entity,
        &Actor,
        &mut Transform,
        &mut Health,
        &mut LifeState,
        &mut HitVolume,
        &mut Locomotion,
        &mut AnimationState,
        Option<&mut NpcBrain>,
        Option<&mut PathFollower>,
        Option<&mut NavAgent>,
        Option<&mut PlayerLook>,
    )>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut respawned: EventWriter<ActorRespawned>,
) {
    let now = clock.now;

    // Порядок по ActorId: spawn points из RNG детерминированы
    let mut due: Vec<_> = actors
        .iter_mut()
        .filter(|(_, _, _, _, life, ..)| life.respawn_due(now))
        .collect();
    due.sort_by_key(|(_, actor, ..)| actor.id);

    for (entity, actor, mut transform, mut health, mut life, mut volume, mut locomotion, mut animation, brain, path, nav, look) in
        due
    {
        let Some(spawn) = pick_spawn_point(&config, &mut rng) else {
            crate::log_error(&format!("❌ {}: no spawn point configured, staying dead", actor.name));
            continue;
        };

        health.restore();
        *life = LifeState::Alive;
        transform.translation = spawn;
        volume.restore(spawn);
        locomotion.reset();
        animation.request(Action::Idle);

        if let Some(mut look) = look {
            look.pitch = 0.0;
        }
        if let Some(mut brain) = brain {
            brain.reset(now);
            if let Some(facing) = facing_toward(spawn, MAP_CENTER) {
                transform.rotation = facing;
            }
        }
        if let Some(mut path) = path {
            path.clear();
        }
        if let Some(mut nav) = nav {
            nav.group = None;
        }

        crate::log(&format!("✨ {} respawned at {:?}", actor.name, spawn));
        respawned.write(ActorRespawned {
            actor: entity,
            id: actor.id,
            position: spawn,
        });
    }
}
