//! Snapshots мира: capture / restore по stable ActorId
//!
//! Восстанавливается всё, что влияет на следующие тики: часы, позиция RNG,
//! акторы (позиция, здоровье, locomotion, путь, мозг NPC, оружие) и пули
//! в полёте. Entity не сериализуются: ссылки идут через `ActorId` и `Roster`,
//! поэтому restore работает в другом app с теми же акторами.
//!
//! Impact markers не сохраняются (только presentation).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ai::{Behavior, NpcBrain};
use crate::animation::{Action, AnimationState};
use crate::clock::{SimClock, Timestamp};
use crate::combat::{Bullet, BulletSequence, Weapon};
use crate::components::{Actor, ActorId, Health, LifeState, NavAgent, Roster, ScoreCard};
use crate::error::SimError;
use crate::locomotion::{Airborne, Locomotion};
use crate::navigation::PathFollower;
use crate::player::{HeadBob, PlayerLook};
use crate::world::GroupId;
use crate::DeterministicRng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub now: Timestamp,
    pub tick: u64,
    pub rng_seed: u64,
    /// Позиция ChaCha stream (u128 как hi/lo)
    pub rng_word_pos_hi: u64,
    pub rng_word_pos_lo: u64,
    pub next_bullet: u64,
    pub actors: Vec<ActorSnapshot>,
    pub bullets: Vec<BulletSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub health: u32,
    pub life: LifeState,
    pub score: ScoreCard,
    pub airborne: Airborne,
    pub moving: bool,
    pub action: Option<Action>,
    pub weapon_ready_at: Option<Timestamp>,
    pub look: Option<PlayerLook>,
    pub head_bob: Option<HeadBob>,
    pub npc: Option<NpcSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub behavior: Behavior,
    pub target: Option<ActorId>,
    pub next_detection_at: Timestamp,
    pub path: Vec<[f32; 3]>,
    pub facing: Option<[f32; 4]>,
    pub group: Option<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub seq: u64,
    pub shooter: ActorId,
    pub target_point: [f32; 3],
    pub target: Option<ActorId>,
    pub headshot: bool,
    pub damage: u32,
    pub distance: f32,
    pub traveled: f32,
    pub speed: f32,
}

impl WorldSnapshot {
    pub fn to_json(&self) -> Result<String, SimError> {
        serde_json::to_string(self).map_err(SimError::Snapshot)
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        serde_json::from_str(json).map_err(SimError::Snapshot)
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.actors.iter().find(|actor| actor.id == id)
    }
}

type ActorQuery<'a> = (
    Entity,
    &'a Actor,
    &'a Transform,
    &'a Health,
    &'a LifeState,
    &'a ScoreCard,
    &'a Locomotion,
    &'a AnimationState,
    Option<&'a Weapon>,
    Option<&'a PlayerLook>,
    Option<&'a HeadBob>,
    Option<&'a NpcBrain>,
    Option<&'a PathFollower>,
    Option<&'a NavAgent>,
);

/// Snapshot текущего состояния (акторы и пули в порядке ActorId / seq)
pub fn capture(world: &mut World) -> WorldSnapshot {
    let clock = world.get_resource::<SimClock>().cloned().unwrap_or_default();
    let (rng_seed, word_pos) = world
        .get_resource::<DeterministicRng>()
        .map(|rng| (rng.seed, rng.rng.get_word_pos()))
        .unwrap_or((0, 0));
    let next_bullet = world.get_resource::<BulletSequence>().map(|seq| seq.next).unwrap_or(0);

    let mut ids = HashMap::new();
    let mut actors = Vec::new();
    let mut query = world.query::<ActorQuery>();
    for (entity, actor, transform, health, life, score, locomotion, animation, weapon, look, bob, brain, path, nav) in
        query.iter(world)
    {
        ids.insert(entity, actor.id);

        let npc = brain.map(|brain| NpcSnapshot {
            behavior: brain.behavior,
            target: brain.target,
            next_detection_at: brain.next_detection_at,
            path: path
                .map(|path| path.waypoints().map(|point| point.to_array()).collect())
                .unwrap_or_default(),
            facing: path.and_then(|path| path.facing_target).map(|facing| facing.to_array()),
            group: nav.and_then(|nav| nav.group),
        });

        actors.push(ActorSnapshot {
            id: actor.id,
            position: transform.translation.to_array(),
            rotation: transform.rotation.to_array(),
            health: health.current,
            life: *life,
            score: *score,
            airborne: locomotion.airborne,
            moving: locomotion.moving,
            action: animation.current(),
            weapon_ready_at: weapon.map(|weapon| weapon.next_fire_allowed_at),
            look: look.copied(),
            head_bob: bob.copied(),
            npc,
        });
    }
    actors.sort_by_key(|actor| actor.id);

    let mut bullets = Vec::new();
    let mut query = world.query::<&Bullet>();
    for bullet in query.iter(world) {
        let Some(shooter) = ids.get(&bullet.shooter).copied() else {
            continue;
        };
        bullets.push(BulletSnapshot {
            seq: bullet.seq,
            shooter,
            target_point: bullet.target_point.to_array(),
            target: bullet.target.and_then(|target| ids.get(&target).copied()),
            headshot: bullet.headshot,
            damage: bullet.damage,
            distance: bullet.distance,
            traveled: bullet.traveled,
            speed: bullet.speed,
        });
    }
    bullets.sort_by_key(|bullet| bullet.seq);

    WorldSnapshot {
        now: clock.now,
        tick: clock.tick,
        rng_seed,
        rng_word_pos_hi: (word_pos >> 64) as u64,
        rng_word_pos_lo: word_pos as u64,
        next_bullet,
        actors,
        bullets,
    }
}

fn entity_for(roster: Option<&Roster>, id: ActorId) -> Result<Entity, SimError> {
    roster
        .and_then(|roster| roster.entity(id))
        .ok_or(SimError::UnknownActor(id))
}

/// Восстанавливает snapshot в world с теми же акторами (по ActorId)
///
/// Все ссылки проверяются до первой записи: при `UnknownActor` world
/// остаётся нетронутым.
pub fn restore(world: &mut World, snapshot: &WorldSnapshot) -> Result<(), SimError> {
    let roster = world.get_resource::<Roster>();
    let actors = snapshot
        .actors
        .iter()
        .map(|actor| entity_for(roster, actor.id).map(|entity| (entity, actor)))
        .collect::<Result<Vec<_>, _>>()?;
    let bullets = snapshot
        .bullets
        .iter()
        .map(|bullet| {
            let shooter = entity_for(roster, bullet.shooter)?;
            let target = bullet.target.map(|id| entity_for(roster, id)).transpose()?;
            Ok((bullet, shooter, target))
        })
        .collect::<Result<Vec<_>, SimError>>()?;

    if let Some((_, actor)) = actors.iter().find(|(entity, _)| world.get_entity(*entity).is_err()) {
        return Err(SimError::UnknownActor(actor.id));
    }

    {
        let mut clock = world.get_resource_or_insert_with(SimClock::default);
        clock.now = snapshot.now;
        clock.tick = snapshot.tick;
    }
    {
        let word_pos = ((snapshot.rng_word_pos_hi as u128) << 64) | snapshot.rng_word_pos_lo as u128;
        let mut rng = ChaCha8Rng::seed_from_u64(snapshot.rng_seed);
        rng.set_word_pos(word_pos);
        world.insert_resource(DeterministicRng {
            rng,
            seed: snapshot.rng_seed,
        });
    }
    world.insert_resource(BulletSequence {
        next: snapshot.next_bullet,
    });

    for (entity, actor) in actors {
        restore_actor(world, entity, actor);
    }

    let stale: Vec<Entity> = world.query_filtered::<Entity, With<Bullet>>().iter(world).collect();
    for entity in stale {
        world.despawn(entity);
    }
    for (bullet, shooter, target) in bullets {
        world.spawn(Bullet {
            seq: bullet.seq,
            shooter,
            target_point: Vec3::from_array(bullet.target_point),
            target,
            headshot: bullet.headshot,
            damage: bullet.damage,
            distance: bullet.distance,
            traveled: bullet.traveled,
            speed: bullet.speed,
        });
    }

    crate::log(&format!(
        "💾 restored snapshot: tick {}, {} actors, {} bullets",
        snapshot.tick,
        snapshot.actors.len(),
        snapshot.bullets.len()
    ));
    Ok(())
}

fn restore_actor(world: &mut World, entity: Entity, snapshot: &ActorSnapshot) {
    let Ok(mut actor) = world.get_entity_mut(entity) else {
        return;
    };

    if let Some(mut transform) = actor.get_mut::<Transform>() {
        transform.translation = Vec3::from_array(snapshot.position);
        transform.rotation = Quat::from_array(snapshot.rotation);
    }
    if let Some(mut health) = actor.get_mut::<Health>() {
        health.set(snapshot.health);
    }
    if let Some(mut life) = actor.get_mut::<LifeState>() {
        *life = snapshot.life;
    }
    if let Some(mut score) = actor.get_mut::<ScoreCard>() {
        *score = snapshot.score;
    }
    if let Some(mut locomotion) = actor.get_mut::<Locomotion>() {
        locomotion.airborne = snapshot.airborne;
        locomotion.moving = snapshot.moving;
    }
    if let Some(mut animation) = actor.get_mut::<AnimationState>() {
        animation.restore(snapshot.action);
    }
    if let (Some(ready_at), Some(mut weapon)) = (snapshot.weapon_ready_at, actor.get_mut::<Weapon>()) {
        weapon.next_fire_allowed_at = ready_at;
    }
    if let (Some(look), Some(mut current)) = (snapshot.look, actor.get_mut::<PlayerLook>()) {
        *current = look;
    }
    if let (Some(bob), Some(mut current)) = (snapshot.head_bob, actor.get_mut::<HeadBob>()) {
        *current = bob;
    }

    let Some(npc) = &snapshot.npc else {
        return;
    };
    if let Some(mut brain) = actor.get_mut::<NpcBrain>() {
        brain.behavior = npc.behavior;
        brain.target = npc.target;
        brain.next_detection_at = npc.next_detection_at;
    }
    if let Some(mut path) = actor.get_mut::<PathFollower>() {
        path.replace(npc.path.iter().copied().map(Vec3::from_array));
        path.facing_target = npc.facing.map(Quat::from_array);
    }
    if let Some(mut nav) = actor.get_mut::<NavAgent>() {
        nav.group = npc.group;
    }
}
