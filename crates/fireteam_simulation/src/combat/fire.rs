//! Fire gating + hit-scan
//!
//! Fire intent: зажатый курок у игрока, Alert с целью у NPC.
//! Выстрел без попадания (ни актор, ни геометрия) не происходит:
//! cooldown не тратится.

use bevy::prelude::*;

use super::events::WeaponFired;
use super::projectile::{Bullet, BulletSequence};
use super::weapon::Weapon;
use crate::ai::systems::transition;
use crate::ai::{Behavior, BehaviorChanged, NpcBrain};
use crate::animation::{Action, AnimationState};
use crate::clock::SimClock;
use crate::components::{Actor, LifeState};
use crate::config::GameConfig;
use crate::navigation::facing_toward;
use crate::player::{HeadBob, PlayerInput, PlayerLook};
use crate::world::{line_of_fire, resolve_hitscan, BodyPart, HitTarget, HitVolumeIndex, LineOfFire, WorldQueries};

/// Луч прицела
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimRay {
    pub origin: Vec3,
    pub direction: Dir3,
}

/// Луч из глаз игрока: yaw тела + pitch прицела
pub fn aim_ray(transform: &Transform, eye_height: f32, pitch: f32) -> Option<AimRay> {
    let direction = transform.rotation * Quat::from_rotation_x(pitch) * Vec3::NEG_Z;
    Some(AimRay {
        origin: transform.translation + Vec3::Y * eye_height,
        direction: Dir3::new(direction).ok()?,
    })
}

/// Система: выстрелы (player и NPC в порядке ActorId)
///
/// NPC перепроверяет линию огня перед выстрелом: закрыта → Hunt,
/// следующий scan немедленно. Цель умерла → выстрела нет, состояние
/// не меняется до следующего scan.
#[allow(clippy::type_complexity, clippy::too_many_arguments)]
pub fn fire_weapons(
    mut commands: Commands,
    mut shooters: Query<(
        Entity,
        &Actor,
        &mut Transform,
        &LifeState,
        &mut Weapon,
        &mut AnimationState,
        Option<&PlayerInput>,
        Option<&PlayerLook>,
        Option<&HeadBob>,
        Option<&mut NpcBrain>,
    )>,
    index: Res<HitVolumeIndex>,
    world: Res<WorldQueries>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut sequence: ResMut<BulletSequence>,
    mut fired: EventWriter<WeaponFired>,
    mut changes: EventWriter<BehaviorChanged>,
) {
    let now = clock.now;

    let mut ordered: Vec<_> = shooters.iter_mut().collect();
    ordered.sort_by_key(|(_, actor, ..)| actor.id);

    for (entity, actor, mut transform, life, mut weapon, mut animation, input, look, bob, brain) in ordered {
        if life.is_dead() || !weapon.ready(now) {
            continue;
        }

        let aim = if let Some(mut brain) = brain {
            let Some(target_id) = brain.wants_to_fire() else {
                continue;
            };
            let Some(target) = index.get_by_id(target_id).copied() else {
                continue;
            };

            let muzzle = transform.translation + Vec3::Y * config.npc.muzzle_height;
            match line_of_fire(world.backend(), &index, muzzle, entity, target.entity) {
                LineOfFire::Clear { .. } => {}
                LineOfFire::Occluded { .. } => {
                    // Цель закрылась после scan
                    transition(entity, actor, &mut brain, Behavior::Hunt, Some(target_id), &mut changes);
                    brain.next_detection_at = now;
                    continue;
                }
                // Мёртвая цель отпадёт на следующем scan, до него просто не стреляем
                LineOfFire::NoTarget => continue,
            }

            if let Some(facing) = facing_toward(transform.translation, target.position) {
                transform.rotation = facing;
            }
            let Ok(direction) = Dir3::new(target.aim_point() - muzzle) else {
                continue;
            };
            animation.request(Action::Firing);
            AimRay {
                origin: muzzle,
                direction,
            }
        } else {
            if !input.is_some_and(|input| input.fire_held) {
                continue;
            }
            let eye_height = bob.map(|bob| bob.offset).unwrap_or(HeadBob::default().offset);
            let pitch = look.map(|look| look.pitch).unwrap_or(0.0);
            let Some(aim) = aim_ray(&transform, eye_height, pitch) else {
                continue;
            };
            aim
        };

        let Some(hit) = resolve_hitscan(world.backend(), &index, aim.origin, aim.direction, weapon.range, entity)
        else {
            continue;
        };

        weapon.consume(now);

        let part = match hit.target {
            HitTarget::Actor { part, .. } => Some(part),
            HitTarget::World => None,
        };
        let damage = part.map(|part| weapon.damage_for(part)).unwrap_or(0);
        let travel_secs = weapon.travel_secs(hit.distance);

        commands.spawn(Bullet {
            seq: sequence.take(),
            shooter: entity,
            target_point: hit.point,
            target: hit.actor(),
            headshot: part == Some(BodyPart::Head),
            damage,
            distance: hit.distance,
            traveled: 0.0,
            speed: weapon.bullet_speed,
        });

        fired.write(WeaponFired {
            shooter: entity,
            origin: aim.origin,
            target_point: hit.point,
            target: hit.actor(),
            part,
            damage,
            travel_secs,
        });
    }
}
