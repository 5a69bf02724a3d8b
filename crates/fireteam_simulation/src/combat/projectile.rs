//! Пули в полёте + impact markers
//!
//! Hit-scan решает, куда летит пуля, в момент выстрела; урон применяется
//! только когда `traveled >= distance`. Отмены полёта нет: пуля всегда
//! заканчивается уроном или impact marker.

use bevy::prelude::*;

use super::damage::{apply_hit, HitOutcome};
use super::events::{ActorDied, BulletImpact, DamageDealt};
use crate::animation::{Action, AnimationState};
use crate::clock::SimClock;
use crate::components::{Actor, Health, LifeState, ScoreCard};
use crate::config::GameConfig;
use crate::locomotion::Locomotion;
use crate::navigation::PathFollower;
use crate::world::{HitVolume, HitVolumeIndex};

/// Пуля в полёте
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    /// Порядок выстрела (пули одного тика прилетают в порядке выстрелов)
    pub seq: u64,
    pub shooter: Entity,
    pub target_point: Vec3,
    /// Hit-volume, в который попал hit-scan (None = геометрия)
    pub target: Option<Entity>,
    pub headshot: bool,
    pub damage: u32,
    /// Расстояние до target_point на момент выстрела
    pub distance: f32,
    pub traveled: f32,
    pub speed: f32,
}

impl Bullet {
    /// Продвигает пулю; true = долетела
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.speed <= 0.0 {
            self.traveled = self.distance;
            return true;
        }
        self.traveled += self.speed * dt;
        self.traveled >= self.distance
    }
}

/// Resource: счётчик выстрелов
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulletSequence {
    pub next: u64,
}

impl BulletSequence {
    pub fn take(&mut self) -> u64 {
        let seq = self.next;
        self.next += 1;
        seq
    }
}

/// След попадания в геометрию (затухает)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ImpactMarker {
    pub point: Vec3,
    pub opacity: f32,
}

impl ImpactMarker {
    pub fn at(point: Vec3) -> Self {
        Self { point, opacity: 1.0 }
    }
}

/// Система: полёт пуль, урон в момент прилёта
///
/// Смерть: Dead + respawn timer, deaths += 1, death анимация по движению,
/// путь сброшен, hit-volume за пределами арены. Kill credit стрелку
/// (player ещё и лечится на `kill_heal`, если жив).
#[allow(clippy::type_complexity, clippy::too_many_arguments)]
pub fn advance_bullets(
    mut commands: Commands,
    mut bullets: Query<(Entity, &mut Bullet)>,
    mut actors: Query<(
        &Actor,
        &mut Health,
        &mut LifeState,
        &mut ScoreCard,
        &Locomotion,
        &mut AnimationState,
        &mut HitVolume,
        Option<&mut PathFollower>,
    )>,
    mut index: ResMut<HitVolumeIndex>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut damage_events: EventWriter<DamageDealt>,
    mut deaths: EventWriter<ActorDied>,
    mut impacts: EventWriter<BulletImpact>,
) {
    let dt = clock.delta_secs();
    let now = clock.now;

    let mut arrived: Vec<(Entity, Bullet)> = bullets
        .iter_mut()
        .filter_map(|(entity, mut bullet)| bullet.advance(dt).then_some((entity, *bullet)))
        .collect();
    arrived.sort_by_key(|(_, bullet)| bullet.seq);

    for (bullet_entity, bullet) in arrived {
        commands.entity(bullet_entity).despawn();

        let victim = match bullet.target {
            Some(target) => match actors.get_mut(target) {
                Ok(item) if item.2.is_alive() => Some((target, item)),
                _ => None,
            },
            None => None,
        };

        // Геометрия, или цель умерла раньше прилёта
        let Some((target, (actor, mut health, mut life, mut score, locomotion, mut animation, mut volume, path))) =
            victim
        else {
            commands.spawn(ImpactMarker::at(bullet.target_point));
            impacts.write(BulletImpact {
                shooter: bullet.shooter,
                point: bullet.target_point,
            });
            continue;
        };

        let outcome = apply_hit(&mut health, bullet.damage);
        damage_events.write(DamageDealt {
            attacker: bullet.shooter,
            target,
            damage: bullet.damage,
            headshot: bullet.headshot,
            remaining: health.current,
        });

        if let HitOutcome::Wounded { remaining } = outcome {
            crate::log(&format!(
                "🎯 {} hit for {}{} ({} hp left)",
                actor.name,
                bullet.damage,
                if bullet.headshot { " (headshot)" } else { "" },
                remaining
            ));
            continue;
        }

        *life = LifeState::Dead {
            died_at: now,
            respawn_at: now.after(config.combat.respawn_delay()),
        };
        score.deaths += 1;

        let death = Action::death(locomotion.moving || locomotion.is_airborne());
        animation.request(death);
        if let Some(mut path) = path {
            path.clear();
        }
        volume.park();
        index.mark_dead(target);

        let victim_id = actor.id;
        let victim_name = actor.name.clone();

        // Kill credit
        let killer_id = match actors.get_mut(bullet.shooter) {
            Ok((killer, mut killer_health, killer_life, mut killer_score, ..)) => {
                killer_score.kills += 1;
                if killer.is_player() && killer_life.is_alive() {
                    killer_health.heal(config.player.kill_heal);
                }
                crate::log(&format!("💀 {} killed by {}", victim_name, killer.name));
                Some(killer.id)
            }
            Err(_) => {
                crate::log(&format!("💀 {} killed", victim_name));
                None
            }
        };

        deaths.write(ActorDied {
            actor: target,
            id: victim_id,
            killer: bullet.shooter,
            killer_id,
            animation: death,
        });
    }
}

/// Система: затухание impact markers, полностью прозрачные удаляются
pub fn fade_impacts(
    mut commands: Commands,
    mut markers: Query<(Entity, &mut ImpactMarker)>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
) {
    let fade = config.combat.impact_fade_speed * clock.delta_secs();

    for (entity, mut marker) in markers.iter_mut() {
        marker.opacity -= fade;
        if marker.opacity <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
