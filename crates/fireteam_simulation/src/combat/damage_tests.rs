//! Unit tests: weapon gating, damage, bullet travel

use super::*;
use crate::clock::Timestamp;
use crate::components::Health;
use crate::config::WeaponConfig;
use crate::world::BodyPart;
use bevy::prelude::*;

fn weapon() -> Weapon {
    Weapon::from_config(&WeaponConfig::default())
}

// --- Damage ---

#[test]
fn test_three_hits_of_35() {
    let mut health = Health::new(100);

    assert_eq!(apply_hit(&mut health, 35), HitOutcome::Wounded { remaining: 65 });
    assert_eq!(apply_hit(&mut health, 35), HitOutcome::Wounded { remaining: 30 });
    assert_eq!(apply_hit(&mut health, 35), HitOutcome::Killed);
    assert_eq!(health.current, 0);
}

#[test]
fn test_headshot_multiplies_base_damage() {
    let weapon = weapon();

    assert_eq!(weapon.damage_for(BodyPart::Body), 35);
    assert_eq!(weapon.damage_for(BodyPart::Head), 70);
}

#[test]
fn test_exact_lethal_damage_kills() {
    let mut health = Health::new(70);
    assert_eq!(apply_hit(&mut health, 70), HitOutcome::Killed);
}

// --- Fire gating ---

#[test]
fn test_cooldown_gates_next_shot() {
    let mut weapon = weapon();
    let now = Timestamp::from_millis(1_000);
    assert!(weapon.ready(now));

    weapon.consume(now);

    assert!(!weapon.ready(Timestamp::from_millis(1_299)));
    assert!(weapon.ready(Timestamp::from_millis(1_300)));
}

// --- Bullet travel ---

fn bullet(distance: f32, speed: f32) -> Bullet {
    Bullet {
        seq: 0,
        shooter: Entity::from_raw(0),
        target_point: Vec3::new(0.0, 0.0, -distance),
        target: None,
        headshot: false,
        damage: 0,
        distance,
        traveled: 0.0,
        speed,
    }
}

#[test]
fn test_bullet_arrives_after_travel_time() {
    let weapon = weapon();
    assert_eq!(weapon.travel_secs(40.0), 0.5);

    let mut bullet = bullet(40.0, weapon.bullet_speed);
    assert!(!bullet.advance(0.25));
    assert!(bullet.advance(0.25));
}

#[test]
fn test_zero_speed_bullet_arrives_immediately() {
    let mut bullet = bullet(10.0, 0.0);
    assert!(bullet.advance(0.016));
}

#[test]
fn test_bullet_sequence_is_monotonic() {
    let mut sequence = BulletSequence::default();
    assert_eq!(sequence.take(), 0);
    assert_eq!(sequence.take(), 1);
    assert_eq!(sequence.next, 2);
}

#[test]
fn test_aim_ray_uses_eye_height_and_pitch() {
    let transform = Transform::from_xyz(1.0, 0.0, 2.0);

    let level = aim_ray(&transform, 1.6, 0.0).unwrap();
    assert_eq!(level.origin, Vec3::new(1.0, 1.6, 2.0));
    assert!((*level.direction - Vec3::NEG_Z).length() < 1e-5);

    let up = aim_ray(&transform, 1.6, 0.5).unwrap();
    assert!(up.direction.y > 0.0);
}
