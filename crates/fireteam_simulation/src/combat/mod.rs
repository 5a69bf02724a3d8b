//! Combat module: общий для player и NPC
//!
//! ECS ответственность:
//! - Fire gating (intent + cooldown), hit-scan (actors → world)
//! - Отложенный урон: пуля летит `distance / bullet_speed`, урон в момент прилёта
//! - Death / kill credit / respawn lifecycle
//! - Events: WeaponFired, DamageDealt, ActorDied, ActorRespawned, BulletImpact
//!
//! Порядок внутри тика (см. `SimSet`):
//! 1. advance_bullets, fade_impacts — прилёт пуль прошлых тиков
//! 2. respawn_actors — мёртвые с истёкшим таймером
//! 3. ... locomotion / behavior ...
//! 4. fire_weapons — новые выстрелы (прилетят на следующих тиках)

pub mod damage;
pub mod events;
pub mod fire;
pub mod projectile;
pub mod respawn;
pub mod weapon;

#[cfg(test)]
mod damage_tests;

pub use damage::{apply_hit, HitOutcome};
pub use events::{ActorDied, ActorRespawned, BulletImpact, DamageDealt, WeaponFired};
pub use fire::{aim_ray, fire_weapons, AimRay};
pub use projectile::{advance_bullets, fade_impacts, Bullet, BulletSequence, ImpactMarker};
pub use respawn::respawn_actors;
pub use weapon::Weapon;
