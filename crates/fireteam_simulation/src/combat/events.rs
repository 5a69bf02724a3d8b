//! Combat events (для presentation collaborator)

use bevy::prelude::*;

use crate::animation::Action;
use crate::components::ActorId;
use crate::world::BodyPart;

/// Выстрел произошёл (hit-scan нашёл цель или геометрию)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct WeaponFired {
    pub shooter: Entity,
    pub origin: Vec3,
    pub target_point: Vec3,
    /// Актор, в hit-volume которого попал луч
    pub target: Option<Entity>,
    pub part: Option<BodyPart>,
    pub damage: u32,
    /// Время полёта пули (секунды)
    pub travel_secs: f32,
}

/// Урон применён (пуля долетела)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub headshot: bool,
    pub remaining: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ActorDied {
    pub actor: Entity,
    pub id: ActorId,
    pub killer: Entity,
    pub killer_id: Option<ActorId>,
    pub animation: Action,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ActorRespawned {
    pub actor: Entity,
    pub id: ActorId,
    pub position: Vec3,
}

/// Пуля долетела в геометрию (или цель умерла раньше прилёта)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BulletImpact {
    pub shooter: Entity,
    pub point: Vec3,
}
