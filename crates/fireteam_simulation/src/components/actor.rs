//! Базовые компоненты акторов: Actor, Health, ScoreCard, LifeState

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clock::Timestamp;

/// Stable ID актора (не меняется за всю сессию, в отличие от отображаемого имени)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect, Serialize, Deserialize,
)]
pub struct ActorId(pub u32);

/// Тип актора: определяется один раз при создании
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Npc,
}

/// Актор (игрок или NPC) — базовый компонент для живых участников боя
///
/// Автоматически добавляет Health, ScoreCard, LifeState, hit-volume, locomotion
/// и animation state через Required Components.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    Health,
    ScoreCard,
    LifeState,
    crate::world::HitVolume,
    crate::locomotion::Locomotion,
    crate::animation::AnimationState
)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    /// Отображаемое имя (только для presentation/логов)
    pub name: String,
}

impl Actor {
    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }

    pub fn is_npc(&self) -> bool {
        self.kind == ActorKind::Npc
    }
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Возвращает остаток здоровья
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    /// Значение из snapshot (с clamp в [0, max])
    pub fn set(&mut self, value: u32) {
        self.current = value.min(self.max);
    }
}

/// Счётчики убийств/смертей (монотонно неубывающие)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct ScoreCard {
    pub kills: u32,
    pub deaths: u32,
}

/// Жизненный цикл: Alive → Dead (health 0) → Alive (после respawn)
///
/// Инвариант: Dead ⇔ health == 0 и respawn запланирован.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    #[default]
    Alive,
    Dead {
        died_at: Timestamp,
        respawn_at: Timestamp,
    },
}

impl LifeState {
    pub fn is_alive(&self) -> bool {
        matches!(self, LifeState::Alive)
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    pub fn respawn_due(&self, now: Timestamp) -> bool {
        match self {
            LifeState::Dead { respawn_at, .. } => now >= *respawn_at,
            LifeState::Alive => false,
        }
    }
}

/// Resource: выдача stable ID и lookup ActorId → Entity
///
/// Цели NPC хранятся по ActorId (weak reference): entity может умереть и
/// выпасть из кандидатов, но не исчезает из roster.
#[derive(Resource, Debug, Default)]
pub struct Roster {
    next_id: u32,
    entities: BTreeMap<ActorId, Entity>,
}

impl Roster {
    pub fn allocate(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn register(&mut self, id: ActorId, entity: Entity) {
        self.entities.insert(id, entity);
    }

    pub fn entity(&self, id: ActorId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }

    /// Все акторы в порядке ActorId
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, Entity)> + '_ {
        self.entities.iter().map(|(id, entity)| (*id, *entity))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
