//! NPC brain components

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::components::ActorId;
use crate::config::DetectionConfig;

/// Поведение NPC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// Случайные waypoints маршрута (состояние покоя по умолчанию)
    #[default]
    Patrol,
    /// Идём к ближайшему живому актору на карте (альтернативное состояние покоя)
    Seek,
    /// Цель в hunt range или закрыта — идём к ней по navmesh
    Hunt,
    /// Цель в alert range с чистой линией огня — стоим и стреляем
    Alert,
}

impl Behavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Patrol => "patrol",
            Behavior::Seek => "seek",
            Behavior::Hunt => "hunt",
            Behavior::Alert => "alert",
        }
    }
}

/// Состояние принятия решений NPC
///
/// `target` — weak reference по stable ActorId: мёртвая цель не удаляется,
/// а просто выпадает из следующего scan.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NpcBrain {
    pub behavior: Behavior,
    /// Куда возвращаемся, когда кандидатов нет (Patrol или Seek)
    pub general: Behavior,
    pub target: Option<ActorId>,
    pub next_detection_at: Timestamp,
    pub waypoints: Vec<Vec3>,
    pub detection: DetectionConfig,
}

impl NpcBrain {
    pub fn new(general: Behavior, waypoints: Vec<Vec3>, detection: DetectionConfig) -> Self {
        Self {
            behavior: general,
            general,
            target: None,
            next_detection_at: Timestamp::ZERO,
            waypoints,
            detection,
        }
    }

    pub fn patrol(waypoints: Vec<Vec3>, detection: DetectionConfig) -> Self {
        Self::new(Behavior::Patrol, waypoints, detection)
    }

    /// Стреляем только в Alert с целью
    pub fn wants_to_fire(&self) -> Option<ActorId> {
        match self.behavior {
            Behavior::Alert => self.target,
            _ => None,
        }
    }

    /// Возврат в general без цели (respawn)
    pub fn reset(&mut self, now: Timestamp) {
        self.behavior = self.general;
        self.target = None;
        self.next_detection_at = now;
    }
}

impl Default for NpcBrain {
    fn default() -> Self {
        Self::patrol(Vec::new(), DetectionConfig::default())
    }
}
