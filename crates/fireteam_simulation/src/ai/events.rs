//! AI Events — смена поведения NPC (для presentation и логов)

use bevy::prelude::*;

use super::Behavior;
use crate::components::ActorId;

/// NPC сменил поведение
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BehaviorChanged {
    pub npc: Entity,
    pub from: Behavior,
    pub to: Behavior,
    /// Цель после перехода (None при возврате в general)
    pub target: Option<ActorId>,
}
