//! Locomotion: ground-following + jump/fall интегратор
//!
//! Архитектура:
//! - controller: чистые функции над (position, Airborne), всё через `WorldQuery`
//! - systems: ECS системы вертикального движения и защиты от провала
//!
//! Используется и игроком (planar input), и NPC (path follower).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod controller;
pub mod systems;

#[cfg(test)]
mod controller_tests;

pub use controller::{begin_jump, integrate_vertical, repair_fall_through, step_planar, FallRepair, PlanarStep};
pub use systems::{apply_vertical_motion, guard_world_floor};

/// Вертикальное состояние актора
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Airborne {
    /// Y определяется ground snap
    #[default]
    Grounded,
    /// Скорость вверх убывает с постоянным замедлением до `apex`
    Jumping { velocity: f32, apex: f32 },
    /// Скорость вниз растёт под гравитацией
    Falling { velocity: f32 },
}

impl Airborne {
    pub fn is_grounded(&self) -> bool {
        matches!(self, Airborne::Grounded)
    }
}

/// Locomotion состояние актора
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Locomotion {
    pub airborne: Airborne,
    /// Было ли planar движение в этом тике (head bob, выбор death анимации)
    pub moving: bool,
}

impl Locomotion {
    pub fn is_airborne(&self) -> bool {
        !self.airborne.is_grounded()
    }

    /// Сброс при телепорте (respawn, fall-through repair)
    pub fn reset(&mut self) {
        self.airborne = Airborne::Grounded;
        self.moving = false;
    }
}
