//! Weapon component: fire-rate gating и урон

use bevy::prelude::*;
use std::time::Duration;

use crate::clock::Timestamp;
use crate::config::WeaponConfig;
use crate::world::BodyPart;

/// Оружие актора (player и NPC используют один компонент)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub base_damage: u32,
    pub headshot_multiplier: f32,
    pub cooldown: Duration,
    pub next_fire_allowed_at: Timestamp,
    pub bullet_speed: f32,
    pub range: f32,
}

impl Default for Weapon {
    fn default() -> Self {
        Self::from_config(&WeaponConfig::default())
    }
}

impl Weapon {
    pub fn from_config(config: &WeaponConfig) -> Self {
        Self {
            base_damage: config.damage,
            headshot_multiplier: config.headshot_multiplier,
            cooldown: config.cooldown(),
            next_fire_allowed_at: Timestamp::ZERO,
            bullet_speed: config.bullet_speed,
            range: config.range,
        }
    }

    pub fn ready(&self, now: Timestamp) -> bool {
        now >= self.next_fire_allowed_at
    }

    /// Выстрел состоялся — следующий не раньше `now + cooldown`
    pub fn consume(&mut self, now: Timestamp) {
        self.next_fire_allowed_at = now.after(self.cooldown);
    }

    /// Body: base damage. Head: base × multiplier.
    pub fn damage_for(&self, part: BodyPart) -> u32 {
        match part {
            BodyPart::Body => self.base_damage,
            BodyPart::Head => (self.base_damage as f32 * self.headshot_multiplier).round() as u32,
        }
    }

    pub fn travel_secs(&self, distance: f32) -> f32 {
        if self.bullet_speed > 0.0 {
            distance / self.bullet_speed
        } else {
            0.0
        }
    }
}
