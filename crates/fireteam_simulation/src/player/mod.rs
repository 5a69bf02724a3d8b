//! Player: input snapshot → locomotion, look, fire intent
//!
//! Input collaborator кладёт `PlayerInput` раз в тик; ядро его только читает.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod systems;

pub use systems::{drive_players, update_head_bob};

/// Marker: актор управляется input collaborator'ом
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(PlayerInput, PlayerLook, HeadBob)]
pub struct Player;

/// Snapshot input на текущий тик
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// x = strafe (вправо +), y = вперёд (+) / назад (-)
    pub move_axis: Vec2,
    pub run: bool,
    pub jump: bool,
    pub fire_held: bool,
    /// Mouse delta за тик (пиксели)
    pub look_delta: Vec2,
}

impl PlayerInput {
    pub fn is_moving(&self) -> bool {
        self.move_axis != Vec2::ZERO
    }
}

/// Pitch прицела (yaw живёт в Transform тела)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerLook {
    pub pitch: f32,
}

impl PlayerLook {
    /// Применяет mouse delta: x → yaw тела, y → pitch (clamp ±max_pitch)
    pub fn apply(&mut self, transform: &mut Transform, delta: Vec2, sensitivity: f32, max_pitch: f32) {
        if delta.x != 0.0 {
            transform.rotate_y(-delta.x * sensitivity);
        }
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-max_pitch, max_pitch);
    }
}

/// Покачивание камеры при ходьбе; `offset` — высота глаз (origin выстрела)
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadBob {
    pub offset: f32,
    /// м/с
    pub speed: f32,
    pub min: f32,
    pub max: f32,
    pub rising: bool,
}

impl Default for HeadBob {
    fn default() -> Self {
        Self {
            offset: 1.6,
            speed: 0.07,
            min: 1.57,
            max: 1.65,
            rising: true,
        }
    }
}

impl HeadBob {
    pub fn advance(&mut self, dt: f32) {
        let step = self.speed * dt;
        if self.rising {
            self.offset += step;
            if self.offset >= self.max {
                self.offset = self.max;
                self.rising = false;
            }
        } else {
            self.offset -= step;
            if self.offset <= self.min {
                self.offset = self.min;
                self.rising = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_bob_stays_in_band() {
        let mut bob = HeadBob::default();

        for _ in 0..1_000 {
            bob.advance(0.1);
            assert!(bob.offset >= bob.min && bob.offset <= bob.max, "offset = {}", bob.offset);
        }
    }

    #[test]
    fn test_head_bob_turns_around_at_max() {
        let mut bob = HeadBob::default();
        bob.advance(1.0);

        assert_eq!(bob.offset, bob.max);
        assert!(!bob.rising);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut look = PlayerLook::default();
        let mut transform = Transform::default();

        look.apply(&mut transform, Vec2::new(0.0, -10_000.0), 0.005, 1.2);
        assert_eq!(look.pitch, 1.2);

        look.apply(&mut transform, Vec2::new(0.0, 10_000.0), 0.005, 1.2);
        assert_eq!(look.pitch, -1.2);
    }

    #[test]
    fn test_mouse_right_turns_right() {
        let mut look = PlayerLook::default();
        let mut transform = Transform::default();

        look.apply(&mut transform, Vec2::new(100.0, 0.0), 0.005, 1.2);

        // Forward = -Z, поворот вправо уводит forward в +X
        assert!(transform.forward().x > 0.0);
    }
}
