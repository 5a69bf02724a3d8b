//! Игровая конфигурация (data-driven tuning)
//!
//! Загружается один раз до старта симуляции из JSON. Каждая секция
//! `#[serde(default)]` — можно переопределить только нужные поля.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::SimError;
use crate::world::ZoneId;

/// Resource: вся конфигурация сессии
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub zone: ZoneId,
    pub locomotion: LocomotionConfig,
    pub player: PlayerConfig,
    pub npc: NpcConfig,
    pub combat: CombatConfig,
    pub spawn_points: Vec<[f32; 3]>,
    pub patrol_waypoints: Vec<[f32; 3]>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            zone: ZoneId::default(),
            locomotion: LocomotionConfig::default(),
            player: PlayerConfig::default(),
            npc: NpcConfig::default(),
            combat: CombatConfig::default(),
            spawn_points: DEFAULT_SPAWN_POINTS.to_vec(),
            patrol_waypoints: Vec::new(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        serde_json::from_str(json).map_err(SimError::Config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn spawn_points(&self) -> Vec<Vec3> {
        self.spawn_points.iter().copied().map(Vec3::from_array).collect()
    }

    pub fn patrol_waypoints(&self) -> Vec<Vec3> {
        self.patrol_waypoints.iter().copied().map(Vec3::from_array).collect()
    }
}

/// Spawn points карты (из оригинального уровня)
pub const DEFAULT_SPAWN_POINTS: [[f32; 3]; 10] = [
    [-59.892_536, 4.801_883, -64.022_38],
    [-59.892_536, 4.801_883, -64.022_38],
    [48.233_3, 2.505_332, -45.912_468],
    [6.117_558, 0.130_868, -16.742_975],
    [2.521_204, 4.312_172, 37.674_43],
    [-43.506_37, 4.704_693, 10.533_827],
    [51.427_814, 0.135_536, 50.637_04],
    [18.372_744, 0.130_867, -15.212_462],
    [8.661_079, 13.636_081, -28.464_554],
    [-61.815_345, 9.659_493, -13.940_538],
];

/// Параметры ground-following + jump/fall интегратора
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Высота над кандидатной позицией, откуда кастуем луч вниз (м)
    pub probe_height: f32,
    /// Максимальный подъём/спуск ступеньки без перехода в falling (м)
    pub step_size: f32,
    /// Начальная вертикальная скорость прыжка (м/с)
    pub jump_speed: f32,
    /// Замедление вертикальной скорости в прыжке (м/с²)
    pub jump_deceleration: f32,
    /// Желаемая высота прыжка (м), ограничивается потолком
    pub jump_height: f32,
    /// Точка над ногами, от которой меряем расстояние до потолка (м)
    pub head_height: f32,
    /// Гравитация при падении (м/с²)
    pub gravity: f32,
    /// Допуск приземления (м)
    pub landing_epsilon: f32,
    /// Ниже этого Y актор считается провалившимся сквозь navmesh
    pub world_floor_y: f32,
    /// Высота, с которой ищем настоящую поверхность при провале
    pub rescue_height: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            probe_height: 2.0,
            step_size: 0.5,
            jump_speed: 4.6,
            jump_deceleration: 6.5,
            jump_height: 1.285,
            head_height: 1.8,
            gravity: 9.8,
            landing_epsilon: 0.1,
            world_floor_y: -1.0,
            rescue_height: 100.0,
        }
    }
}

/// Параметры оружия (общие для player и NPC)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub damage: u32,
    pub headshot_multiplier: f32,
    pub cooldown_ms: u64,
    pub bullet_speed: f32,
    pub range: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            damage: 35,
            headshot_multiplier: 2.0,
            cooldown_ms: 300,
            bullet_speed: 80.0,
            range: 250.0,
        }
    }
}

impl WeaponConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: u32,
    pub forward_speed: f32,
    pub side_speed: f32,
    pub run_multiplier: f32,
    pub airborne_multiplier: f32,
    pub mouse_sensitivity: f32,
    /// Ограничение pitch прицела (радианы, симметрично)
    pub max_pitch: f32,
    /// Лечение за убийство (cap = max_health)
    pub kill_heal: u32,
    pub weapon: WeaponConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            forward_speed: 8.0,
            side_speed: 5.0,
            run_multiplier: 1.6,
            airborne_multiplier: 0.8,
            mouse_sensitivity: 0.005,
            max_pitch: 1.2,
            kill_heal: 25,
            weapon: WeaponConfig {
                cooldown_ms: 150,
                ..WeaponConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    pub max_health: u32,
    pub speed: f32,
    /// Высота дула над ногами NPC (м)
    pub muzzle_height: f32,
    pub detection: DetectionConfig,
    pub weapon: WeaponConfig,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            speed: 4.0,
            muzzle_height: 1.5,
            detection: DetectionConfig::default(),
            weapon: WeaponConfig::default(),
        }
    }
}

/// Параметры периодического сканирования целей NPC
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub interval_ms: u64,
    /// Радиус Alert (стреляем, если есть line of fire)
    pub alert_range: f32,
    /// Радиус Hunt (шире alert, идём к цели по navmesh)
    pub hunt_range: f32,
    /// Половина угла обзора для alert-кандидатов (градусы, 180 = без ограничения)
    pub fov_half_angle_deg: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval_ms: 400,
            alert_range: 25.0,
            hunt_range: 50.0,
            fov_half_angle_deg: 180.0,
        }
    }
}

impl DetectionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub respawn_ms: u64,
    /// Скорость затухания impact marker (opacity / сек)
    pub impact_fade_speed: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            respawn_ms: 15_000,
            impact_fade_speed: 0.25,
        }
    }
}

impl CombatConfig {
    pub fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_arena_tuning() {
        let config = GameConfig::default();

        assert_eq!(config.locomotion.jump_height, 1.285);
        assert_eq!(config.locomotion.step_size, 0.5);
        assert_eq!(config.npc.weapon.damage, 35);
        assert_eq!(config.npc.weapon.cooldown(), Duration::from_millis(300));
        assert_eq!(config.npc.detection.interval(), Duration::from_millis(400));
        assert_eq!(config.combat.respawn_delay(), Duration::from_secs(15));
        assert_eq!(config.spawn_points().len(), 10);
    }

    #[test]
    fn test_partial_json_overrides_only_given_fields() {
        let json = r#"{
            "npc": { "max_health": 150, "detection": { "alert_range": 12.0 } },
            "spawn_points": [[1.0, 0.0, 2.0]]
        }"#;

        let config = GameConfig::from_json_str(json).unwrap();

        assert_eq!(config.npc.max_health, 150);
        assert_eq!(config.npc.detection.alert_range, 12.0);
        // Не указано → default
        assert_eq!(config.npc.detection.hunt_range, 50.0);
        assert_eq!(config.npc.weapon.damage, 35);
        assert_eq!(config.spawn_points(), vec![Vec3::new(1.0, 0.0, 2.0)]);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let result = GameConfig::from_json_str("{ \"npc\": 5 }");
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = GameConfig::load("/nonexistent/fireteam.json");
        assert!(matches!(result, Err(SimError::ConfigIo { .. })));
    }
}
