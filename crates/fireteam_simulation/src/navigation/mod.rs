//! Path follower: движение актора по waypoints от navmesh
//!
//! Архитектура:
//! - `PathFollower` — оставшиеся waypoints + желаемая ориентация
//! - follower: чистые функции (шаг по ноге, запрос пути)
//! - systems: `follow_paths` для NPC

use bevy::prelude::*;
use std::collections::VecDeque;

pub mod follower;
pub mod systems;


pub use follower::{advance_along_path, request_path, LegOutcome, PathRequest};
pub use systems::follow_paths;

/// Порог planar distance² для завершения ноги
pub const LEG_EPSILON_SQ: f32 = 0.01;

/// Доля slerp к желаемой ориентации за тик
pub const TURN_FACTOR: f32 = 0.1;

/// Текущий путь актора
///
/// Заменяется целиком каждым новым запросом пути; поэлементно
/// меняется только удалением головы при завершении ноги.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PathFollower {
    path: VecDeque<Vec3>,
    /// Ориентация, к которой плавно поворачиваемся на текущей ноге
    pub facing_target: Option<Quat>,
}

impl PathFollower {
    pub fn head(&self) -> Option<Vec3> {
        self.path.front().copied()
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Vec3> {
        self.path.iter()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn replace(&mut self, path: impl IntoIterator<Item = Vec3>) {
        self.path = path.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.facing_target = None;
    }

    fn pop_head(&mut self) -> Option<Vec3> {
        self.path.pop_front()
    }
}

/// Yaw-ориентация "смотреть из `from` на `to`" (Y игнорируется)
///
/// `None`, если точки совпадают в плоскости XZ.
pub fn facing_toward(from: Vec3, to: Vec3) -> Option<Quat> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx * dx + dz * dz < f32::EPSILON {
        return None;
    }
    // Forward = -Z
    Some(Quat::from_rotation_y(f32::atan2(-dx, -dz)))
}
