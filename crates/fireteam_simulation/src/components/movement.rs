//! Movement компоненты: скорость, принадлежность к navmesh

use bevy::prelude::*;

use crate::world::{GroupId, ZoneId};

/// Скорость движения актора по пути (метры/сек)
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 4.0 }
    }
}

/// Привязка актора к navmesh (zone + связная группа)
///
/// Группа определяется лениво по текущей позиции при первом запросе пути
/// и сбрасывается при respawn (новый spawn point может лежать в другой группе).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct NavAgent {
    pub zone: ZoneId,
    pub group: Option<GroupId>,
}

impl NavAgent {
    pub fn new(zone: ZoneId) -> Self {
        Self { zone, group: None }
    }
}
