//! World Query Adapter
//!
//! Стабильный контракт над внешним движком (scene raycast + navmesh pathfinding).
//! Чистая query-поверхность без side effects. Если mesh ещё не загружен —
//! все вызовы возвращают "нет результата", вызывающий код трактует это как
//! "актор не на земле / idle", никогда как фатальную ошибку.
//!
//! - `WorldQuery` — трейт коллаборатора
//! - `WorldQueries` — resource с текущим backend (`Arc<dyn WorldQuery>`)
//! - `raycast` — hit-volumes акторов + объединённые лучи (world + actors)
//! - `arena` — reference backend (AABB геометрия + nav grid + A*)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

pub mod arena;
pub mod raycast;


pub use arena::{ArenaWorld, Block, NavGridSettings, Platform};
pub use raycast::{
    cast_against_actors, cast_against_world, line_of_fire, refresh_hit_volumes, resolve_hitscan,
    BodyPart, HitTarget, HitVolume, HitVolumeIndex, IndexedActor, LineOfFire, TargetedHit,
};

/// Идентификатор navmesh зоны (у оригинальной карты одна зона)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u16);

/// Связная компонента navmesh внутри зоны
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// Handle ближайшего nav-узла (для clamp fallback)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavNode {
    pub index: usize,
    pub position: Vec3,
}

/// Результат луча по статической геометрии
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
}

/// Контракт внешнего коллаборатора (scene + navmesh)
///
/// Все методы read-only и безопасны для многократного вызова внутри тика.
pub trait WorldQuery: Send + Sync + 'static {
    /// Ближайшее пересечение луча со статическим миром
    fn raycast(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit>;

    /// Путь (без стартовой точки). Пустой Vec = "пути нет", не ошибка.
    fn find_path(&self, from: Vec3, to: Vec3, zone: ZoneId, group: GroupId) -> Vec<Vec3>;

    fn closest_node(&self, point: Vec3, zone: ZoneId, group: GroupId) -> Option<NavNode>;

    /// Сдвигает `from` в сторону `to`, не покидая navmesh
    fn clamp_to_navigable(
        &self,
        from: Vec3,
        to: Vec3,
        node: NavNode,
        zone: ZoneId,
        group: GroupId,
    ) -> Vec3;

    /// Группа navmesh под точкой (`getGroup` при спавне)
    fn group_of(&self, zone: ZoneId, point: Vec3) -> Option<GroupId>;
}

/// Backend до загрузки карты: на всё отвечает "нет результата"
#[derive(Debug, Default, Clone, Copy)]
pub struct UnloadedWorld;

impl WorldQuery for UnloadedWorld {
    fn raycast(&self, _origin: Vec3, _direction: Dir3, _max_distance: f32) -> Option<RayHit> {
        None
    }

    fn find_path(&self, _from: Vec3, _to: Vec3, _zone: ZoneId, _group: GroupId) -> Vec<Vec3> {
        Vec::new()
    }

    fn closest_node(&self, _point: Vec3, _zone: ZoneId, _group: GroupId) -> Option<NavNode> {
        None
    }

    fn clamp_to_navigable(
        &self,
        from: Vec3,
        _to: Vec3,
        _node: NavNode,
        _zone: ZoneId,
        _group: GroupId,
    ) -> Vec3 {
        from
    }

    fn group_of(&self, _zone: ZoneId, _point: Vec3) -> Option<GroupId> {
        None
    }
}

/// Resource: текущий world backend
#[derive(Resource, Clone)]
pub struct WorldQueries(Arc<dyn WorldQuery>);

impl WorldQueries {
    pub fn new(world: impl WorldQuery) -> Self {
        Self(Arc::new(world))
    }

    pub fn unloaded() -> Self {
        Self::new(UnloadedWorld)
    }

    pub fn backend(&self) -> &dyn WorldQuery {
        self.0.as_ref()
    }
}

impl Default for WorldQueries {
    fn default() -> Self {
        Self::unloaded()
    }
}

impl Deref for WorldQueries {
    type Target = dyn WorldQuery;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// Дальность лучей "вниз до земли"
pub const GROUND_PROBE_RANGE: f32 = 1_000.0;

/// Луч вниз из точки
pub fn cast_down(world: &dyn WorldQuery, origin: Vec3, max_distance: f32) -> Option<RayHit> {
    world.raycast(origin, Dir3::NEG_Y, max_distance)
}

/// Луч вверх из точки (поиск потолка)
pub fn cast_up(world: &dyn WorldQuery, origin: Vec3, max_distance: f32) -> Option<RayHit> {
    world.raycast(origin, Dir3::Y, max_distance)
}

/// Стоит ли точка на проходимой земле: луч вниз чуть сверху должен попасть
/// в поверхность практически на её высоте.
pub fn is_grounded_at(world: &dyn WorldQuery, point: Vec3, tolerance: f32) -> bool {
    const LIFT: f32 = 0.5;
    cast_down(world, point + Vec3::Y * LIFT, LIFT + tolerance)
        .map(|hit| (hit.point.y - point.y).abs() <= tolerance)
        .unwrap_or(false)
}
