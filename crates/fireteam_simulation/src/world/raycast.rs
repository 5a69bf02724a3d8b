//! Hit-volumes акторов и объединённые лучи (world + actors)
//!
//! Архитектура:
//! - `HitVolume` — невидимая геометрия попаданий (голова = сфера, тело = AABB),
//!   отдельно от визуальной модели
//! - `HitVolumeIndex` — snapshot hit-volumes всех акторов на начало тика.
//!   Все лучи в течение тика видят позиции предыдущего тика (staleness = 1 frame),
//!   ни один актор не видит другого в наполовину обновлённом состоянии
//! - Пересечения через `bevy::math::bounding::RayCast3d`

use bevy::math::bounding::{Aabb3d, BoundingSphere, RayCast3d};
use bevy::prelude::*;

use super::WorldQuery;
use crate::components::{Actor, ActorId, ActorKind, LifeState};

/// Часть hit-volume, в которую попал луч
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Head,
    Body,
}

/// Невидимая геометрия попаданий актора
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HitVolume {
    pub head_offset: Vec3,
    pub head_radius: f32,
    pub body_offset: Vec3,
    pub body_half_extents: Vec3,
    /// Мировая привязка. Пока актор мёртв — за пределами игровой зоны.
    pub anchor: Vec3,
}

impl Default for HitVolume {
    fn default() -> Self {
        Self {
            head_offset: Vec3::new(0.0, 1.6, 0.0),
            head_radius: 0.15,
            body_offset: Vec3::new(0.0, 0.725, 0.0),
            body_half_extents: Vec3::new(0.3, 0.725, 0.3),
            anchor: Vec3::ZERO,
        }
    }
}

impl HitVolume {
    /// Куда уезжает hit-volume мёртвого актора (перестаёт быть целью лучей)
    pub const PARKED_ANCHOR: Vec3 = Vec3::new(0.0, -10_000.0, 0.0);

    pub fn at(position: Vec3) -> Self {
        Self {
            anchor: position,
            ..default()
        }
    }

    pub fn park(&mut self) {
        self.anchor = Self::PARKED_ANCHOR;
    }

    pub fn restore(&mut self, position: Vec3) {
        self.anchor = position;
    }

    pub fn is_parked(&self) -> bool {
        self.anchor == Self::PARKED_ANCHOR
    }

    pub fn head_center(&self) -> Vec3 {
        self.anchor + self.head_offset
    }

    pub fn body_center(&self) -> Vec3 {
        self.anchor + self.body_offset
    }
}

/// Запись индекса: hit-volume актора на начало тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedActor {
    pub entity: Entity,
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Vec3,
    pub alive: bool,
    pub volume: HitVolume,
}

impl IndexedActor {
    /// Точка прицеливания (центр тела)
    pub fn aim_point(&self) -> Vec3 {
        self.volume.body_center()
    }
}

/// Resource: snapshot hit-volumes (обновляется первым в тике)
#[derive(Resource, Debug, Clone, Default)]
pub struct HitVolumeIndex {
    actors: Vec<IndexedActor>,
}

impl HitVolumeIndex {
    pub fn from_actors(mut actors: Vec<IndexedActor>) -> Self {
        // Порядок по stable ID — детерминизм кандидатов и tie-break
        actors.sort_by_key(|actor| actor.id);
        Self { actors }
    }

    pub fn get(&self, entity: Entity) -> Option<&IndexedActor> {
        self.actors.iter().find(|actor| actor.entity == entity)
    }

    pub fn get_by_id(&self, id: ActorId) -> Option<&IndexedActor> {
        self.actors
            .binary_search_by_key(&id, |actor| actor.id)
            .ok()
            .map(|position| &self.actors[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedActor> {
        self.actors.iter()
    }

    pub fn live(&self) -> impl Iterator<Item = &IndexedActor> {
        self.actors.iter().filter(|actor| actor.alive)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.get(entity).map(|actor| actor.alive).unwrap_or(false)
    }

    /// Актор умер внутри тика — исключаем из дальнейших лучей этого тика
    pub fn mark_dead(&mut self, entity: Entity) {
        if let Some(actor) = self.actors.iter_mut().find(|actor| actor.entity == entity) {
            actor.alive = false;
            actor.volume.park();
        }
    }
}

/// Во что попал луч
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    World,
    Actor { entity: Entity, part: BodyPart },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetedHit {
    pub distance: f32,
    pub point: Vec3,
    pub target: HitTarget,
}

impl TargetedHit {
    pub fn actor(&self) -> Option<Entity> {
        match self.target {
            HitTarget::Actor { entity, .. } => Some(entity),
            HitTarget::World => None,
        }
    }

    pub fn is_headshot(&self) -> bool {
        matches!(self.target, HitTarget::Actor { part: BodyPart::Head, .. })
    }
}

/// Луч по hit-volumes живых акторов (ближайший выигрывает)
pub fn cast_against_actors(
    index: &HitVolumeIndex,
    origin: Vec3,
    direction: Dir3,
    max_distance: f32,
    exclude: Option<Entity>,
) -> Option<TargetedHit> {
    let ray = RayCast3d::new(origin, direction, max_distance);
    let mut nearest: Option<TargetedHit> = None;

    for actor in index.live() {
        if Some(actor.entity) == exclude {
            continue;
        }

        let volume = &actor.volume;
        let head = ray.sphere_intersection_at(&BoundingSphere::new(
            volume.head_center(),
            volume.head_radius,
        ));
        let body = ray.aabb_intersection_at(&Aabb3d::new(
            volume.body_center(),
            volume.body_half_extents,
        ));

        let hit = match (head, body) {
            (Some(h), Some(b)) if h <= b => Some((h, BodyPart::Head)),
            (Some(h), None) => Some((h, BodyPart::Head)),
            (_, Some(b)) => Some((b, BodyPart::Body)),
            (None, None) => None,
        };

        let Some((distance, part)) = hit else {
            continue;
        };

        if nearest.map(|n| distance < n.distance).unwrap_or(true) {
            nearest = Some(TargetedHit {
                distance,
                point: origin + *direction * distance,
                target: HitTarget::Actor {
                    entity: actor.entity,
                    part,
                },
            });
        }
    }

    nearest
}

/// Луч по статической геометрии
pub fn cast_against_world(
    world: &dyn WorldQuery,
    origin: Vec3,
    direction: Dir3,
    max_distance: f32,
) -> Option<TargetedHit> {
    world
        .raycast(origin, direction, max_distance)
        .map(|hit| TargetedHit {
            distance: hit.distance,
            point: hit.point,
            target: HitTarget::World,
        })
}

/// Hit-scan выстрела: сначала hit-volumes акторов, потом мир.
///
/// `None` = нет валидной линии огня (выстрел не происходит).
pub fn resolve_hitscan(
    world: &dyn WorldQuery,
    index: &HitVolumeIndex,
    origin: Vec3,
    direction: Dir3,
    max_distance: f32,
    shooter: Entity,
) -> Option<TargetedHit> {
    cast_against_actors(index, origin, direction, max_distance, Some(shooter))
        .or_else(|| cast_against_world(world, origin, direction, max_distance))
}

/// Результат проверки линии огня до цели
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOfFire {
    Clear { distance: f32 },
    /// Что-то кроме hit-volume цели ближе цели
    Occluded { distance: f32 },
    /// Цель отсутствует или мертва
    NoTarget,
}

impl LineOfFire {
    pub fn is_clear(&self) -> bool {
        matches!(self, LineOfFire::Clear { .. })
    }
}

/// Проверка линии огня от `origin` до центра тела `target`
pub fn line_of_fire(
    world: &dyn WorldQuery,
    index: &HitVolumeIndex,
    origin: Vec3,
    shooter: Entity,
    target: Entity,
) -> LineOfFire {
    let Some(target_entry) = index.get(target).filter(|entry| entry.alive) else {
        return LineOfFire::NoTarget;
    };

    let offset = target_entry.aim_point() - origin;
    let distance = offset.length();
    let Ok(direction) = Dir3::new(offset) else {
        return LineOfFire::Clear { distance: 0.0 };
    };

    // Ближайший актор на луче: если это не цель — она закрыта
    let target_distance = match cast_against_actors(index, origin, direction, distance, Some(shooter)) {
        Some(hit) if hit.actor() == Some(target) => hit.distance,
        Some(hit) => return LineOfFire::Occluded { distance: hit.distance },
        None => distance,
    };

    if let Some(wall) = world.raycast(origin, direction, target_distance) {
        if wall.distance < target_distance {
            return LineOfFire::Occluded {
                distance: wall.distance,
            };
        }
    }

    LineOfFire::Clear {
        distance: target_distance,
    }
}

/// Система: snapshot hit-volumes на начало тика
///
/// Живые акторы — hit-volume следует за Transform, мёртвые остаются parked.
pub fn refresh_hit_volumes(
    mut actors: Query<(Entity, &Actor, &Transform, &mut HitVolume, &LifeState)>,
    mut index: ResMut<HitVolumeIndex>,
) {
    let mut entries = Vec::new();

    for (entity, actor, transform, mut volume, life) in actors.iter_mut() {
        let alive = life.is_alive();
        if alive {
            volume.restore(transform.translation);
        } else if !volume.is_parked() {
            volume.park();
        }

        entries.push(IndexedActor {
            entity,
            id: actor.id,
            kind: actor.kind,
            position: transform.translation,
            alive,
            volume: *volume,
        });
    }

    *index = HitVolumeIndex::from_actors(entries);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ArenaWorld, Block, ZoneId};

    fn entry(raw: u32, position: Vec3) -> IndexedActor {
        IndexedActor {
            entity: Entity::from_raw(raw),
            id: ActorId(raw),
            kind: ActorKind::Npc,
            position,
            alive: true,
            volume: HitVolume::at(position),
        }
    }

    #[test]
    fn test_body_shot_vs_headshot() {
        let index = HitVolumeIndex::from_actors(vec![entry(1, Vec3::new(0.0, 0.0, -10.0))]);

        let body = cast_against_actors(&index, Vec3::new(0.0, 0.8, 0.0), Dir3::NEG_Z, 100.0, None)
            .unwrap();
        assert!(!body.is_headshot());
        assert_eq!(body.actor(), Some(Entity::from_raw(1)));

        let head = cast_against_actors(&index, Vec3::new(0.0, 1.6, 0.0), Dir3::NEG_Z, 100.0, None)
            .unwrap();
        assert!(head.is_headshot());
        assert!((head.distance - 9.85).abs() < 1e-3, "distance = {}", head.distance);
    }

    #[test]
    fn test_nearest_actor_wins_and_shooter_excluded() {
        let shooter = entry(1, Vec3::ZERO);
        let near = entry(2, Vec3::new(0.0, 0.0, -5.0));
        let far = entry(3, Vec3::new(0.0, 0.0, -12.0));
        let index = HitVolumeIndex::from_actors(vec![far, shooter, near]);

        let hit = cast_against_actors(
            &index,
            Vec3::new(0.0, 1.0, 0.0),
            Dir3::NEG_Z,
            100.0,
            Some(Entity::from_raw(1)),
        )
        .unwrap();

        assert_eq!(hit.actor(), Some(Entity::from_raw(2)));
    }

    #[test]
    fn test_dead_actor_is_not_a_target() {
        let mut index = HitVolumeIndex::from_actors(vec![entry(2, Vec3::new(0.0, 0.0, -5.0))]);
        index.mark_dead(Entity::from_raw(2));

        let hit = cast_against_actors(&index, Vec3::new(0.0, 1.0, 0.0), Dir3::NEG_Z, 100.0, None);
        assert!(hit.is_none());
        assert!(!index.is_alive(Entity::from_raw(2)));
    }

    #[test]
    fn test_line_of_fire_blocked_by_wall() {
        let world = ArenaWorld::flat(ZoneId(0), 50.0).with_block(Block::new(
            Vec3::new(-2.0, 0.0, -6.0),
            Vec3::new(2.0, 3.0, -5.0),
        ));
        let index = HitVolumeIndex::from_actors(vec![
            entry(1, Vec3::ZERO),
            entry(2, Vec3::new(0.0, 0.0, -10.0)),
        ]);

        let result = line_of_fire(
            &world,
            &index,
            Vec3::new(0.0, 1.5, 0.0),
            Entity::from_raw(1),
            Entity::from_raw(2),
        );

        assert!(matches!(result, LineOfFire::Occluded { .. }), "{:?}", result);
    }

    #[test]
    fn test_line_of_fire_clear_in_open_field() {
        let world = ArenaWorld::flat(ZoneId(0), 50.0);
        let index = HitVolumeIndex::from_actors(vec![
            entry(1, Vec3::ZERO),
            entry(2, Vec3::new(0.0, 0.0, -10.0)),
        ]);

        let result = line_of_fire(
            &world,
            &index,
            Vec3::new(0.0, 1.5, 0.0),
            Entity::from_raw(1),
            Entity::from_raw(2),
        );

        assert!(result.is_clear(), "{:?}", result);
    }

    #[test]
    fn test_hitscan_falls_back_to_world() {
        let world = ArenaWorld::flat(ZoneId(0), 50.0);
        let index = HitVolumeIndex::default();

        let hit = resolve_hitscan(
            &world,
            &index,
            Vec3::new(0.0, 1.5, 0.0),
            Dir3::NEG_Y,
            100.0,
            Entity::from_raw(1),
        )
        .unwrap();

        assert_eq!(hit.target, HitTarget::World);
        assert!((hit.point.y - 0.0).abs() < 1e-4);
    }
}
