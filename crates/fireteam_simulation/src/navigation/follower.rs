//! Path follower: чистые функции

use bevy::prelude::*;

use super::{facing_toward, PathFollower, LEG_EPSILON_SQ, TURN_FACTOR};
use crate::components::NavAgent;
use crate::config::LocomotionConfig;
use crate::locomotion::{step_planar, Airborne, PlanarStep};
use crate::world::WorldQuery;

/// Результат одного тика движения по пути
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegOutcome {
    /// Пути нет
    NoPath,
    Advancing,
    /// Голова пути снята; `exhausted` — путь закончился
    LegComplete { reached: Vec3, exhausted: bool },
    /// Шаг отклонён ground following (край navmesh / стена)
    Blocked,
}

/// Один тик движения к голове пути
///
/// Нога завершена, если planar distance² < `LEG_EPSILON_SQ`, либо если после
/// шага distance² до waypoint выросла (overshoot). Второй критерий считает
/// полную 3D дистанцию, поэтому ground snap может закрыть ногу на тик раньше;
/// это известное приближение, на нём держится текущий tuning.
///
/// За тик снимается не больше одного waypoint.
#[allow(clippy::too_many_arguments)]
pub fn advance_along_path(
    world: &dyn WorldQuery,
    config: &LocomotionConfig,
    follower: &mut PathFollower,
    position: &mut Vec3,
    rotation: &mut Quat,
    airborne: &mut Airborne,
    speed: f32,
    dt: f32,
) -> LegOutcome {
    let Some(target) = follower.head() else {
        return LegOutcome::NoPath;
    };

    // Y игнорируем: высота waypoint'ов шумит относительно ground snap
    let planar = Vec3::new(target.x - position.x, 0.0, target.z - position.z);
    let mut complete = planar.length_squared() < LEG_EPSILON_SQ;

    if !complete {
        let previous = position.distance_squared(target);

        if let Some(facing) = follower.facing_target {
            *rotation = rotation.slerp(facing, TURN_FACTOR);
        }

        let displacement = planar.normalize() * speed * dt;
        if step_planar(world, config, position, airborne, displacement) == PlanarStep::Blocked {
            return LegOutcome::Blocked;
        }

        complete = position.distance_squared(target) > previous;
    }

    if !complete {
        return LegOutcome::Advancing;
    }

    follower.pop_head();
    match follower.head() {
        Some(next) => {
            if let Some(facing) = facing_toward(*position, next) {
                follower.facing_target = Some(facing);
            }
            LegOutcome::LegComplete {
                reached: target,
                exhausted: false,
            }
        }
        None => LegOutcome::LegComplete {
            reached: target,
            exhausted: true,
        },
    }
}

/// Результат запроса пути
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathRequest {
    /// Путь получен, ориентация на первую ногу выставлена
    Found,
    /// Пути нет: follower очищен, позиция прижата к navmesh
    NoPath,
}

/// Запрос нового пути к `destination`
///
/// Пустой путь — не ошибка: позиция прижимается к ближайшей проходимой точке
/// через `clamp_to_navigable`, чтобы актор не стоял вне navmesh.
pub fn request_path(
    world: &dyn WorldQuery,
    agent: &mut NavAgent,
    follower: &mut PathFollower,
    position: &mut Vec3,
    destination: Vec3,
) -> PathRequest {
    let group = match agent.group {
        Some(group) => Some(group),
        None => {
            agent.group = world.group_of(agent.zone, *position);
            agent.group
        }
    };

    let Some(group) = group else {
        follower.clear();
        return PathRequest::NoPath;
    };

    let path = world.find_path(*position, destination, agent.zone, group);
    if let Some(first) = path.first().copied() {
        follower.replace(path);
        follower.facing_target = facing_toward(*position, first);
        return PathRequest::Found;
    }

    follower.clear();
    if let Some(node) = world.closest_node(*position, agent.zone, group) {
        *position = world.clamp_to_navigable(*position, *position, node, agent.zone, group);
    }
    PathRequest::NoPath
}
