//! Locomotion controller: чистые функции
//!
//! Никогда не "падает": отсутствие земли под ногами деградирует в
//! "продолжаем падать" или "шаг отклонён", не в ошибку.

use bevy::prelude::*;

use super::Airborne;
use crate::config::LocomotionConfig;
use crate::world::{cast_down, cast_up, WorldQuery, GROUND_PROBE_RANGE};

/// Результат planar шага
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanarStep {
    Moved,
    /// Под кандидатной позицией нет земли, или ступенька выше допуска
    Blocked,
}

/// Planar перемещение с ground following
///
/// Луч вниз из точки `probe_height` над кандидатной позицией:
/// - нет попадания → шаг отклонён (край navmesh)
/// - подъём больше `step_size` → шаг отклонён (стена)
/// - grounded, спуск больше `step_size` → переход в Falling (без магнитного snap с обрыва)
/// - grounded иначе → snap Y к земле
/// - в воздухе меняются только X/Z, Y ведёт вертикальный интегратор
pub fn step_planar(
    world: &dyn WorldQuery,
    config: &LocomotionConfig,
    position: &mut Vec3,
    airborne: &mut Airborne,
    displacement: Vec3,
) -> PlanarStep {
    let planar = Vec3::new(displacement.x, 0.0, displacement.z);
    if planar == Vec3::ZERO {
        return PlanarStep::Moved;
    }

    let candidate = *position + planar;
    let probe = candidate + Vec3::Y * config.probe_height;
    let Some(ground) = cast_down(world, probe, GROUND_PROBE_RANGE) else {
        return PlanarStep::Blocked;
    };

    let rise = ground.point.y - position.y;
    if rise > config.step_size {
        return PlanarStep::Blocked;
    }

    position.x = candidate.x;
    position.z = candidate.z;

    if airborne.is_grounded() {
        if -rise > config.step_size {
            *airborne = Airborne::Falling { velocity: 0.0 };
        } else {
            position.y = ground.point.y;
        }
    }

    PlanarStep::Moved
}

/// Старт прыжка (только с земли)
///
/// Apex = min(jump_height, просвет до потолка над головой).
/// Возвращает false, если актор уже в воздухе.
pub fn begin_jump(
    world: &dyn WorldQuery,
    config: &LocomotionConfig,
    position: Vec3,
    airborne: &mut Airborne,
) -> bool {
    if !airborne.is_grounded() {
        return false;
    }

    let head = position + Vec3::Y * config.head_height;
    let clearance = cast_up(world, head, config.jump_height)
        .map(|ceiling| ceiling.distance)
        .unwrap_or(config.jump_height);

    *airborne = Airborne::Jumping {
        velocity: config.jump_speed,
        apex: position.y + clearance.min(config.jump_height),
    };
    true
}

/// Вертикальный интегратор (jump → fall → land)
///
/// Возвращает true, если актор приземлился в этом тике.
pub fn integrate_vertical(
    world: &dyn WorldQuery,
    config: &LocomotionConfig,
    position: &mut Vec3,
    airborne: &mut Airborne,
    dt: f32,
) -> bool {
    match *airborne {
        Airborne::Grounded => false,

        Airborne::Jumping { velocity, apex } => {
            let velocity = velocity - config.jump_deceleration * dt;
            position.y += velocity * dt;

            if position.y >= apex {
                position.y = apex;
                *airborne = Airborne::Falling { velocity: 0.0 };
            } else if velocity <= 0.0 {
                *airborne = Airborne::Falling { velocity: 0.0 };
            } else {
                *airborne = Airborne::Jumping { velocity, apex };
            }
            false
        }

        Airborne::Falling { velocity } => {
            let velocity = velocity + config.gravity * dt;
            let previous_y = position.y;
            let new_y = previous_y - velocity * dt;

            // Луч от предыдущей высоты: быстрое падение не проскакивает пол за тик
            let origin = Vec3::new(position.x, previous_y + config.landing_epsilon, position.z);
            let ground = cast_down(world, origin, GROUND_PROBE_RANGE);

            match ground {
                Some(hit) if new_y <= hit.point.y + config.landing_epsilon => {
                    position.y = hit.point.y;
                    *airborne = Airborne::Grounded;
                    true
                }
                _ => {
                    position.y = new_y;
                    *airborne = Airborne::Falling { velocity };
                    false
                }
            }
        }
    }
}

/// Результат проверки провала сквозь navmesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallRepair {
    /// Y выше пола мира, ничего не делали
    Intact,
    /// Нашли настоящую поверхность лучом сверху
    Resurfaced,
    /// Поверхности нет — нужен телепорт на spawn point
    NeedsRespawn,
}

/// Защита от провала сквозь navmesh
///
/// Y ниже `world_floor_y` → луч вниз с `rescue_height`; есть поверхность —
/// ставим на неё, нет — вызывающий код телепортирует на spawn point.
pub fn repair_fall_through(
    world: &dyn WorldQuery,
    config: &LocomotionConfig,
    position: &mut Vec3,
    airborne: &mut Airborne,
) -> FallRepair {
    if position.y >= config.world_floor_y {
        return FallRepair::Intact;
    }

    *airborne = Airborne::Grounded;

    let rescue = Vec3::new(position.x, config.rescue_height, position.z);
    match cast_down(world, rescue, GROUND_PROBE_RANGE) {
        Some(hit) => {
            position.y = hit.point.y;
            FallRepair::Resurfaced
        }
        None => FallRepair::NeedsRespawn,
    }
}
