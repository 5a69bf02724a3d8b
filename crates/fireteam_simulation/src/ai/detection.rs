//! Detection: scan кандидатов, target stickiness, выбор destination
//!
//! Все функции читают только `HitVolumeIndex` (позиции на начало тика).

use bevy::prelude::*;
use rand::Rng;

use super::{Behavior, NpcBrain};
use crate::components::ActorId;
use crate::config::DetectionConfig;
use crate::world::{HitVolumeIndex, IndexedActor};

/// Какой радиус дал кандидатов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateRange {
    Alert,
    Hunt,
}

/// Результат scan: непустое множество живых акторов (в порядке ActorId)
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates {
    pub range: CandidateRange,
    pub actors: Vec<IndexedActor>,
}

impl Candidates {
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.iter().any(|actor| actor.id == id)
    }
}

fn within_fov(position: Vec3, forward: Vec3, other: Vec3, half_angle_deg: f32) -> bool {
    if half_angle_deg >= 180.0 {
        return true;
    }
    let to_other = Vec3::new(other.x - position.x, 0.0, other.z - position.z).normalize_or_zero();
    let facing = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    if to_other == Vec3::ZERO || facing == Vec3::ZERO {
        return true;
    }
    to_other.dot(facing) >= half_angle_deg.to_radians().cos()
}

/// Scan живых акторов кроме себя
///
/// Сначала alert range (с учётом FOV); если там пусто — hunt range;
/// если и там пусто — `None` (цели нет).
pub fn scan_candidates(
    index: &HitVolumeIndex,
    observer: Entity,
    position: Vec3,
    forward: Vec3,
    detection: &DetectionConfig,
) -> Option<Candidates> {
    let others = || {
        index
            .live()
            .filter(move |actor| actor.entity != observer)
    };

    let alert: Vec<IndexedActor> = others()
        .filter(|actor| actor.position.distance(position) <= detection.alert_range)
        .filter(|actor| within_fov(position, forward, actor.position, detection.fov_half_angle_deg))
        .copied()
        .collect();
    if !alert.is_empty() {
        return Some(Candidates {
            range: CandidateRange::Alert,
            actors: alert,
        });
    }

    let hunt: Vec<IndexedActor> = others()
        .filter(|actor| actor.position.distance(position) <= detection.hunt_range)
        .copied()
        .collect();
    if !hunt.is_empty() {
        return Some(Candidates {
            range: CandidateRange::Hunt,
            actors: hunt,
        });
    }

    None
}

/// Target stickiness: текущая цель остаётся, если она среди кандидатов,
/// иначе случайный кандидат (без приоритетов).
pub fn pick_target<'a>(
    current: Option<ActorId>,
    candidates: &'a Candidates,
    rng: &mut impl Rng,
) -> Option<&'a IndexedActor> {
    if let Some(current) = current {
        if let Some(actor) = candidates.actors.iter().find(|actor| actor.id == current) {
            return Some(actor);
        }
    }
    if candidates.actors.is_empty() {
        return None;
    }
    let choice = rng.gen_range(0..candidates.actors.len());
    candidates.actors.get(choice)
}

/// Куда идти, когда путь закончился
///
/// - Patrol: случайный waypoint маршрута (нет маршрута — стоим)
/// - Seek: ближайший живой актор на карте
/// - Hunt: текущая позиция цели
/// - Alert: никуда (стоим и стреляем)
pub fn next_destination(
    brain: &NpcBrain,
    observer: Entity,
    position: Vec3,
    index: &HitVolumeIndex,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    match brain.behavior {
        Behavior::Alert => None,
        Behavior::Hunt => brain
            .target
            .and_then(|id| index.get_by_id(id))
            .filter(|target| target.alive)
            .map(|target| target.position),
        Behavior::Patrol => {
            if brain.waypoints.is_empty() {
                return None;
            }
            let choice = rng.gen_range(0..brain.waypoints.len());
            brain.waypoints.get(choice).copied()
        }
        Behavior::Seek => index
            .live()
            .filter(|actor| actor.entity != observer)
            .min_by(|a, b| {
                a.position
                    .distance_squared(position)
                    .total_cmp(&b.position.distance_squared(position))
            })
            .map(|actor| actor.position),
    }
}
