//! Animation requests
//!
//! Ядро только выбирает логическое действие; blend weights и проигрывание
//! клипов — дело внешнего animation collaborator.
//!
//! - `Action` — перечисление действий (одно и то же для player и NPC)
//! - `ActionProfile` — таблица cross-fade / loop / weapon pose по действию
//! - `AnimationState::request` — идемпотентный запрос (повтор = no-op)
//! - `flush_action_requests` — публикует `ActionRequested` раз в тик

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Логическое действие анимации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Idle,
    Running,
    Firing,
    FiringMove,
    DeathStanding,
    DeathNormal,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Running => "running",
            Action::Firing => "firing",
            Action::FiringMove => "firingmove",
            Action::DeathStanding => "deathstanding",
            Action::DeathNormal => "deathnormal",
        }
    }

    pub fn is_death(&self) -> bool {
        matches!(self, Action::DeathStanding | Action::DeathNormal)
    }

    /// Вариант смерти: в движении/в воздухе — normal, на месте — standing
    pub fn death(moving_or_airborne: bool) -> Self {
        if moving_or_airborne {
            Action::DeathNormal
        } else {
            Action::DeathStanding
        }
    }

    pub fn profile(&self) -> ActionProfile {
        match self {
            Action::Idle => ActionProfile::looping(0.5, IDLE_POSE),
            Action::Running => ActionProfile::looping(0.5, RUN_POSE),
            // Из firing переключаемся без cross-fade
            Action::Firing => ActionProfile::once(0.0, FIRING_POSE),
            Action::FiringMove => ActionProfile::looping(0.0, FIRING_POSE),
            Action::DeathStanding | Action::DeathNormal => ActionProfile::once(0.5, DEATH_POSE),
        }
    }
}

/// Поза оружия в руке (rotation + offset в единицах модели)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponPose {
    pub rotation: Quat,
    pub offset: Vec3,
}

pub const IDLE_POSE: WeaponPose = WeaponPose {
    rotation: Quat::from_xyzw(-0.378, 0.371, 0.531, 0.662),
    offset: Vec3::new(4.17, 23.777, 3.63),
};

pub const RUN_POSE: WeaponPose = WeaponPose {
    rotation: Quat::from_xyzw(-0.513, 0.375, 0.590, 0.498),
    offset: Vec3::new(0.0, 23.777, 3.63),
};

pub const FIRING_POSE: WeaponPose = WeaponPose {
    rotation: Quat::from_xyzw(-0.436, 0.496, 0.697, 0.352),
    offset: Vec3::new(0.0, 16.777, -5.63),
};

pub const DEATH_POSE: WeaponPose = WeaponPose {
    rotation: Quat::from_xyzw(-0.476, -0.536, 0.497, 0.488),
    offset: Vec3::ZERO,
};

/// Политика проигрывания действия
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionProfile {
    /// Длительность cross-fade, когда это действие сменяется следующим
    pub fade_out_secs: f32,
    /// Проиграть один раз и замереть на последнем кадре
    pub loop_once: bool,
    pub weapon_pose: WeaponPose,
}

impl ActionProfile {
    const fn looping(fade_out_secs: f32, weapon_pose: WeaponPose) -> Self {
        Self {
            fade_out_secs,
            loop_once: false,
            weapon_pose,
        }
    }

    const fn once(fade_out_secs: f32, weapon_pose: WeaponPose) -> Self {
        Self {
            fade_out_secs,
            loop_once: true,
            weapon_pose,
        }
    }
}

/// Текущее действие анимации актора
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct AnimationState {
    /// Последнее запрошенное действие
    current: Option<Action>,
    /// Последнее отправленное collaborator'у действие
    played: Option<Action>,
    pending: bool,
}

impl AnimationState {
    pub fn current(&self) -> Option<Action> {
        self.current
    }

    /// Идемпотентный запрос: повтор текущего действия — no-op (false)
    pub fn request(&mut self, action: Action) -> bool {
        if self.current == Some(action) {
            return false;
        }
        self.current = Some(action);
        self.pending = true;
        true
    }

    /// Состояние из snapshot: действие считается уже отправленным
    pub fn restore(&mut self, action: Option<Action>) {
        self.current = action;
        self.played = action;
        self.pending = false;
    }

    /// Забирает действие для отправки (не больше одного за тик)
    fn take_pending(&mut self) -> Option<(Action, f32)> {
        if !self.pending {
            return None;
        }
        self.pending = false;

        let action = self.current?;
        if self.played == Some(action) {
            return None;
        }

        let crossfade = self
            .played
            .map(|previous| previous.profile().fade_out_secs)
            .unwrap_or(0.0);
        self.played = Some(action);
        Some((action, crossfade))
    }
}

/// Event: запрос действия для animation collaborator
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ActionRequested {
    pub entity: Entity,
    pub action: Action,
    pub crossfade_secs: f32,
    pub loop_once: bool,
    pub weapon_pose: WeaponPose,
}

/// Система: публикует накопленные за тик запросы действий
pub fn flush_action_requests(
    mut actors: Query<(Entity, &mut AnimationState)>,
    mut requests: EventWriter<ActionRequested>,
) {
    for (entity, mut state) in actors.iter_mut() {
        let Some((action, crossfade_secs)) = state.take_pending() else {
            continue;
        };
        let profile = action.profile();
        requests.write(ActionRequested {
            entity,
            action,
            crossfade_secs,
            loop_once: profile.loop_once,
            weapon_pose: profile.weapon_pose,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_idempotent() {
        let mut state = AnimationState::default();

        assert!(state.request(Action::Running));
        assert!(!state.request(Action::Running));
        assert_eq!(state.current(), Some(Action::Running));
    }

    #[test]
    fn test_only_last_request_per_tick_is_played() {
        let mut state = AnimationState::default();
        state.request(Action::Idle);
        assert_eq!(state.take_pending(), Some((Action::Idle, 0.0)));

        state.request(Action::Running);
        state.request(Action::FiringMove);
        assert_eq!(state.take_pending(), Some((Action::FiringMove, 0.5)));
        assert_eq!(state.take_pending(), None);
    }

    #[test]
    fn test_leaving_firing_has_no_crossfade() {
        let mut state = AnimationState::default();
        state.request(Action::Firing);
        state.take_pending();

        state.request(Action::Idle);
        assert_eq!(state.take_pending(), Some((Action::Idle, 0.0)));
    }

    #[test]
    fn test_request_back_to_played_action_is_dropped() {
        let mut state = AnimationState::default();
        state.request(Action::Idle);
        state.take_pending();

        state.request(Action::Running);
        state.request(Action::Idle);
        assert_eq!(state.take_pending(), None);
    }

    #[test]
    fn test_death_variant() {
        assert_eq!(Action::death(true), Action::DeathNormal);
        assert_eq!(Action::death(false), Action::DeathStanding);
        assert!(Action::DeathNormal.profile().loop_once);
        assert_eq!(Action::FiringMove.profile().weapon_pose, FIRING_POSE);
    }
}
