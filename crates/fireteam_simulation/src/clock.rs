//! Simulation clock: монотонное время симуляции для таймеров
//!
//! Все таймауты (cooldown оружия, respawn, detection throttle) сравнивают
//! `SimClock::now` с сохранённым `Timestamp`, а не считают тики — поведение
//! одинаковое при любом frame rate.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Момент времени симуляции (offset от старта сессии)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn after(self, delay: Duration) -> Self {
        Self(self.0 + delay)
    }

    pub fn as_secs_f32(self) -> f32 {
        self.0.as_secs_f32()
    }
}

/// Resource: часы симуляции
///
/// Продвигаются только в `step_simulation` (один раз за тик).
#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    pub now: Timestamp,
    /// Delta текущего тика (секунды)
    pub delta: f32,
    /// Количество выполненных тиков
    pub tick: u64,
}

impl SimClock {
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.delta = dt;
        self.now = self.now.after(Duration::from_secs_f32(dt));
        self.tick += 1;
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_monotonically() {
        let mut clock = SimClock::default();
        clock.advance(0.5);
        clock.advance(0.25);

        assert_eq!(clock.tick, 2);
        assert_eq!(clock.now, Timestamp::from_millis(750));
        assert_eq!(clock.delta_secs(), 0.25);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut clock = SimClock::default();
        clock.advance(-1.0);
        assert_eq!(clock.now, Timestamp::ZERO);
    }

    #[test]
    fn test_timestamp_ordering() {
        let spawn = Timestamp::from_millis(1_000);
        let respawn = spawn.after(Duration::from_secs(15));
        assert!(respawn > spawn);
        assert_eq!(respawn, Timestamp::from_millis(16_000));
    }
}
