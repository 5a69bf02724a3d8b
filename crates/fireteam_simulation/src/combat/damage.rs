//! Damage application (чистая логика)

use crate::components::Health;

/// Результат попадания
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Wounded { remaining: u32 },
    /// Health дошёл до 0 (clamp), актор умирает
    Killed,
}

/// `health -= damage` с clamp в 0
pub fn apply_hit(health: &mut Health, damage: u32) -> HitOutcome {
    match health.take_damage(damage) {
        0 => HitOutcome::Killed,
        remaining => HitOutcome::Wounded { remaining },
    }
}
