//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: идентичность и жизненный цикл (ActorId, Actor, Health, ScoreCard, LifeState, Roster)
//! - movement: навигация (MovementSpeed, NavAgent)

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
