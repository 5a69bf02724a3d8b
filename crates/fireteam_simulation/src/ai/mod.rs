//! NPC Behavior Engine
//!
//! Конечный автомат Patrol / Seek / Hunt / Alert поверх path follower.
//! Patrol (или Seek) — состояние покоя, Hunt и Alert держатся только пока
//! периодический scan находит кандидатов.
//!
//! - components: `Behavior`, `NpcBrain`
//! - detection: чистые функции scan / target stickiness / выбор destination
//! - systems: `detect_targets` (throttled, раз в `DetectionConfig::interval`)

pub mod components;
pub mod detection;
pub mod events;
pub mod systems;


pub use components::{Behavior, NpcBrain};
pub use detection::{next_destination, pick_target, scan_candidates, CandidateRange, Candidates};
pub use events::BehaviorChanged;
pub use systems::detect_targets;
