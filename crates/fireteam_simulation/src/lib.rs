//! Fireteam Simulation Core
//!
//! ECS-симуляция FPS боя (player + NPC) на Bevy 0.16, headless.
//!
//! Архитектура:
//! - world: World Query Adapter (raycast + navmesh контракт), hit-volumes
//! - locomotion: ground following, step climbing, jump/fall
//! - navigation: path follower по waypoints
//! - ai: Patrol / Seek / Hunt / Alert
//! - combat: fire gating, hit-scan, отложенный урон, death/respawn
//! - player: input snapshot → движение и прицел
//!
//! Один тик = `SimulationTick` schedule, наборы систем строго по порядку
//! (`SimSet`). Все лучи внутри тика видят hit-volumes на начало тика.

use bevy::ecs::schedule::{ScheduleLabel, Schedules};
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod animation;
pub mod clock;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod locomotion;
pub mod logger;
pub mod navigation;
pub mod player;
pub mod readiness;
pub mod scoreboard;
pub mod snapshot;
pub mod spawn;
pub mod world;

pub use ai::{Behavior, BehaviorChanged, NpcBrain};
pub use animation::{Action, ActionRequested, AnimationState};
pub use clock::{SimClock, Timestamp};
pub use combat::{ActorDied, ActorRespawned, Bullet, BulletImpact, DamageDealt, ImpactMarker, Weapon, WeaponFired};
pub use components::*;
pub use config::GameConfig;
pub use error::SimError;
pub use locomotion::{Airborne, Locomotion};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter,
};
pub use navigation::PathFollower;
pub use player::{HeadBob, Player, PlayerInput, PlayerLook};
pub use readiness::{AssetKind, Readiness};
pub use scoreboard::{ScoreEntry, Scoreboard};
pub use snapshot::{ActorSnapshot, WorldSnapshot};
pub use spawn::{spawn_npc, spawn_player};
pub use world::{ArenaWorld, WorldQueries, WorldQuery};

/// Schedule одного тика симуляции
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationTick;

/// Порядок внутри тика
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Hit-volumes на начало тика
    Snapshot,
    /// Прилёт пуль, урон, смерти
    Combat,
    Respawn,
    /// Player input, path follower, jump/fall
    Locomotion,
    /// Периодический scan NPC
    Behavior,
    /// Новые выстрелы
    Fire,
    /// Animation requests, scoreboard
    Presentation,
}

/// Главный plugin симуляции
///
/// `SimulationTick` гоняется из FixedUpdate (60Hz) через `step_simulation`,
/// пока readiness gate закрыт — тики пропускаются.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<GameConfig>()
            .init_resource::<SimClock>()
            .init_resource::<Readiness>()
            .init_resource::<WorldQueries>()
            .init_resource::<world::HitVolumeIndex>()
            .init_resource::<Roster>()
            .init_resource::<combat::BulletSequence>()
            .init_resource::<Scoreboard>()
            .add_event::<ActionRequested>()
            .add_event::<BehaviorChanged>()
            .add_event::<WeaponFired>()
            .add_event::<DamageDealt>()
            .add_event::<ActorDied>()
            .add_event::<ActorRespawned>()
            .add_event::<BulletImpact>()
            .init_schedule(SimulationTick)
            .configure_sets(
                SimulationTick,
                (
                    SimSet::Snapshot,
                    SimSet::Combat,
                    SimSet::Respawn,
                    SimSet::Locomotion,
                    SimSet::Behavior,
                    SimSet::Fire,
                    SimSet::Presentation,
                )
                    .chain(),
            )
            .add_systems(
                SimulationTick,
                (
                    world::refresh_hit_volumes.in_set(SimSet::Snapshot),
                    (combat::advance_bullets, combat::fade_impacts)
                        .chain()
                        .in_set(SimSet::Combat),
                    combat::respawn_actors.in_set(SimSet::Respawn),
                    (
                        player::drive_players,
                        navigation::follow_paths,
                        locomotion::apply_vertical_motion,
                        locomotion::guard_world_floor,
                        player::update_head_bob,
                    )
                        .chain()
                        .in_set(SimSet::Locomotion),
                    ai::detect_targets.in_set(SimSet::Behavior),
                    combat::fire_weapons.in_set(SimSet::Fire),
                    (animation::flush_action_requests, scoreboard::publish_scoreboard)
                        .chain()
                        .in_set(SimSet::Presentation),
                ),
            )
            .add_systems(FixedUpdate, run_simulation_tick);
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Единственный источник случайности: spawn points, patrol waypoints,
/// выбор цели. Системы потребляют его в порядке ActorId.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Один тик симуляции
///
/// `Ok(false)` — readiness gate ещё закрыт (или schedule не собран),
/// тик пропущен. `Err` — сессия не может стартовать.
pub fn step_simulation(world: &mut World, dt: f32) -> Result<bool, SimError> {
    let ready = match world.get_resource::<Readiness>() {
        Some(readiness) => readiness.gate()?,
        None => false,
    };
    if !ready {
        return Ok(false);
    }

    let has_spawn_points = world
        .get_resource::<GameConfig>()
        .is_some_and(|config| !config.spawn_points.is_empty());
    if !has_spawn_points {
        return Err(SimError::NoSpawnPoints);
    }

    let has_schedule = world
        .get_resource::<Schedules>()
        .is_some_and(|schedules| schedules.contains(SimulationTick));
    if !has_schedule {
        return Ok(false);
    }

    rotate_events(world);
    world.get_resource_or_insert_with(SimClock::default).advance(dt);
    world.run_schedule(SimulationTick);
    Ok(true)
}

/// Double-buffer rotation событий симуляции в начале тика
///
/// После `step_simulation` текущий буфер = события именно этого тика,
/// `EventReader` видит ещё и предыдущий. Старше двух тиков — отброшены.
fn rotate_events(world: &mut World) {
    fn rotate<E: Event>(world: &mut World) {
        if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
            events.update();
        }
    }

    rotate::<ActionRequested>(world);
    rotate::<BehaviorChanged>(world);
    rotate::<WeaponFired>(world);
    rotate::<DamageDealt>(world);
    rotate::<ActorDied>(world);
    rotate::<ActorRespawned>(world);
    rotate::<BulletImpact>(world);
}

/// FixedUpdate driver: фатальная ошибка логируется один раз
fn run_simulation_tick(world: &mut World, mut reported: Local<bool>) {
    let dt = world.get_resource::<Time>().map(|time| time.delta_secs()).unwrap_or(0.0);

    if let Err(error) = step_simulation(world, dt) {
        if !*reported {
            log_error(&format!("❌ simulation halted: {}", error));
            *reported = true;
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Readiness gate открыт сразу, world backend — `WorldQueries::unloaded()`
/// до вызова `insert_resource(WorldQueries::new(..))`.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, SimulationPlugin))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Readiness::all_ready());

    app
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_waits_for_readiness() {
        let mut app = create_headless_app(1);
        app.insert_resource(Readiness::default());

        let stepped = step_simulation(app.world_mut(), 0.016).unwrap();

        assert!(!stepped);
        assert_eq!(app.world().resource::<SimClock>().tick, 0);
    }

    #[test]
    fn test_tick_advances_clock_when_ready() {
        let mut app = create_headless_app(1);

        assert!(step_simulation(app.world_mut(), 0.5).unwrap());
        assert!(step_simulation(app.world_mut(), 0.5).unwrap());

        let clock = app.world().resource::<SimClock>();
        assert_eq!(clock.tick, 2);
        assert_eq!(clock.now, Timestamp::from_millis(1_000));
    }

    #[test]
    fn test_failed_asset_blocks_session() {
        let mut app = create_headless_app(1);
        app.world_mut()
            .resource_mut::<Readiness>()
            .signal_failed(AssetKind::Environment, "missing level.glb");

        let result = step_simulation(app.world_mut(), 0.016);

        assert!(matches!(result, Err(SimError::AssetLoad { .. })));
    }

    #[test]
    fn test_empty_spawn_table_is_an_error() {
        let mut app = create_headless_app(1);
        app.world_mut().resource_mut::<GameConfig>().spawn_points.clear();

        let result = step_simulation(app.world_mut(), 0.016);

        assert!(matches!(result, Err(SimError::NoSpawnPoints)));
    }
}
