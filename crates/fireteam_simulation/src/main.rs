//! Headless симуляция Fireteam
//!
//! Демо-арена, один скриптованный игрок и четыре NPC. Печатает scoreboard.

use bevy::prelude::*;
use fireteam_simulation::{
    create_headless_app, spawn_npc, spawn_player, step_simulation, ArenaWorld, Behavior, GameConfig, NpcBrain,
    PlayerInput, Scoreboard, WorldQueries,
};

const TICKS: u32 = 60 * 60;
const DT: f32 = 1.0 / 60.0;

fn demo_config() -> GameConfig {
    GameConfig {
        spawn_points: vec![
            [-30.0, 0.0, -30.0],
            [30.0, 0.0, -30.0],
            [-30.0, 0.0, 30.0],
            [30.0, 0.0, 30.0],
            [0.0, 0.0, -15.0],
            [15.0, 0.4, 15.0],
        ],
        patrol_waypoints: vec![
            [-25.0, 0.0, -25.0],
            [25.0, 0.0, -25.0],
            [25.0, 0.0, 25.0],
            [-25.0, 0.0, 25.0],
            [0.0, 0.0, 10.0],
        ],
        ..GameConfig::default()
    }
}

/// Скрипт игрока: бежит вперёд, поворачивает, стреляет короткими очередями
fn script_input(tick: u32) -> PlayerInput {
    PlayerInput {
        move_axis: Vec2::new(0.0, 1.0),
        run: tick % 600 < 300,
        jump: tick % 240 == 0,
        fire_held: tick % 90 < 30,
        look_delta: Vec2::new(if tick % 120 < 20 { 8.0 } else { 0.0 }, 0.0),
    }
}

fn main() {
    let seed = 42;
    println!("Starting Fireteam headless simulation (seed: {})", seed);

    let config = demo_config();
    let spawn_points = config.spawn_points();
    let waypoints = config.patrol_waypoints();
    let detection = config.npc.detection;

    let mut app = create_headless_app(seed);
    app.insert_resource(config)
        .insert_resource(WorldQueries::new(ArenaWorld::demo()));

    let world = app.world_mut();
    let player = spawn_player(world, "Player", spawn_points[0]);
    for (index, point) in spawn_points.iter().skip(1).take(4).enumerate() {
        let general = if index == 3 { Behavior::Seek } else { Behavior::Patrol };
        let brain = NpcBrain::new(general, waypoints.clone(), detection);
        spawn_npc(world, format!("Bot-{}", index + 1), *point, brain);
    }

    for tick in 0..TICKS {
        if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(player) {
            *input = script_input(tick);
        }

        match step_simulation(app.world_mut(), DT) {
            Ok(true) => {}
            Ok(false) => {
                println!("Tick {}: waiting for assets", tick);
                continue;
            }
            Err(error) => {
                eprintln!("Simulation cannot start: {}", error);
                return;
            }
        }

        if tick % 600 == 0 {
            println!("Tick {}: {} entities", tick, app.world().entities().len());
        }
    }

    println!("Simulation complete! Scoreboard:");
    for (rank, entry) in app.world().resource::<Scoreboard>().entries.iter().enumerate() {
        println!(
            "{:>2}. {:<8} kills {:>3}  deaths {:>3}  hp {:>3}/{}",
            rank + 1,
            entry.name,
            entry.kills,
            entry.deaths,
            entry.health,
            entry.max_health
        );
    }
}
