//! Создание акторов и выбор spawn points

use bevy::prelude::*;
use rand::Rng;

use crate::ai::NpcBrain;
use crate::combat::Weapon;
use crate::components::{Actor, ActorKind, Health, MovementSpeed, NavAgent, Roster};
use crate::config::GameConfig;
use crate::navigation::{facing_toward, PathFollower};
use crate::player::Player;
use crate::world::HitVolume;
use crate::DeterministicRng;

/// Куда смотрят NPC при появлении
pub const MAP_CENTER: Vec3 = Vec3::ZERO;

/// Случайный spawn point из конфига (`None` — таблица пуста)
pub fn pick_spawn_point(config: &GameConfig, rng: &mut DeterministicRng) -> Option<Vec3> {
    if config.spawn_points.is_empty() {
        return None;
    }
    let choice = rng.rng.gen_range(0..config.spawn_points.len());
    config.spawn_points.get(choice).copied().map(Vec3::from_array)
}

fn register_actor(world: &mut World, kind: ActorKind, name: String) -> Actor {
    let id = world.get_resource_or_insert_with(Roster::default).allocate();
    Actor { id, kind, name }
}

/// Спавнит игрока (управляется `PlayerInput`)
pub fn spawn_player(world: &mut World, name: impl Into<String>, position: Vec3) -> Entity {
    let config = world.get_resource::<GameConfig>().cloned().unwrap_or_default();
    let actor = register_actor(world, ActorKind::Player, name.into());
    let id = actor.id;

    crate::log(&format!("🎮 spawn player {} ({:?}) at {:?}", actor.name, id, position));
    let entity = world
        .spawn((
            actor,
            Player,
            Transform::from_translation(position),
            Health::new(config.player.max_health),
            HitVolume::at(position),
            Weapon::from_config(&config.player.weapon),
        ))
        .id();

    world.get_resource_or_insert_with(Roster::default).register(id, entity);
    entity
}

/// Спавнит NPC лицом к центру карты
pub fn spawn_npc(world: &mut World, name: impl Into<String>, position: Vec3, brain: NpcBrain) -> Entity {
    let config = world.get_resource::<GameConfig>().cloned().unwrap_or_default();
    let actor = register_actor(world, ActorKind::Npc, name.into());
    let id = actor.id;

    let mut transform = Transform::from_translation(position);
    if let Some(facing) = facing_toward(position, MAP_CENTER) {
        transform.rotation = facing;
    }

    crate::log(&format!(
        "🤖 spawn npc {} ({:?}) at {:?}, {}",
        actor.name,
        id,
        position,
        brain.general.as_str()
    ));
    let entity = world
        .spawn((
            actor,
            transform,
            Health::new(config.npc.max_health),
            HitVolume::at(position),
            Weapon::from_config(&config.npc.weapon),
            brain,
            NavAgent::new(config.zone),
            PathFollower::default(),
            MovementSpeed {
                speed: config.npc.speed,
            },
        ))
        .id();

    world.get_resource_or_insert_with(Roster::default).register(id, entity);
    entity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_point_comes_from_table() {
        let config = GameConfig::default();
        let points = config.spawn_points();
        let mut rng = DeterministicRng::new(5);

        for _ in 0..50 {
            let point = pick_spawn_point(&config, &mut rng).unwrap();
            assert!(points.contains(&point));
        }
    }

    #[test]
    fn test_empty_table_has_no_spawn_point() {
        let config = GameConfig {
            spawn_points: Vec::new(),
            ..GameConfig::default()
        };
        let mut rng = DeterministicRng::new(5);

        assert!(pick_spawn_point(&config, &mut rng).is_none());
    }

    #[test]
    fn test_spawned_actors_get_stable_ids() {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());

        let player = spawn_player(&mut world, "Player", Vec3::ZERO);
        let npc = spawn_npc(&mut world, "Bot", Vec3::new(5.0, 0.0, 5.0), NpcBrain::default());

        let roster = world.resource::<Roster>();
        assert_eq!(roster.len(), 2);
        let player_id = world.get::<Actor>(player).unwrap().id;
        let npc_id = world.get::<Actor>(npc).unwrap().id;
        assert!(player_id < npc_id);
        assert_eq!(roster.entity(npc_id), Some(npc));

        // Required components
        assert!(world.get::<crate::player::PlayerInput>(player).is_some());
        assert!(world.get::<crate::locomotion::Locomotion>(npc).is_some());
    }

    #[test]
    fn test_npc_faces_map_center() {
        let mut world = World::new();
        let npc = spawn_npc(&mut world, "Bot", Vec3::new(10.0, 0.0, 0.0), NpcBrain::default());

        let forward = world.get::<Transform>(npc).unwrap().forward();
        assert!(forward.x < -0.99, "forward = {:?}", forward);
    }
}
