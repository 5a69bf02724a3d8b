//! Scoreboard для presentation collaborator
//!
//! Сортировка: kills по убыванию, при равенстве deaths по возрастанию,
//! затем stable ActorId.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Actor, ActorId, ActorKind, Health, LifeState, ScoreCard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    pub kills: u32,
    pub deaths: u32,
    pub health: u32,
    pub max_health: u32,
    pub alive: bool,
}

/// Resource: отсортированная таблица (пересобирается каждый тик)
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Scoreboard {
    pub entries: Vec<ScoreEntry>,
}

impl Scoreboard {
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.sort_by(|a, b| {
            b.kills
                .cmp(&a.kills)
                .then(a.deaths.cmp(&b.deaths))
                .then(a.id.cmp(&b.id))
        });
        Self { entries }
    }

    pub fn leader(&self) -> Option<&ScoreEntry> {
        self.entries.first()
    }

    pub fn entry(&self, id: ActorId) -> Option<&ScoreEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

/// Система: публикует scoreboard
pub fn publish_scoreboard(
    actors: Query<(&Actor, &ScoreCard, &Health, &LifeState)>,
    mut scoreboard: ResMut<Scoreboard>,
) {
    let entries = actors
        .iter()
        .map(|(actor, score, health, life)| ScoreEntry {
            id: actor.id,
            name: actor.name.clone(),
            kind: actor.kind,
            kills: score.kills,
            deaths: score.deaths,
            health: health.current,
            max_health: health.max,
            alive: life.is_alive(),
        })
        .collect();

    *scoreboard = Scoreboard::from_entries(entries);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, kills: u32, deaths: u32) -> ScoreEntry {
        ScoreEntry {
            id: ActorId(id),
            name: format!("actor-{id}"),
            kind: ActorKind::Npc,
            kills,
            deaths,
            health: 100,
            max_health: 100,
            alive: true,
        }
    }

    #[test]
    fn test_sorted_by_kills_then_deaths() {
        let board = Scoreboard::from_entries(vec![
            entry(0, 1, 0),
            entry(1, 3, 4),
            entry(2, 3, 1),
            entry(3, 0, 0),
        ]);

        let order: Vec<u32> = board.entries.iter().map(|entry| entry.id.0).collect();
        assert_eq!(order, vec![2, 1, 0, 3]);
        assert_eq!(board.leader().map(|entry| entry.id), Some(ActorId(2)));
    }

    #[test]
    fn test_full_ties_fall_back_to_id() {
        let board = Scoreboard::from_entries(vec![entry(5, 2, 2), entry(1, 2, 2)]);

        assert_eq!(board.entries[0].id, ActorId(1));
        assert_eq!(board.entry(ActorId(5)).map(|entry| entry.kills), Some(2));
    }
}
