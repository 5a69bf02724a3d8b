//! Ошибки симуляции
//!
//! Только исключительные ситуации. No-path и no-hit — не ошибки,
//! они выражаются через `Option` / пустой `Vec` на месте вызова.

use crate::components::ActorId;
use crate::readiness::AssetKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Коллаборатор не смог загрузить asset — сессия не стартует
    #[error("failed to load {asset}: {reason}")]
    AssetLoad { asset: AssetKind, reason: String },

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[source] serde_json::Error),

    #[error("snapshot references unknown actor {0:?}")]
    UnknownActor(ActorId),

    #[error("spawn point table is empty")]
    NoSpawnPoints,
}
