//! Readiness gate: симуляция стартует только когда все assets загружены
//!
//! Три независимых сигнала (environment, player model, NPC models) без
//! требований к порядку. Ошибка загрузки любого из них — терминальна:
//! gate больше никогда не открывается.

use bevy::prelude::*;
use std::fmt;

use crate::error::SimError;
use crate::logger;

/// Asset, готовность которого ждёт gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Environment,
    PlayerModel,
    NpcModels,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [
        AssetKind::Environment,
        AssetKind::PlayerModel,
        AssetKind::NpcModels,
    ];
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Environment => "environment",
            AssetKind::PlayerModel => "player model",
            AssetKind::NpcModels => "npc models",
        };
        f.write_str(name)
    }
}

/// Resource: состояние readiness gate
#[derive(Resource, Debug, Default)]
pub struct Readiness {
    environment: bool,
    player_model: bool,
    npc_models: bool,
    failure: Option<(AssetKind, String)>,
}

impl Readiness {
    /// Все assets готовы сразу (тесты, headless демо)
    pub fn all_ready() -> Self {
        let mut readiness = Self::default();
        for asset in AssetKind::ALL {
            readiness.signal_ready(asset);
        }
        readiness
    }

    pub fn signal_ready(&mut self, asset: AssetKind) {
        let slot = match asset {
            AssetKind::Environment => &mut self.environment,
            AssetKind::PlayerModel => &mut self.player_model,
            AssetKind::NpcModels => &mut self.npc_models,
        };
        if !*slot {
            *slot = true;
            logger::log(&format!("📦 {} ready", asset));
        }
    }

    pub fn signal_failed(&mut self, asset: AssetKind, reason: impl Into<String>) {
        let reason = reason.into();
        logger::log_error(&format!("❌ failed to load {}: {}", asset, reason));
        // Первая ошибка остаётся причиной
        if self.failure.is_none() {
            self.failure = Some((asset, reason));
        }
    }

    pub fn is_ready(&self, asset: AssetKind) -> bool {
        match asset {
            AssetKind::Environment => self.environment,
            AssetKind::PlayerModel => self.player_model,
            AssetKind::NpcModels => self.npc_models,
        }
    }

    /// `Ok(true)` — можно тикать, `Ok(false)` — ещё ждём,
    /// `Err` — загрузка провалилась, сессия не стартует.
    pub fn gate(&self) -> Result<bool, SimError> {
        if let Some((asset, reason)) = &self.failure {
            return Err(SimError::AssetLoad {
                asset: *asset,
                reason: reason.clone(),
            });
        }
        Ok(self.environment && self.player_model && self.npc_models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_opens_in_any_order() {
        let mut readiness = Readiness::default();
        assert!(!readiness.gate().unwrap());

        readiness.signal_ready(AssetKind::NpcModels);
        readiness.signal_ready(AssetKind::Environment);
        assert!(!readiness.gate().unwrap());

        readiness.signal_ready(AssetKind::PlayerModel);
        assert!(readiness.gate().unwrap());
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut readiness = Readiness::all_ready();
        readiness.signal_failed(AssetKind::PlayerModel, "404");
        readiness.signal_ready(AssetKind::PlayerModel);

        match readiness.gate() {
            Err(SimError::AssetLoad { asset, reason }) => {
                assert_eq!(asset, AssetKind::PlayerModel);
                assert_eq!(reason, "404");
            }
            other => panic!("expected AssetLoad error, got {:?}", other),
        }
    }
}
