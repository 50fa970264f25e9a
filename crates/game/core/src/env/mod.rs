//! Read-only inputs to the rules.
//!
//! Skill tables and balance parameters are external game-design data exposed
//! through [`TablesOracle`]; randomness comes from [`RngOracle`]. The
//! [`GameEnv`] aggregate bundles them with the session's immutable config and
//! the validation policy so transitions can access everything they need
//! without hard coupling to concrete implementations.
mod rng;
mod tables;

pub use rng::{PcgRng, RngOracle, compute_seed};
pub use tables::{
    CombatParams, SkillDefinition, SkillKind, SkillTargeting, StaticTables, StatusEffectSpec,
    TablesOracle,
};

use crate::config::SessionConfig;
use crate::validate::ValidationPolicy;

/// Aggregates read-only inputs required by the action pipeline.
#[derive(Clone, Copy)]
pub struct GameEnv<'a> {
    config: &'a SessionConfig,
    tables: &'a dyn TablesOracle,
    rng: &'a dyn RngOracle,
    policy: &'a ValidationPolicy,
}

impl<'a> GameEnv<'a> {
    pub fn new(
        config: &'a SessionConfig,
        tables: &'a dyn TablesOracle,
        rng: &'a dyn RngOracle,
        policy: &'a ValidationPolicy,
    ) -> Self {
        Self {
            config,
            tables,
            rng,
            policy,
        }
    }

    pub fn config(&self) -> &'a SessionConfig {
        self.config
    }

    pub fn tables(&self) -> &'a dyn TablesOracle {
        self.tables
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }

    pub fn policy(&self) -> &'a ValidationPolicy {
        self.policy
    }
}

impl std::fmt::Debug for GameEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEnv")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
