//! Repository layer for session runtime data.
//!
//! Repositories handle data that CHANGES during play:
//! - Session rows (state and status only)
//! - Battles nested in a session
//! - The append-only combat log
//! - The reward ledger and character progression
//!
//! Static game-design data (skills, balance) is served by the core
//! `TablesOracle`, not by repositories.

mod error;
pub mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use memory::{
    InMemoryBattleRepository, InMemoryCharacterRepository, InMemoryCombatLogRepository,
    InMemoryRewardLedger, InMemorySessionRepository,
};
pub use traits::{
    BattleRepository, CharacterRepository, CombatLogRepository, RewardLedgerRepository,
    SessionRepository,
};
pub use types::{
    BattleRecord, CharacterRecord, LedgerEntry, LedgerKey, NewSession, RewardPayload,
    SessionRecord, TriggerType,
};
