//! Repository contracts for persisting sessions, battles, logs and rewards.
//!
//! Implementations are shared across concurrent requests, so every method
//! takes `&self`. Storage is last-write-wins except for
//! [`RewardLedgerRepository::insert_if_absent`], which must be atomic.

use async_trait::async_trait;

use tactics_core::{CombatLogEntry, SessionState, SessionStatus};

use super::Result;
use super::types::{
    BattleRecord, CharacterRecord, LedgerEntry, LedgerKey, NewSession, RewardPayload,
    SessionRecord,
};
use crate::progression::LevelCurve;
use crate::types::{BattleUid, CharacterId, OwnerId, SessionUid};

/// Session rows.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts a new session and assigns its internal id.
    async fn insert(&self, session: NewSession) -> Result<SessionRecord>;

    /// Looks a session up by its external uid, regardless of owner.
    async fn find_by_uid(&self, uid: &SessionUid) -> Result<Option<SessionRecord>>;

    /// Rewrites `state` and `status` of an existing session.
    ///
    /// Config, owner and identifiers are never touched.
    async fn update_state(
        &self,
        uid: &SessionUid,
        state: &SessionState,
        status: SessionStatus,
    ) -> Result<()>;
}

/// Append-only combat log, one stream per session.
#[async_trait]
pub trait CombatLogRepository: Send + Sync {
    /// Appends entries not already stored and returns those appended.
    async fn append(
        &self,
        session: &SessionUid,
        entries: Vec<CombatLogEntry>,
    ) -> Result<Vec<CombatLogEntry>>;

    /// Returns the stored log ordered by turn, then insertion.
    async fn list(&self, session: &SessionUid) -> Result<Vec<CombatLogEntry>>;
}

/// Battles nested inside sessions.
#[async_trait]
pub trait BattleRepository: Send + Sync {
    async fn insert(&self, battle: BattleRecord) -> Result<()>;

    async fn find(&self, session: &SessionUid, battle: &BattleUid) -> Result<Option<BattleRecord>>;

    /// The active battle of a session, if any.
    async fn active_for(&self, session: &SessionUid) -> Result<Option<BattleRecord>>;

    async fn update_state(&self, battle: &BattleUid, state: &SessionState) -> Result<()>;

    /// Discards a battle once it has been reconciled.
    async fn remove(&self, battle: &BattleUid) -> Result<()>;
}

/// Reward ledger rows keyed by `(session, trigger_type, trigger_key)`.
#[async_trait]
pub trait RewardLedgerRepository: Send + Sync {
    /// Atomically inserts `entry` unless its key already exists.
    ///
    /// Returns `true` only for the single caller whose insert succeeded.
    async fn insert_if_absent(&self, entry: LedgerEntry) -> Result<bool>;

    async fn find(&self, key: &LedgerKey) -> Result<Option<LedgerEntry>>;

    /// Records the character progress produced by a grant.
    async fn annotate(&self, key: &LedgerKey, payload: RewardPayload) -> Result<()>;

    async fn list(&self) -> Result<Vec<LedgerEntry>>;
}

/// Character progression, owned by an external collaborator.
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Returns the character, creating it at level 1 if missing.
    async fn ensure(&self, id: &CharacterId, owner: &OwnerId) -> Result<CharacterRecord>;

    async fn find(&self, id: &CharacterId) -> Result<Option<CharacterRecord>>;

    /// Adds experience and recomputes the level from `curve`.
    async fn add_experience(
        &self,
        id: &CharacterId,
        amount: u64,
        curve: &LevelCurve,
    ) -> Result<CharacterRecord>;

    async fn add_gold(&self, id: &CharacterId, amount: u64) -> Result<CharacterRecord>;
}
