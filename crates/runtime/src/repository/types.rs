//! Records persisted by the repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tactics_core::{SessionConfig, SessionState, SessionStatus, UnitId};

use crate::types::{BattleUid, CharacterId, OwnerId, SessionId, SessionUid};

/// A persisted explore session.
///
/// `config` is written once at creation. Only `state`, `status` and
/// `updated_at` are ever rewritten.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub uid: SessionUid,
    pub owner: OwnerId,
    pub character: CharacterId,
    pub status: SessionStatus,
    pub config: SessionConfig,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a session; the repository assigns `id`.
#[derive(Clone, Debug)]
pub struct NewSession {
    pub uid: SessionUid,
    pub owner: OwnerId,
    pub character: CharacterId,
    pub config: SessionConfig,
    pub state: SessionState,
}

/// A battle nested inside a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub uid: BattleUid,
    pub session: SessionUid,
    pub status: SessionStatus,
    /// Enemies copied into the battle, by session-scoped id.
    pub engaged: Vec<UnitId>,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
}

/// What caused a reward.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriggerType {
    EnemyDefeated,
    ChestOpened,
}

/// Uniqueness key of a ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    pub session: SessionId,
    pub trigger_type: TriggerType,
    pub trigger_key: String,
}

impl LedgerKey {
    pub fn new(session: SessionId, trigger_type: TriggerType, trigger_key: impl Into<String>) -> Self {
        Self {
            session,
            trigger_type,
            trigger_key: trigger_key.into(),
        }
    }
}

/// Reward amounts and the character progress they produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPayload {
    pub experience: u64,
    pub gold: u64,
    /// Character experience total after the grant.
    #[serde(default)]
    pub total_experience: Option<u64>,
    /// Level derived from `total_experience`.
    #[serde(default)]
    pub level: Option<u32>,
}

impl RewardPayload {
    pub fn experience(amount: u64) -> Self {
        Self {
            experience: amount,
            ..Self::default()
        }
    }

    pub fn gold(amount: u64) -> Self {
        Self {
            gold: amount,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: LedgerKey,
    pub payload: RewardPayload,
    pub granted_at: DateTime<Utc>,
}

/// Persistent character progression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: CharacterId,
    pub owner: OwnerId,
    pub experience: u64,
    pub level: u32,
    pub gold: u64,
}

impl CharacterRecord {
    pub fn new(id: CharacterId, owner: OwnerId) -> Self {
        Self {
            id,
            owner,
            experience: 0,
            level: 1,
            gold: 0,
        }
    }
}
