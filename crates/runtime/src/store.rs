//! Session store: ownership-checked load and state persistence.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use tactics_core::CombatLogEntry;

use crate::repository::{CombatLogRepository, RepositoryError, SessionRecord, SessionRepository};
use crate::types::{OwnerId, SessionUid};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session {0} not found")]
    NotFound(SessionUid),

    /// The session exists but belongs to someone else.
    ///
    /// Kept distinct internally; surfaces to clients exactly like `NotFound`.
    #[error("session {uid} is not owned by {owner}")]
    NotOwner { uid: SessionUid, owner: OwnerId },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::NotOwner { .. })
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<dyn SessionRepository>,
    logs: Arc<dyn CombatLogRepository>,
}

impl SessionStore {
    pub fn new(sessions: Arc<dyn SessionRepository>, logs: Arc<dyn CombatLogRepository>) -> Self {
        Self { sessions, logs }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionRepository> {
        &self.sessions
    }

    /// Loads a session and verifies `owner` owns it.
    pub async fn load(&self, uid: &SessionUid, owner: &OwnerId) -> Result<SessionRecord, StoreError> {
        let record = self
            .sessions
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| StoreError::NotFound(uid.clone()))?;

        if &record.owner != owner {
            warn!(session = %uid, caller = %owner, "session access by non-owner");
            return Err(StoreError::NotOwner {
                uid: uid.clone(),
                owner: owner.clone(),
            });
        }
        Ok(record)
    }

    /// Persists `state` and `status`; nothing else on the record is written.
    pub async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.sessions
            .update_state(&record.uid, &record.state, record.status)
            .await?;
        Ok(())
    }

    pub async fn append_log(
        &self,
        uid: &SessionUid,
        entries: Vec<CombatLogEntry>,
    ) -> Result<Vec<CombatLogEntry>, StoreError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.logs.append(uid, entries).await?)
    }

    pub async fn log(&self, uid: &SessionUid) -> Result<Vec<CombatLogEntry>, StoreError> {
        Ok(self.logs.list(uid).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tactics_core::{Phase, SessionConfig, SessionState, SessionStatus};

    use crate::repository::{InMemoryCombatLogRepository, InMemorySessionRepository, NewSession};
    use crate::types::CharacterId;

    fn config() -> SessionConfig {
        let unit = |entity: &str, x: i32| {
            json!({
                "entity": entity, "name": entity, "position": {"x": x, "y": 0},
                "max_hp": 10, "max_sp": 5, "attack": 4, "defense": 1,
            })
        };
        serde_json::from_value(json!({
            "map": {"width": 4, "height": 4},
            "portal": {"x": 3, "y": 3},
            "player": unit("hero", 0),
            "enemies": [unit("slime", 2)],
        }))
        .unwrap()
    }

    async fn store_with_session() -> (SessionStore, SessionUid) {
        let store = SessionStore::new(
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(InMemoryCombatLogRepository::new()),
        );
        let config = config();
        let record = store
            .sessions()
            .insert(NewSession {
                uid: SessionUid::from("s1"),
                owner: OwnerId::from("alice"),
                character: CharacterId::from("knight"),
                state: SessionState::from_config(&config, 1),
                config,
            })
            .await
            .unwrap();
        (store, record.uid)
    }

    #[tokio::test]
    async fn load_checks_ownership() {
        let (store, uid) = store_with_session().await;

        assert!(store.load(&uid, &OwnerId::from("alice")).await.is_ok());
        assert!(matches!(
            store.load(&uid, &OwnerId::from("mallory")).await,
            Err(StoreError::NotOwner { .. })
        ));
        assert!(matches!(
            store.load(&SessionUid::from("nope"), &OwnerId::from("alice")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_writes_only_state_and_status() {
        let (store, uid) = store_with_session().await;
        let owner = OwnerId::from("alice");

        let mut record = store.load(&uid, &owner).await.unwrap();
        record.state.player.hp = 3;
        record.status = SessionStatus::Abandoned;
        record.owner = OwnerId::from("mallory");
        record.config.portal = tactics_core::Position::ORIGIN;
        store.save(&record).await.unwrap();

        let reloaded = store.load(&uid, &owner).await.unwrap();
        assert_eq!(reloaded.state.player.hp, 3);
        assert_eq!(reloaded.status, SessionStatus::Abandoned);
        assert_eq!(reloaded.config.portal, tactics_core::Position::new(3, 3));
    }

    #[tokio::test]
    async fn log_appends_skip_duplicates() {
        let (store, uid) = store_with_session().await;
        let entry = CombatLogEntry::new(1, Phase::Player, "attack").with("damage", 3);

        let first = store.append_log(&uid, vec![entry.clone()]).await.unwrap();
        let second = store.append_log(&uid, vec![entry]).await.unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(store.log(&uid).await.unwrap().len(), 1);
    }
}
