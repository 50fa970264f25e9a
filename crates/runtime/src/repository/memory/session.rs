//! In-memory SessionRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use tactics_core::{SessionState, SessionStatus};

use crate::repository::{NewSession, RepositoryError, Result, SessionRecord, SessionRepository};
use crate::types::{SessionId, SessionUid};

#[derive(Default)]
struct Inner {
    next_id: u64,
    rows: HashMap<SessionUid, SessionRecord>,
}

/// Stores session rows keyed by uid.
#[derive(Default)]
pub struct InMemorySessionRepository {
    inner: RwLock<Inner>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: NewSession) -> Result<SessionRecord> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        if inner.rows.contains_key(&session.uid) {
            return Err(RepositoryError::Duplicate(session.uid.to_string()));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let record = SessionRecord {
            id: SessionId(inner.next_id),
            uid: session.uid,
            owner: session.owner,
            character: session.character,
            status: SessionStatus::Active,
            config: session.config,
            state: session.state,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(record.uid.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_uid(&self, uid: &SessionUid) -> Result<Option<SessionRecord>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(inner.rows.get(uid).cloned())
    }

    async fn update_state(
        &self,
        uid: &SessionUid,
        state: &SessionState,
        status: SessionStatus,
    ) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let record = inner
            .rows
            .get_mut(uid)
            .ok_or_else(|| RepositoryError::Missing(uid.to_string()))?;

        record.state = state.clone();
        record.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }
}
