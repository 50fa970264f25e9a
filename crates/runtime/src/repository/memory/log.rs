//! In-memory CombatLogRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tactics_core::{CombatLog, CombatLogEntry};

use crate::config::RuntimeConfig;
use crate::repository::{CombatLogRepository, RepositoryError, Result};
use crate::types::SessionUid;

/// Per-session logs, each bounded to `capacity` entries.
pub struct InMemoryCombatLogRepository {
    logs: RwLock<HashMap<SessionUid, CombatLog>>,
    capacity: usize,
}

impl Default for InMemoryCombatLogRepository {
    fn default() -> Self {
        Self::with_capacity(RuntimeConfig::DEFAULT_LOG_CAPACITY)
    }
}

impl InMemoryCombatLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            logs: RwLock::default(),
            capacity: capacity.max(1),
        }
    }
}

#[async_trait]
impl CombatLogRepository for InMemoryCombatLogRepository {
    async fn append(
        &self,
        session: &SessionUid,
        entries: Vec<CombatLogEntry>,
    ) -> Result<Vec<CombatLogEntry>> {
        let mut logs = self
            .logs
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let log = logs.entry(session.clone()).or_default();

        if log.len() + log.count_new(&entries) > self.capacity {
            return Err(RepositoryError::LogFull {
                session: session.to_string(),
                capacity: self.capacity,
            });
        }
        Ok(log.append(entries))
    }

    async fn list(&self, session: &SessionUid) -> Result<Vec<CombatLogEntry>> {
        let logs = self
            .logs
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(logs
            .get(session)
            .map(|log| log.entries().to_vec())
            .unwrap_or_default())
    }
}
