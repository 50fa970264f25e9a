//! In-memory RewardLedgerRepository implementation.
//!
//! A single mutex guards the check and the insert, which is what makes
//! `insert_if_absent` atomic.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::repository::{
    LedgerEntry, LedgerKey, RepositoryError, Result, RewardLedgerRepository, RewardPayload,
};

#[derive(Default)]
pub struct InMemoryRewardLedger {
    entries: Mutex<BTreeMap<LedgerKey, LedgerEntry>>,
}

impl InMemoryRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RewardLedgerRepository for InMemoryRewardLedger {
    async fn insert_if_absent(&self, entry: LedgerEntry) -> Result<bool> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if entries.contains_key(&entry.key) {
            return Ok(false);
        }
        entries.insert(entry.key.clone(), entry);
        Ok(true)
    }

    async fn find(&self, key: &LedgerKey) -> Result<Option<LedgerEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn annotate(&self, key: &LedgerKey, payload: RewardPayload) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let entry = entries
            .get_mut(key)
            .ok_or_else(|| RepositoryError::Missing(key.trigger_key.clone()))?;
        entry.payload = payload;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LedgerEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.values().cloned().collect())
    }
}
