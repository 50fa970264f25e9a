//! In-memory BattleRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tactics_core::SessionState;

use crate::repository::{BattleRecord, BattleRepository, RepositoryError, Result};
use crate::types::{BattleUid, SessionUid};

#[derive(Default)]
pub struct InMemoryBattleRepository {
    battles: RwLock<HashMap<BattleUid, BattleRecord>>,
}

impl InMemoryBattleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BattleRepository for InMemoryBattleRepository {
    async fn insert(&self, battle: BattleRecord) -> Result<()> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if battles.contains_key(&battle.uid) {
            return Err(RepositoryError::Duplicate(battle.uid.to_string()));
        }
        battles.insert(battle.uid.clone(), battle);
        Ok(())
    }

    async fn find(&self, session: &SessionUid, battle: &BattleUid) -> Result<Option<BattleRecord>> {
        let battles = self
            .battles
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(battles
            .get(battle)
            .filter(|record| &record.session == session)
            .cloned())
    }

    async fn active_for(&self, session: &SessionUid) -> Result<Option<BattleRecord>> {
        let battles = self
            .battles
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(battles
            .values()
            .find(|record| &record.session == session && !record.status.is_terminal())
            .cloned())
    }

    async fn update_state(&self, battle: &BattleUid, state: &SessionState) -> Result<()> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let record = battles
            .get_mut(battle)
            .ok_or_else(|| RepositoryError::Missing(battle.to_string()))?;
        record.state = state.clone();
        Ok(())
    }

    async fn remove(&self, battle: &BattleUid) -> Result<()> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        battles.remove(battle);
        Ok(())
    }
}
