//! In-memory CharacterRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::progression::LevelCurve;
use crate::repository::{CharacterRecord, CharacterRepository, RepositoryError, Result};
use crate::types::{CharacterId, OwnerId};

#[derive(Default)]
pub struct InMemoryCharacterRepository {
    characters: RwLock<HashMap<CharacterId, CharacterRecord>>,
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(
        &self,
        id: &CharacterId,
        f: impl FnOnce(&mut CharacterRecord),
    ) -> Result<CharacterRecord> {
        let mut characters = self
            .characters
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let record = characters
            .get_mut(id)
            .ok_or_else(|| RepositoryError::Missing(id.to_string()))?;
        f(record);
        Ok(record.clone())
    }
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    async fn ensure(&self, id: &CharacterId, owner: &OwnerId) -> Result<CharacterRecord> {
        let mut characters = self
            .characters
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(characters
            .entry(id.clone())
            .or_insert_with(|| CharacterRecord::new(id.clone(), owner.clone()))
            .clone())
    }

    async fn find(&self, id: &CharacterId) -> Result<Option<CharacterRecord>> {
        let characters = self
            .characters
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(characters.get(id).cloned())
    }

    async fn add_experience(
        &self,
        id: &CharacterId,
        amount: u64,
        curve: &LevelCurve,
    ) -> Result<CharacterRecord> {
        self.update(id, |record| {
            record.experience = record.experience.saturating_add(amount);
            record.level = curve.level_for(record.experience);
        })
    }

    async fn add_gold(&self, id: &CharacterId, amount: u64) -> Result<CharacterRecord> {
        self.update(id, |record| {
            record.gold = record.gold.saturating_add(amount);
        })
    }
}
