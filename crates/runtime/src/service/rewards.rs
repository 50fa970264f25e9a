//! Reward granting for kills and chests.

use std::sync::Arc;

use tactics_core::UnitState;

use super::SessionService;
use crate::api::{Result, RewardView};
use crate::ledger::GrantOutcome;
use crate::repository::{LedgerKey, RewardPayload, SessionRecord, TriggerType};

impl SessionService {
    /// Grants experience once per defeated enemy, keyed by its unit id.
    pub(super) async fn grant_kill_rewards(
        &self,
        record: &SessionRecord,
        defeated: &[UnitState],
    ) -> Result<Vec<RewardView>> {
        let mut rewards = Vec::new();
        for enemy in defeated {
            let key = LedgerKey::new(record.id, TriggerType::EnemyDefeated, enemy.id.as_str());
            let characters = Arc::clone(&self.characters);
            let character = record.character.clone();
            let curve = self.config.level_curve.clone();

            let outcome = self
                .ledger
                .grant_once(
                    key,
                    RewardPayload::experience(enemy.experience),
                    move |mut payload| async move {
                        let progress = characters
                            .add_experience(&character, payload.experience, &curve)
                            .await?;
                        payload.total_experience = Some(progress.experience);
                        payload.level = Some(progress.level);
                        Ok(payload)
                    },
                )
                .await?;

            if let GrantOutcome::Granted(payload) = outcome {
                rewards.push(RewardView::new(
                    TriggerType::EnemyDefeated,
                    enemy.id.to_string(),
                    payload,
                ));
            }
        }
        Ok(rewards)
    }

    /// Grants a chest's gold once.
    pub(super) async fn grant_chest_reward(
        &self,
        record: &SessionRecord,
        chest: &str,
        gold: u64,
    ) -> Result<Option<RewardView>> {
        let key = LedgerKey::new(record.id, TriggerType::ChestOpened, chest);
        let characters = Arc::clone(&self.characters);
        let character = record.character.clone();

        let outcome = self
            .ledger
            .grant_once(key, RewardPayload::gold(gold), move |payload| async move {
                characters.add_gold(&character, payload.gold).await?;
                Ok(payload)
            })
            .await?;

        Ok(match outcome {
            GrantOutcome::Granted(payload) => Some(RewardView::new(
                TriggerType::ChestOpened,
                chest.to_owned(),
                payload,
            )),
            GrantOutcome::AlreadyGranted => None,
        })
    }
}
