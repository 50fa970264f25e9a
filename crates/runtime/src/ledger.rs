//! Idempotent reward granting.
//!
//! The conditional insert is the only atomic operation in the runtime. The
//! grant closure runs only for the caller whose insert succeeded, so a
//! reward is applied at most once per `(session, trigger_type, trigger_key)`
//! no matter how many requests race on it.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::repository::{LedgerEntry, LedgerKey, RepositoryError, RewardLedgerRepository, RewardPayload};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The ledger row exists but applying the reward failed.
    #[error("reward {trigger_key} recorded but grant failed: {source}")]
    GrantFailed {
        trigger_key: String,
        #[source]
        source: RepositoryError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
    /// This caller inserted the row; carries the annotated payload.
    Granted(RewardPayload),
    /// Another caller already granted this trigger. Not an error.
    AlreadyGranted,
}

impl GrantOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, GrantOutcome::Granted(_))
    }
}

#[derive(Clone)]
pub struct RewardLedger {
    repo: Arc<dyn RewardLedgerRepository>,
}

impl RewardLedger {
    pub fn new(repo: Arc<dyn RewardLedgerRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn RewardLedgerRepository> {
        &self.repo
    }

    /// Records `key` and, if this call inserted it, runs `grant`.
    ///
    /// `grant` receives the payload and returns it annotated with the
    /// progress it produced, which is written back to the row.
    pub async fn grant_once<F, Fut>(
        &self,
        key: LedgerKey,
        payload: RewardPayload,
        grant: F,
    ) -> Result<GrantOutcome, LedgerError>
    where
        F: FnOnce(RewardPayload) -> Fut,
        Fut: Future<Output = Result<RewardPayload, RepositoryError>>,
    {
        let entry = LedgerEntry {
            key: key.clone(),
            payload: payload.clone(),
            granted_at: Utc::now(),
        };

        if !self.repo.insert_if_absent(entry).await? {
            debug!(
                session = %key.session,
                trigger = %key.trigger_type,
                key = %key.trigger_key,
                "reward already granted"
            );
            return Ok(GrantOutcome::AlreadyGranted);
        }

        let annotated = match grant(payload).await {
            Ok(annotated) => annotated,
            Err(source) => {
                error!(
                    session = %key.session,
                    key = %key.trigger_key,
                    error = %source,
                    "reward grant failed after ledger insert"
                );
                return Err(LedgerError::GrantFailed {
                    trigger_key: key.trigger_key,
                    source,
                });
            }
        };

        self.repo.annotate(&key, annotated.clone()).await?;
        info!(
            session = %key.session,
            trigger = %key.trigger_type,
            key = %key.trigger_key,
            experience = annotated.experience,
            gold = annotated.gold,
            "reward granted"
        );
        Ok(GrantOutcome::Granted(annotated))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::repository::{InMemoryRewardLedger, TriggerType};
    use crate::types::SessionId;

    fn key() -> LedgerKey {
        LedgerKey::new(SessionId(1), TriggerType::EnemyDefeated, "e1")
    }

    #[tokio::test]
    async fn second_grant_is_already_granted() {
        let ledger = RewardLedger::new(Arc::new(InMemoryRewardLedger::new()));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            ledger
                .grant_once(key(), RewardPayload::experience(10), |payload| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(payload) }
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.repository().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn annotation_is_written_back() {
        let ledger = RewardLedger::new(Arc::new(InMemoryRewardLedger::new()));
        let outcome = ledger
            .grant_once(key(), RewardPayload::experience(10), |mut payload| async move {
                payload.total_experience = Some(10);
                payload.level = Some(1);
                Ok(payload)
            })
            .await
            .unwrap();

        assert!(outcome.is_granted());
        let stored = ledger.repository().find(&key()).await.unwrap().unwrap();
        assert_eq!(stored.payload.level, Some(1));
        assert_eq!(stored.payload.total_experience, Some(10));
    }

    #[tokio::test]
    async fn failed_grant_keeps_the_row() {
        let ledger = RewardLedger::new(Arc::new(InMemoryRewardLedger::new()));
        let err = ledger
            .grant_once(key(), RewardPayload::experience(10), |_| async {
                Err(RepositoryError::Missing("character".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::GrantFailed { .. }));

        let retry = ledger
            .grant_once(key(), RewardPayload::experience(10), |p| async move { Ok(p) })
            .await
            .unwrap();
        assert_eq!(retry, GrantOutcome::AlreadyGranted);
    }
}
