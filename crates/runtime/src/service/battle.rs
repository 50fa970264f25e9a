//! Battle operations: a nested sub-session reconciled into its parent.

use chrono::Utc;
use tracing::{info, warn};

use tactics_core::{SessionStatus, UnitId, merge_proposal, reconcile, start_battle_state};

use super::SessionService;
use super::explore::check_schema;
use crate::api::{
    BattleCompleteResponse, BattleSaveResponse, BattleStarted, BattleStateResponse,
    BattleSummary, ExploreSnapshot, IssueView, Result, ServiceError, StateSubmission,
};
use crate::repository::{BattleRecord, SessionRecord};
use crate::transport::Envelope;
use crate::types::{BattleUid, RequestContext, SessionUid};

impl SessionService {
    /// `POST /battle/start`: copies the engaged enemies into a new battle.
    ///
    /// `engaged` of `None` engages every living enemy.
    pub async fn start_battle(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
        engaged: Option<Vec<UnitId>>,
    ) -> Result<BattleStarted> {
        let record = self.load_active(ctx, uid).await?;
        if let Some(active) = self.battles.active_for(uid).await? {
            return Err(ServiceError::Conflict(format!(
                "battle {} is already active",
                active.uid
            )));
        }

        let state = start_battle_state(&record.state, engaged.as_deref())?;
        let battle = BattleRecord {
            uid: BattleUid::generate(),
            session: record.uid.clone(),
            status: SessionStatus::Active,
            engaged: state.enemies.iter().map(|enemy| enemy.id.clone()).collect(),
            state,
            created_at: Utc::now(),
        };
        let battle_uid = battle.uid.clone();
        self.battles.insert(battle).await?;

        info!(session = %uid, battle = %battle_uid, "battle started");
        Ok(BattleStarted {
            battle_uid: battle_uid.to_string(),
        })
    }

    /// `GET /battle/state`
    pub async fn battle_state(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
        battle: &BattleUid,
    ) -> Result<BattleStateResponse> {
        let record = self.load(ctx, uid).await?;
        let battle = self.find_battle(&record, battle).await?;

        Ok(BattleStateResponse {
            battle: BattleSummary {
                uid: battle.uid.to_string(),
                status: battle.status,
            },
            state: ExploreSnapshot::build(
                record.uid.as_str(),
                battle.status,
                &record.config,
                &battle.state,
                Vec::new(),
            ),
        })
    }

    /// `GET /battle/active`
    pub async fn active_battle(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
    ) -> Result<BattleStarted> {
        let record = self.load(ctx, uid).await?;
        let battle = self
            .battles
            .active_for(&record.uid)
            .await?
            .ok_or_else(|| ServiceError::NotFound("battle".into()))?;
        Ok(BattleStarted {
            battle_uid: battle.uid.to_string(),
        })
    }

    /// `POST /battle/state`: merges a client-computed battle state.
    pub async fn save_battle_state(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
        battle: &BattleUid,
        body: Envelope,
    ) -> Result<BattleSaveResponse> {
        let record = self.load_active(ctx, uid).await?;
        let battle = self.find_battle(&record, battle).await?;
        let submission: StateSubmission = self.open(uid, body)?;
        check_schema(submission.schema_version)?;

        let (proposal, logs) = submission.into_proposal();
        if logs.len() > self.config.log_batch_limit {
            return Err(ServiceError::LogBatchTooLarge {
                given: logs.len(),
                limit: self.config.log_batch_limit,
            });
        }

        let outcome = merge_proposal(&battle.state, &proposal, &record.config, &self.config.policy)
            .map_err(|report| {
                info!(session = %uid, battle = %battle.uid, "battle state rejected");
                ServiceError::ValidationFailed(report)
            })?;
        for issue in outcome.report.soft() {
            warn!(battle = %battle.uid, kind = %issue.kind, "battle state adjusted");
        }

        self.store.append_log(uid, logs).await?;
        self.battles.update_state(&battle.uid, &outcome.state).await?;

        Ok(BattleSaveResponse {
            success: true,
            warnings: outcome.report.issues.iter().map(IssueView::from).collect(),
        })
    }

    /// `POST /battle/complete`: reconciles the battle into its session.
    ///
    /// Unit resources sync by id, defeated engaged enemies leave the map and
    /// earn their rewards, and the session phase resets to the player.
    pub async fn complete_battle(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
        battle: &BattleUid,
    ) -> Result<BattleCompleteResponse> {
        let mut record = self.load_active(ctx, uid).await?;
        let battle = self.find_battle(&record, battle).await?;

        let reconciliation = reconcile(&record.state, &battle.state, &battle.engaged);
        let rewards = self
            .grant_kill_rewards(&record, &reconciliation.defeated)
            .await?;

        record.state = reconciliation.state;
        self.store.save(&record).await?;
        self.battles.remove(&battle.uid).await?;

        info!(
            session = %uid,
            battle = %battle.uid,
            defeated = reconciliation.defeated.len(),
            "battle completed"
        );
        Ok(BattleCompleteResponse {
            success: true,
            defeated: reconciliation
                .defeated
                .iter()
                .map(|enemy| enemy.id.clone())
                .collect(),
            rewards,
            turn: record.state.turn.turn,
            phase: record.state.turn.phase,
        })
    }

    async fn find_battle(&self, record: &SessionRecord, battle: &BattleUid) -> Result<BattleRecord> {
        self.battles
            .find(&record.uid, battle)
            .await?
            .ok_or_else(|| ServiceError::NotFound("battle".into()))
    }
}
