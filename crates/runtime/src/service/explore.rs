//! Explore-mode operations: snapshot, state submission, actions, completion.

use tracing::{debug, error, info, warn};

use tactics_core::{
    ActionProcessor, ActionResult, ExecuteError, GameError, SessionStatus, check_completion,
    merge_proposal,
};

use super::SessionService;
use crate::api::{
    ActionRequest, ActionResponse, ActionResultView, CompletionResponse, ExploreSnapshot,
    IssueView, Result, ServiceError, StateSubmission, SubmissionResponse, WIRE_SCHEMA_VERSION,
};
use crate::repository::SessionRecord;
use crate::transport::{Envelope, Outbound};
use crate::types::{RequestContext, SessionUid};

impl SessionService {
    /// Full renderable snapshot, unencrypted.
    pub async fn snapshot(&self, ctx: &RequestContext, uid: &SessionUid) -> Result<ExploreSnapshot> {
        let record = self.load(ctx, uid).await?;
        self.build_snapshot(&record).await
    }

    /// `GET /explore/state`: the snapshot, sealed when the session holds a key.
    pub async fn explore_state(&self, ctx: &RequestContext, uid: &SessionUid) -> Result<Outbound> {
        let snapshot = self.snapshot(ctx, uid).await?;
        let value =
            serde_json::to_value(&snapshot).map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(self.transport.seal(uid, value)?)
    }

    /// `POST /explore/state`: merges a client-computed state.
    ///
    /// Hard validation issues reject the submission before anything is
    /// written. Soft issues are clamped or dropped and reported as warnings.
    pub async fn submit_explore_state(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
        body: Envelope,
    ) -> Result<SubmissionResponse> {
        let mut record = self.load_active(ctx, uid).await?;
        let submission: StateSubmission = self.open(uid, body)?;
        check_schema(submission.schema_version)?;

        let (proposal, logs) = submission.into_proposal();
        if logs.len() > self.config.log_batch_limit {
            return Err(ServiceError::LogBatchTooLarge {
                given: logs.len(),
                limit: self.config.log_batch_limit,
            });
        }

        let outcome = merge_proposal(&record.state, &proposal, &record.config, &self.config.policy)
            .map_err(|report| {
                info!(
                    session = %uid,
                    issues = report.issues.len(),
                    "state submission rejected"
                );
                ServiceError::ValidationFailed(report)
            })?;

        for issue in outcome.report.soft() {
            warn!(session = %uid, kind = %issue.kind, message = %issue.message, "state submission adjusted");
        }
        let warnings = outcome.report.issues.iter().map(IssueView::from).collect();

        // Logs first: a full log fails the request before any reward is granted.
        let appended = self.store.append_log(uid, logs).await?;
        let rewards = self.grant_kill_rewards(&record, &outcome.defeated).await?;

        record.state = outcome.state;
        self.store.save(&record).await?;

        debug!(
            session = %uid,
            turn = record.state.turn.turn,
            phase = %record.state.turn.phase,
            "state submission saved"
        );
        Ok(SubmissionResponse {
            schema_version: WIRE_SCHEMA_VERSION,
            success: true,
            turn: record.state.turn.turn,
            phase: record.state.turn.phase,
            warnings,
            rewards,
            logs_appended: appended.len(),
        })
    }

    /// `POST /explore/action/*`: runs one intent through the processor.
    pub async fn perform_action(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
        body: Envelope,
    ) -> Result<ActionResponse> {
        let mut record = self.load_active(ctx, uid).await?;
        let request: ActionRequest = self.open(uid, body)?;
        let intent = request.into_intent();

        let processor = ActionProcessor::new(self.env(&record.config));
        let outcome = processor
            .process(&record.state, &intent)
            .map_err(|err| rejection(uid, err))?;

        self.store
            .append_log(uid, outcome.log_entries.clone())
            .await?;
        let mut rewards = self.grant_kill_rewards(&record, &outcome.defeated).await?;
        if let ActionResult::OpenChest(chest) = &outcome.result {
            rewards.extend(
                self.grant_chest_reward(&record, &chest.chest, chest.gold)
                    .await?,
            );
        }

        let position = intent
            .actor()
            .and_then(|id| outcome.state.unit(id))
            .map(|unit| unit.position);
        record.state = outcome.state;
        self.store.save(&record).await?;

        debug!(session = %uid, action = intent.as_str(), "action applied");
        Ok(ActionResponse {
            schema_version: WIRE_SCHEMA_VERSION,
            success: true,
            action: intent.as_str().to_owned(),
            position,
            turn: record.state.turn.turn,
            phase: record.state.turn.phase,
            result: ActionResultView::from(&outcome.result),
            logs: outcome.log_entries,
            rewards,
        })
    }

    /// `POST /explore/complete`: finalizes a cleared session.
    pub async fn complete_explore(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
    ) -> Result<CompletionResponse> {
        let mut record = self.load_active(ctx, uid).await?;
        if self.battles.active_for(uid).await?.is_some() {
            return Err(ServiceError::Conflict("a battle is still in progress".into()));
        }

        check_completion(&record.state, &record.config).map_err(ServiceError::ValidationFailed)?;

        record.status = SessionStatus::Completed;
        self.store.save(&record).await?;
        self.transport.revoke(uid)?;

        info!(session = %uid, turn = record.state.turn.turn, "session completed");
        Ok(CompletionResponse {
            schema_version: WIRE_SCHEMA_VERSION,
            success: true,
            status: record.status,
        })
    }

    pub(super) async fn build_snapshot(&self, record: &SessionRecord) -> Result<ExploreSnapshot> {
        let logs = self.store.log(&record.uid).await?;
        Ok(ExploreSnapshot::build(
            record.uid.as_str(),
            record.status,
            &record.config,
            &record.state,
            logs,
        ))
    }
}

pub(super) fn check_schema(version: Option<u32>) -> Result<()> {
    match version {
        Some(version) if version > WIRE_SCHEMA_VERSION => Err(ServiceError::MalformedPayload(
            format!("unsupported schema version {version}"),
        )),
        _ => Ok(()),
    }
}

fn rejection(uid: &SessionUid, err: ExecuteError) -> ServiceError {
    match err.action_error() {
        Some(reason) => {
            info!(
                session = %uid,
                code = reason.error_code(),
                severity = reason.severity().as_str(),
                phase = ?err.phase(),
                "action rejected"
            );
            ServiceError::Rejected(reason.clone())
        }
        None => {
            error!(session = %uid, error = %err, "processor produced an invalid state");
            ServiceError::Internal(err.to_string())
        }
    }
}
