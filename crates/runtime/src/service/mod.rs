//! Session service: the request-level orchestration.
//!
//! Every operation follows the same flow: authenticate the caller, load the
//! session through the ownership-checked store, open the transport envelope,
//! validate and process with `tactics-core`, grant rewards through the
//! ledger, then persist. Any failure before persistence leaves storage
//! untouched. One call per request; nothing runs in the background.

mod battle;
mod explore;
mod rewards;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use tactics_core::{
    GameEnv, PcgRng, RngOracle, SessionConfig, SessionState, SessionStatus, StaticTables,
    TablesOracle,
};

use crate::api::{
    CompletionResponse, Result, ServiceError, SessionKeyResponse, StartSessionResponse,
    WIRE_SCHEMA_VERSION,
};
use crate::config::RuntimeConfig;
use crate::ledger::RewardLedger;
use crate::repository::{
    BattleRepository, CharacterRepository, CombatLogRepository, InMemoryBattleRepository,
    InMemoryCharacterRepository, InMemoryCombatLogRepository, InMemoryRewardLedger,
    InMemorySessionRepository, NewSession, RewardLedgerRepository, SessionRecord,
    SessionRepository,
};
use crate::store::SessionStore;
use crate::transport::{Envelope, TransportLayer};
use crate::types::{CharacterId, OwnerId, RequestContext, SessionUid};

pub struct SessionService {
    config: RuntimeConfig,
    store: SessionStore,
    battles: Arc<dyn BattleRepository>,
    characters: Arc<dyn CharacterRepository>,
    ledger: RewardLedger,
    transport: TransportLayer,
    tables: Arc<dyn TablesOracle>,
    rng: Arc<dyn RngOracle>,
}

impl SessionService {
    pub fn builder() -> SessionServiceBuilder {
        SessionServiceBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn transport(&self) -> &TransportLayer {
        &self.transport
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    pub fn characters(&self) -> &Arc<dyn CharacterRepository> {
        &self.characters
    }

    /// Starts a quest: snapshots `config` and spawns the initial state.
    pub async fn start_session(
        &self,
        ctx: &RequestContext,
        character: CharacterId,
        config: SessionConfig,
    ) -> Result<StartSessionResponse> {
        let owner = require_owner(ctx)?;
        self.characters.ensure(&character, owner).await?;

        let seed = rand::random::<u64>();
        let state = SessionState::from_config(&config, seed);
        let record = self
            .store
            .sessions()
            .insert(NewSession {
                uid: SessionUid::generate(),
                owner: owner.clone(),
                character,
                config,
                state,
            })
            .await?;

        info!(session = %record.uid, owner = %owner, "session started");
        Ok(StartSessionResponse {
            session: record.uid.to_string(),
        })
    }

    /// Issues (or rotates) the transport key for a session.
    pub async fn issue_session_key(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
    ) -> Result<SessionKeyResponse> {
        let record = self.load_active(ctx, uid).await?;
        let material = self.transport.issue_session_key(&record.uid)?;
        Ok(SessionKeyResponse {
            token: material.token.to_string(),
            key: material.key.to_base64(),
        })
    }

    /// Marks the session abandoned and drops its key material.
    pub async fn abandon_session(
        &self,
        ctx: &RequestContext,
        uid: &SessionUid,
    ) -> Result<CompletionResponse> {
        let mut record = self.load_active(ctx, uid).await?;

        if let Some(battle) = self.battles.active_for(uid).await? {
            self.battles.remove(&battle.uid).await?;
        }
        record.status = SessionStatus::Abandoned;
        self.store.save(&record).await?;
        self.transport.revoke(uid)?;

        info!(session = %uid, "session abandoned");
        Ok(CompletionResponse {
            schema_version: WIRE_SCHEMA_VERSION,
            success: true,
            status: record.status,
        })
    }

    // ===== shared helpers =====

    async fn load(&self, ctx: &RequestContext, uid: &SessionUid) -> Result<SessionRecord> {
        let owner = require_owner(ctx)?;
        Ok(self.store.load(uid, owner).await?)
    }

    /// Loads a session that still accepts mutation.
    async fn load_active(&self, ctx: &RequestContext, uid: &SessionUid) -> Result<SessionRecord> {
        let record = self.load(ctx, uid).await?;
        if record.status.is_terminal() {
            return Err(ServiceError::SessionClosed(record.status));
        }
        Ok(record)
    }

    fn env<'a>(&'a self, config: &'a SessionConfig) -> GameEnv<'a> {
        GameEnv::new(
            config,
            self.tables.as_ref(),
            self.rng.as_ref(),
            &self.config.policy,
        )
    }

    /// Opens a transport envelope and decodes the inner document.
    fn open<T: DeserializeOwned>(&self, uid: &SessionUid, body: Envelope) -> Result<T> {
        let value = self.transport.open(uid, body)?;
        serde_json::from_value(value).map_err(|e| ServiceError::MalformedPayload(e.to_string()))
    }
}

fn require_owner(ctx: &RequestContext) -> Result<&OwnerId> {
    ctx.owner.as_ref().ok_or(ServiceError::AuthenticationRequired)
}

/// Builder for [`SessionService`]. Unset collaborators default to the
/// in-memory repositories, empty skill tables and the PCG RNG.
pub struct SessionServiceBuilder {
    config: RuntimeConfig,
    sessions: Option<Arc<dyn SessionRepository>>,
    logs: Option<Arc<dyn CombatLogRepository>>,
    battles: Option<Arc<dyn BattleRepository>>,
    ledger: Option<Arc<dyn RewardLedgerRepository>>,
    characters: Option<Arc<dyn CharacterRepository>>,
    tables: Option<Arc<dyn TablesOracle>>,
    rng: Option<Arc<dyn RngOracle>>,
}

impl SessionServiceBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            sessions: None,
            logs: None,
            battles: None,
            ledger: None,
            characters: None,
            tables: None,
            rng: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sessions(mut self, repo: Arc<dyn SessionRepository>) -> Self {
        self.sessions = Some(repo);
        self
    }

    pub fn logs(mut self, repo: Arc<dyn CombatLogRepository>) -> Self {
        self.logs = Some(repo);
        self
    }

    pub fn battles(mut self, repo: Arc<dyn BattleRepository>) -> Self {
        self.battles = Some(repo);
        self
    }

    pub fn ledger(mut self, repo: Arc<dyn RewardLedgerRepository>) -> Self {
        self.ledger = Some(repo);
        self
    }

    pub fn characters(mut self, repo: Arc<dyn CharacterRepository>) -> Self {
        self.characters = Some(repo);
        self
    }

    /// Skill and balance tables
    pub fn tables(mut self, tables: Arc<dyn TablesOracle>) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn build(self) -> SessionService {
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(InMemorySessionRepository::new()));
        let logs = self
            .logs
            .unwrap_or_else(|| {
                Arc::new(InMemoryCombatLogRepository::with_capacity(
                    self.config.log_capacity,
                ))
            });

        SessionService {
            transport: TransportLayer::new(self.config.transport_mode),
            config: self.config,
            store: SessionStore::new(sessions, logs),
            battles: self
                .battles
                .unwrap_or_else(|| Arc::new(InMemoryBattleRepository::new())),
            characters: self
                .characters
                .unwrap_or_else(|| Arc::new(InMemoryCharacterRepository::new())),
            ledger: RewardLedger::new(
                self.ledger
                    .unwrap_or_else(|| Arc::new(InMemoryRewardLedger::new())),
            ),
            tables: self
                .tables
                .unwrap_or_else(|| Arc::new(StaticTables::default())),
            rng: self.rng.unwrap_or_else(|| Arc::new(PcgRng)),
        }
    }
}
