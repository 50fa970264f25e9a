//! Server-side session runtime for the tactics game.
//!
//! This crate wraps the pure rules in `tactics-core` with everything a
//! request needs: ownership-checked persistence, transport encryption and
//! signing, the exactly-once reward ledger, and a versioned wire schema.
//! Consumers embed [`SessionService`] behind whatever HTTP layer they use.
//!
//! Modules are organized by responsibility:
//! - [`service`] hosts the request orchestration and its builder
//! - [`api`] exposes the error taxonomy and wire types clients see
//! - [`transport`] protects request and response bodies
//! - [`ledger`] grants rewards at most once per trigger
//! - [`repository`] and [`store`] provide persistence adapters
pub mod api;
pub mod config;
pub mod ledger;
pub mod progression;
pub mod repository;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use api::{ErrorBody, Result, ServiceError};
pub use config::RuntimeConfig;
pub use ledger::{GrantOutcome, LedgerError, RewardLedger};
pub use progression::LevelCurve;
pub use repository::{
    BattleRepository, CharacterRepository, CombatLogRepository, RepositoryError,
    RewardLedgerRepository, SessionRepository,
};
pub use service::{SessionService, SessionServiceBuilder};
pub use store::{SessionStore, StoreError};
pub use transport::{Envelope, Outbound, TransportError, TransportLayer, TransportMode};
pub use types::{BattleUid, CharacterId, OwnerId, RequestContext, SessionId, SessionUid};
