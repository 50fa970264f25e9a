//! Unified error taxonomy surfaced by the session service.
//!
//! Every failure maps to an HTTP status and a machine-readable [`ErrorBody`].
//! Ownership mismatches and missing sessions are indistinguishable here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tactics_core::{ActionError, BattleError, GameError, ValidationReport};

use super::wire::IssueView;
use crate::ledger::LedgerError;
use crate::repository::RepositoryError;
use crate::store::StoreError;
use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("{0} not found")]
    NotFound(String),

    #[error("state validation failed")]
    ValidationFailed(ValidationReport),

    #[error("action rejected: {0}")]
    Rejected(#[source] ActionError),

    #[error(transparent)]
    Transport(TransportError),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("combat log batch of {given} exceeds limit {limit}")]
    LogBatchTooLarge { given: usize, limit: usize },

    #[error("combat log is full ({capacity} entries)")]
    LogFull { capacity: usize },

    #[error("session is {0}")]
    SessionClosed(tactics_core::SessionStatus),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage failure")]
    Storage(#[source] RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub const fn status_code(&self) -> u16 {
        match self {
            ServiceError::AuthenticationRequired => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::ValidationFailed(_)
            | ServiceError::Rejected(_)
            | ServiceError::MalformedPayload(_)
            | ServiceError::LogBatchTooLarge { .. } => 400,
            ServiceError::Transport(err) => {
                if err.is_internal() {
                    500
                } else {
                    400
                }
            }
            ServiceError::SessionClosed(_)
            | ServiceError::Conflict(_)
            | ServiceError::LogFull { .. } => 409,
            ServiceError::Storage(_) | ServiceError::Internal(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::ValidationFailed(_) => "VALIDATION_FAILED",
            ServiceError::Rejected(err) => err.error_code(),
            ServiceError::Transport(err) => err.code(),
            ServiceError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            ServiceError::LogBatchTooLarge { .. } => "LOG_BATCH_TOO_LARGE",
            ServiceError::LogFull { .. } => "LOG_FULL",
            ServiceError::SessionClosed(_) => "SESSION_CLOSED",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Storage(_) => "STORAGE_FAILURE",
            ServiceError::Internal(_) => "INTERNAL",
        }
    }

    /// Client-facing body. Internal details are not leaked for 5xx.
    pub fn body(&self) -> ErrorBody {
        let message = if self.status_code() >= 500 {
            "internal server error".to_owned()
        } else {
            self.to_string()
        };
        let errors = match self {
            ServiceError::ValidationFailed(report) => {
                report.issues.iter().map(IssueView::from).collect()
            }
            _ => Vec::new(),
        };
        let retryable = match self {
            ServiceError::Rejected(reason) => reason.severity().is_recoverable(),
            _ => false,
        };
        ErrorBody {
            code: self.code().to_owned(),
            message,
            errors,
            retryable,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) | StoreError::NotOwner { .. } => {
                ServiceError::NotFound("session".into())
            }
            StoreError::Repository(err) => err.into(),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::LogFull { capacity, .. } => ServiceError::LogFull { capacity },
            other => ServiceError::Storage(other),
        }
    }
}

impl From<TransportError> for ServiceError {
    fn from(error: TransportError) -> Self {
        ServiceError::Transport(error)
    }
}

impl From<LedgerError> for ServiceError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Repository(err) | LedgerError::GrantFailed { source: err, .. } => {
                ServiceError::Storage(err)
            }
        }
    }
}

impl From<BattleError> for ServiceError {
    fn from(error: BattleError) -> Self {
        match error {
            BattleError::UnknownEnemy(id) => ServiceError::NotFound(format!("enemy {id}")),
            BattleError::NoEnemies => ServiceError::Conflict("no enemies to engage".into()),
        }
    }
}

/// Machine-readable error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IssueView>,
    /// Set when resyncing the state and resending can succeed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}
