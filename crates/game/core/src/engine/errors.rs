//! Error types for the action processing pipeline.

use crate::action::{
    ActionError, ActionTransition, AttackAction, CastAction, EndTurnAction, MoveAction,
    OpenChestAction,
};
use crate::error::{ErrorSeverity, GameError};
use crate::validate::ValidationReport;

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while processing an intent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    #[error("move action failed: {0}")]
    Move(TransitionPhaseError<<MoveAction as ActionTransition>::Error>),

    #[error("attack action failed: {0}")]
    Attack(TransitionPhaseError<<AttackAction as ActionTransition>::Error>),

    #[error("cast action failed: {0}")]
    Cast(TransitionPhaseError<<CastAction as ActionTransition>::Error>),

    #[error("end turn action failed: {0}")]
    EndTurn(TransitionPhaseError<<EndTurnAction as ActionTransition>::Error>),

    #[error("open chest action failed: {0}")]
    OpenChest(TransitionPhaseError<<OpenChestAction as ActionTransition>::Error>),

    /// The resulting state broke a transition invariant. Indicates a rules bug.
    #[error("transition invariant violated: {} issue(s)", .0.issues.len())]
    InvariantViolation(ValidationReport),
}

impl ExecuteError {
    /// The action-level rejection reason, if this error carries one.
    pub fn action_error(&self) -> Option<&ActionError> {
        match self {
            ExecuteError::Move(e)
            | ExecuteError::Attack(e)
            | ExecuteError::Cast(e)
            | ExecuteError::EndTurn(e)
            | ExecuteError::OpenChest(e) => Some(&e.error),
            ExecuteError::InvariantViolation(_) => None,
        }
    }

    pub fn phase(&self) -> Option<TransitionPhase> {
        match self {
            ExecuteError::Move(e)
            | ExecuteError::Attack(e)
            | ExecuteError::Cast(e)
            | ExecuteError::EndTurn(e)
            | ExecuteError::OpenChest(e) => Some(e.phase),
            ExecuteError::InvariantViolation(_) => Some(TransitionPhase::PostValidate),
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self.action_error() {
            Some(error) => error.severity(),
            None => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self.action_error() {
            Some(error) => error.error_code(),
            None => "ENGINE_INVARIANT_VIOLATION",
        }
    }
}
