//! Action execution errors.
//!
//! Every intent rejected by the processor maps to exactly one variant here.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{Phase, Position, UnitId};

// ============================================================================
// Action Execution Errors
// ============================================================================

/// Errors that can occur while validating or applying an intent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    /// Actor not found in session state.
    #[error("Actor {0} not found")]
    ActorNotFound(UnitId),

    /// Actor is defeated (HP = 0).
    #[error("Actor {0} is defeated")]
    ActorDead(UnitId),

    /// Actor's side does not own the current phase.
    #[error("Actor {actor} cannot act during the {phase} phase")]
    NotPhaseOwner { actor: UnitId, phase: Phase },

    /// Actor already consumed its action this phase.
    #[error("Actor {0} has already acted this phase")]
    AlreadyActed(UnitId),

    /// Actor already moved this phase.
    #[error("Actor {0} has already moved this phase")]
    AlreadyMoved(UnitId),

    /// Actor is stunned or frozen.
    #[error("Actor {0} is incapacitated")]
    ActorIncapacitated(UnitId),

    /// Target not found in session state.
    #[error("Target {0} not found")]
    TargetNotFound(UnitId),

    /// Target is on the wrong side or already defeated.
    #[error("Invalid target {0}")]
    InvalidTarget(UnitId),

    /// Target or destination is beyond reach.
    #[error("Out of range: distance {distance}, reach {reach}")]
    OutOfRange { distance: u32, reach: u32 },

    /// Position is outside the map.
    #[error("Position {0} out of bounds")]
    OutOfBounds(Position),

    /// Position is a wall.
    #[error("Position {0} is blocked")]
    Blocked(Position),

    /// Position is held by another living unit.
    #[error("Position {0} is occupied")]
    Occupied(Position),

    /// Destination equals the current position.
    #[error("Unit is already at {0}")]
    NoMovement(Position),

    /// Skill id not present in the skill table.
    #[error("Skill {0} not found")]
    SkillNotFound(String),

    /// Not enough SP to pay the skill cost.
    #[error("Insufficient SP: need {required}, have {available}")]
    InsufficientSp { required: u32, available: u32 },

    /// Skill invoked with no targets.
    #[error("Skill requires at least one target")]
    NoTargets,

    /// Skill invoked with more targets than it allows.
    #[error("Too many targets: {given} (max {max})")]
    TooManyTargets { given: usize, max: usize },

    /// The same unit was targeted twice.
    #[error("Target {0} listed more than once")]
    DuplicateTarget(UnitId),

    /// End-turn for a turn/phase that is no longer current.
    #[error("Stale turn: expected ({expected_turn}, {expected_phase}), got ({turn}, {phase})")]
    StaleTurn {
        expected_turn: u32,
        expected_phase: Phase,
        turn: u32,
        phase: Phase,
    },

    /// Chest id not present in the session config.
    #[error("Chest {0} not found")]
    ChestNotFound(String),

    /// Chest was already opened in this session.
    #[error("Chest {0} has already been opened")]
    ChestAlreadyOpened(String),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            ActorNotFound(_) | TargetNotFound(_) | SkillNotFound(_) | ChestNotFound(_) => {
                ErrorSeverity::Validation
            }
            NotPhaseOwner { .. } | AlreadyActed(_) | AlreadyMoved(_) | StaleTurn { .. } => {
                ErrorSeverity::Recoverable
            }
            ActorDead(_) | ActorIncapacitated(_) | ChestAlreadyOpened(_) => {
                ErrorSeverity::Recoverable
            }
            InvalidTarget(_) | OutOfRange { .. } | OutOfBounds(_) => ErrorSeverity::Validation,
            Blocked(_) | Occupied(_) | NoMovement(_) => ErrorSeverity::Validation,
            InsufficientSp { .. } | NoTargets | TooManyTargets { .. } | DuplicateTarget(_) => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            ActorDead(_) => "ACTION_ACTOR_DEAD",
            NotPhaseOwner { .. } => "ACTION_NOT_PHASE_OWNER",
            AlreadyActed(_) => "ACTION_ALREADY_ACTED",
            AlreadyMoved(_) => "ACTION_ALREADY_MOVED",
            ActorIncapacitated(_) => "ACTION_ACTOR_INCAPACITATED",
            TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            InvalidTarget(_) => "ACTION_INVALID_TARGET",
            OutOfRange { .. } => "ACTION_OUT_OF_RANGE",
            OutOfBounds(_) => "ACTION_OUT_OF_BOUNDS",
            Blocked(_) => "ACTION_BLOCKED",
            Occupied(_) => "ACTION_OCCUPIED",
            NoMovement(_) => "ACTION_NO_MOVEMENT",
            SkillNotFound(_) => "ACTION_SKILL_NOT_FOUND",
            InsufficientSp { .. } => "ACTION_INSUFFICIENT_SP",
            NoTargets => "ACTION_NO_TARGETS",
            TooManyTargets { .. } => "ACTION_TOO_MANY_TARGETS",
            DuplicateTarget(_) => "ACTION_DUPLICATE_TARGET",
            StaleTurn { .. } => "ACTION_STALE_TURN",
            ChestNotFound(_) => "ACTION_CHEST_NOT_FOUND",
            ChestAlreadyOpened(_) => "ACTION_CHEST_ALREADY_OPENED",
        }
    }
}
