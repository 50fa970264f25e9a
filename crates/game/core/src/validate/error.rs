//! Structured validation errors.
//!
//! Every violated invariant becomes one [`ValidationError`] with an
//! enumerable [`ValidationErrorKind`], never a single opaque message, so the
//! caller can tell hard rejections from issues that were clamped or dropped.

use crate::error::{ErrorSeverity, GameError};
use crate::state::UnitId;

/// Enumerable reasons a transition may be flagged.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ValidationErrorKind {
    /// HP or SP below zero.
    NegativeResource,
    /// HP or SP above `max * excessive_resource_factor`; treated as tampering.
    ExcessiveResource,
    /// HP or SP above max but within tolerance; clamped to max.
    ResourceOverflow,
    /// A defeated unit came back with HP; kept at zero.
    Resurrection,
    /// Turn counter went backwards.
    TurnRegression,
    /// Phase moved against the `player -> enemy -> player` cycle.
    InvalidPhaseTransition,
    /// More than one phase step in a single transition.
    TurnSkipped,
    /// A unit id that never existed in the previous state; dropped.
    UnknownUnit,
    /// Removal of an enemy that was already defeated; no-op.
    StaleRemoval,
    /// Submitted position is off the map or on a wall; previous position kept.
    InvalidPosition,
    /// Dialogue id not present in the session config; dropped.
    UnknownDialogue,
    /// Completion requested while an enemy still has HP.
    EnemiesAlive,
    /// Completion requested while the player is not on the portal.
    NotOnPortal,
}

impl ValidationErrorKind {
    /// Stable, upper-case code sent to clients.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NegativeResource => "VALIDATION_NEGATIVE_RESOURCE",
            Self::ExcessiveResource => "VALIDATION_EXCESSIVE_RESOURCE",
            Self::ResourceOverflow => "VALIDATION_RESOURCE_OVERFLOW",
            Self::Resurrection => "VALIDATION_RESURRECTION",
            Self::TurnRegression => "VALIDATION_TURN_REGRESSION",
            Self::InvalidPhaseTransition => "VALIDATION_INVALID_PHASE_TRANSITION",
            Self::TurnSkipped => "VALIDATION_TURN_SKIPPED",
            Self::UnknownUnit => "VALIDATION_UNKNOWN_UNIT",
            Self::StaleRemoval => "VALIDATION_STALE_REMOVAL",
            Self::InvalidPosition => "VALIDATION_INVALID_POSITION",
            Self::UnknownDialogue => "VALIDATION_UNKNOWN_DIALOGUE",
            Self::EnemiesAlive => "VALIDATION_ENEMIES_ALIVE",
            Self::NotOnPortal => "VALIDATION_NOT_ON_PORTAL",
        }
    }
}

/// Whether an issue rejects the whole transition or is logged and corrected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum IssueSeverity {
    /// Rejects the whole request.
    Hard,
    /// Logged and clamped, dropped or ignored.
    Soft,
}

/// One violated invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{kind}: {message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub severity: IssueSeverity,
    pub unit: Option<UnitId>,
    pub message: String,
}

impl ValidationError {
    pub fn hard(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: IssueSeverity::Hard,
            unit: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn for_unit(mut self, unit: &UnitId) -> Self {
        self.unit = Some(unit.clone());
        self
    }

    pub fn is_hard(&self) -> bool {
        self.severity == IssueSeverity::Hard
    }
}

impl GameError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        match self.kind {
            ValidationErrorKind::TurnRegression
            | ValidationErrorKind::InvalidPhaseTransition
            | ValidationErrorKind::TurnSkipped => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        self.kind.code()
    }
}
