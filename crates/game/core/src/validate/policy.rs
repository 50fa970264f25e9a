use std::collections::BTreeSet;

use super::error::{IssueSeverity, ValidationError, ValidationErrorKind};
use crate::state::UnitId;

/// Decides which validation kinds reject a request outright.
///
/// Kinds not in `hard_reject` are soft: logged, then clamped or dropped by the
/// merge. The tolerance band for resource overflow is
/// `(max, max * excessive_resource_factor]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationPolicy {
    pub excessive_resource_factor: f64,
    pub hard_reject: BTreeSet<ValidationErrorKind>,
}

impl ValidationPolicy {
    pub const DEFAULT_EXCESSIVE_RESOURCE_FACTOR: f64 = 2.0;

    pub fn default_hard_reject() -> BTreeSet<ValidationErrorKind> {
        [
            ValidationErrorKind::NegativeResource,
            ValidationErrorKind::ExcessiveResource,
            ValidationErrorKind::TurnRegression,
            ValidationErrorKind::InvalidPhaseTransition,
            ValidationErrorKind::TurnSkipped,
        ]
        .into_iter()
        .collect()
    }

    /// Policy with a custom tolerance factor. Factors below 1.0 are raised to 1.0.
    pub fn with_factor(factor: f64) -> Self {
        Self {
            excessive_resource_factor: factor.max(1.0),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_hard_reject(mut self, kinds: impl IntoIterator<Item = ValidationErrorKind>) -> Self {
        self.hard_reject = kinds.into_iter().collect();
        self
    }

    pub fn severity_of(&self, kind: ValidationErrorKind) -> IssueSeverity {
        if self.hard_reject.contains(&kind) {
            IssueSeverity::Hard
        } else {
            IssueSeverity::Soft
        }
    }

    /// Largest value accepted (before clamping) for a pool of size `max`.
    pub fn tolerance(&self, max: u32) -> i64 {
        let limit = f64::from(max) * self.excessive_resource_factor.max(1.0);
        limit.floor() as i64
    }

    /// Builds an issue classified under this policy.
    pub fn issue(
        &self,
        kind: ValidationErrorKind,
        unit: Option<&UnitId>,
        message: impl Into<String>,
    ) -> ValidationError {
        ValidationError {
            kind,
            severity: self.severity_of(kind),
            unit: unit.cloned(),
            message: message.into(),
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            excessive_resource_factor: Self::DEFAULT_EXCESSIVE_RESOURCE_FACTOR,
            hard_reject: Self::default_hard_reject(),
        }
    }
}

/// Every issue found in one transition, hard and soft.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationReport {
    pub issues: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationError) {
        self.issues.push(issue);
    }

    /// True when no hard issue was recorded.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationError::is_hard)
    }

    pub fn hard(&self) -> impl Iterator<Item = &ValidationError> {
        self.issues.iter().filter(|issue| issue.is_hard())
    }

    pub fn soft(&self) -> impl Iterator<Item = &ValidationError> {
        self.issues.iter().filter(|issue| !issue.is_hard())
    }

    pub fn contains(&self, kind: ValidationErrorKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }
}
