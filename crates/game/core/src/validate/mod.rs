//! State-transition validation.
//!
//! Checks a candidate state against the previous authoritative one and
//! returns structured, enumerable issues. Which kinds reject a request and
//! which are clamped is decided by a [`ValidationPolicy`], so the same checks
//! serve client submissions, processor post-conditions and completion gates.
mod checks;
mod completion;
mod error;
mod merge;
mod policy;
mod proposal;

pub use checks::{validate_proposal, validate_transition};
pub use completion::check_completion;
pub use error::{IssueSeverity, ValidationError, ValidationErrorKind};
pub use merge::{MergeOutcome, merge_proposal};
pub use policy::{ValidationPolicy, ValidationReport};
pub use proposal::{StateProposal, UnitPatch};
