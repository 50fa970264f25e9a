//! Public runtime API surface.
//!
//! Gathers the error taxonomy and the versioned wire schema exposed to
//! whatever HTTP layer embeds the runtime.

pub mod errors;
pub mod wire;

pub use errors::{ErrorBody, Result, ServiceError};
pub use wire::{
    ActionRequest, ActionResponse, ActionResultView, BattleCompleteResponse, BattleSaveResponse,
    BattleStarted, BattleStateResponse, BattleSummary, ChestView, CompletionResponse,
    DialogueView, ExploreSnapshot, IssueView, MapView, RewardView, SessionKeyResponse,
    StartSessionResponse, StateSubmission, StatusView, SubmissionResponse, SubmittedUnit,
    TargetView, UnitView, WIRE_SCHEMA_VERSION,
};
