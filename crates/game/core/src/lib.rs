//! Deterministic session rules for the tactics game.
//!
//! `tactics-core` defines the canonical state, the combat calculator, the
//! state-transition validator and the action processor. It performs no I/O;
//! the runtime crate wraps these pure APIs with persistence, transport and
//! reward bookkeeping. All gameplay mutation flows through
//! [`engine::ActionProcessor`] or the whitelisted [`validate::merge_proposal`].
pub mod action;
pub mod battle;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;
pub mod validate;

pub use action::{
    ActionError, ActionResult, ActionTransition, AttackAction, CastAction, ChestOutcome,
    EndTurnAction, Intent, MoveAction, MoveOutcome, OpenChestAction, TurnOutcome,
};
pub use battle::{BattleError, Reconciliation, reconcile, start_battle_state};
pub use combat::{CombatResolution, TargetOutcome};
pub use config::{ChestSpec, DialogueTrigger, GameConfig, MapLayout, SessionConfig, UnitTemplate};
pub use engine::{ActionProcessor, ExecuteError, ProcessOutcome, TransitionPhase};
pub use env::{
    CombatParams, GameEnv, PcgRng, RngOracle, SkillDefinition, SkillKind, SkillTargeting,
    StaticTables, StatusEffectSpec, TablesOracle,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    CombatLog, CombatLogEntry, LogParams, Phase, Position, SessionState, SessionStatus, Side,
    StatusEffect, StatusEffectKind, StatusEffects, TurnState, UnitId, UnitState, newly_defeated,
};
pub use validate::{
    IssueSeverity, MergeOutcome, StateProposal, UnitPatch, ValidationError, ValidationErrorKind,
    ValidationPolicy, ValidationReport, check_completion, merge_proposal, validate_proposal,
    validate_transition,
};
