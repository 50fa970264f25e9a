//! Action domain: typed intents and their transitions.
//!
//! Each intent variant wraps a concrete transition (`MoveAction`,
//! `AttackAction`, ...) implementing [`ActionTransition`]. The engine drives
//! every transition through the same `pre_validate -> apply -> post_validate`
//! pipeline.
//!
//! # Module Structure
//!
//! - `error`: [`ActionError`], one variant per rejection reason
//! - `movement`: unit movement and dialogue triggers
//! - `combat`: basic attacks and skill casts
//! - `turn`: end-turn and start-of-phase upkeep
//! - `chest`: chest opening
mod chest;
mod combat;
mod error;
mod movement;
mod transition;
mod turn;

pub use chest::{ChestOutcome, OpenChestAction};
pub use combat::{AttackAction, CastAction};
pub use error::ActionError;
pub use movement::{MoveAction, MoveOutcome};
pub use transition::ActionTransition;
pub use turn::{EndTurnAction, TurnOutcome, begin_phase, end_phase};

pub(crate) use transition::ready_actor;

use crate::combat::CombatResolution;
use crate::state::{CombatLogEntry, UnitId};

/// A typed player or enemy intent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Intent {
    Move(MoveAction),
    Attack(AttackAction),
    Cast(CastAction),
    EndTurn(EndTurnAction),
    OpenChest(OpenChestAction),
}

impl Intent {
    /// Unit performing the intent; `None` for end-turn.
    pub fn actor(&self) -> Option<&UnitId> {
        match self {
            Intent::Move(action) => Some(&action.actor),
            Intent::Attack(action) => Some(&action.actor),
            Intent::Cast(action) => Some(&action.actor),
            Intent::OpenChest(action) => Some(&action.actor),
            Intent::EndTurn(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Move(_) => "move",
            Intent::Attack(_) => "attack",
            Intent::Cast(_) => "cast",
            Intent::EndTurn(_) => "end_turn",
            Intent::OpenChest(_) => "open_chest",
        }
    }
}

/// Action-specific outcome returned by the processor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ActionResult {
    Move(MoveOutcome),
    Attack(CombatResolution),
    Cast(CombatResolution),
    EndTurn(TurnOutcome),
    OpenChest(ChestOutcome),
}

impl ActionResult {
    /// Combat log entries produced by the action, in order.
    pub fn log_entries(&self) -> &[CombatLogEntry] {
        match self {
            ActionResult::Move(outcome) => &outcome.log_entries,
            ActionResult::Attack(resolution) | ActionResult::Cast(resolution) => {
                &resolution.log_entries
            }
            ActionResult::EndTurn(outcome) => &outcome.log_entries,
            ActionResult::OpenChest(outcome) => &outcome.log_entries,
        }
    }
}
