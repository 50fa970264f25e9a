use std::collections::BTreeSet;

use super::{Phase, UnitId};

/// Turn bookkeeping: counter, phase owner and per-phase action tracking.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Turn counter. Starts at 1 and never decreases.
    pub turn: u32,

    /// Which side may currently act.
    pub phase: Phase,

    /// Units that consumed their action (attack, skill, chest) this phase.
    pub acted: BTreeSet<UnitId>,

    /// Units that already moved this phase. Moving does not end a unit's turn,
    /// but a unit moves at most once per phase.
    #[cfg_attr(feature = "serde", serde(default))]
    pub moved: BTreeSet<UnitId>,

    /// Sequential action identifier that increments with every processed
    /// intent. Mixed into RNG seeds so repeated actions roll independently.
    #[cfg_attr(feature = "serde", serde(default))]
    pub action_nonce: u64,
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            turn: 1,
            phase: Phase::Player,
            acted: BTreeSet::new(),
            moved: BTreeSet::new(),
            action_nonce: 0,
        }
    }

    pub fn has_acted(&self, unit: &UnitId) -> bool {
        self.acted.contains(unit)
    }

    pub fn has_moved(&self, unit: &UnitId) -> bool {
        self.moved.contains(unit)
    }

    /// Advances one phase step, bumping the turn counter when wrapping back
    /// to the player phase, and clears per-phase tracking.
    pub fn advance_phase(&mut self) {
        if self.phase.wraps() {
            self.turn += 1;
        }
        self.phase = self.phase.next();
        self.acted.clear();
        self.moved.clear();
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}
