use crate::action::{ActionError, ActionTransition};
use crate::env::GameEnv;
use crate::state::{CombatLogEntry, Phase, SessionState};

/// Ends the current phase.
///
/// Carries the `(turn, phase)` the client believes is current, so a retried
/// or raced request cannot advance the session twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndTurnAction {
    pub turn: u32,
    pub phase: Phase,
}

/// Outcome of ending a phase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnOutcome {
    pub turn: u32,
    pub phase: Phase,
    pub log_entries: Vec<CombatLogEntry>,
}

impl EndTurnAction {
    pub fn new(turn: u32, phase: Phase) -> Self {
        Self { turn, phase }
    }
}

impl ActionTransition for EndTurnAction {
    type Error = ActionError;
    type Result = TurnOutcome;

    fn pre_validate(&self, state: &SessionState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        if (state.turn.turn, state.turn.phase) != (self.turn, self.phase) {
            return Err(ActionError::StaleTurn {
                expected_turn: state.turn.turn,
                expected_phase: state.turn.phase,
                turn: self.turn,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn apply(&self, state: &mut SessionState, _env: &GameEnv<'_>) -> Result<TurnOutcome, Self::Error> {
        let mut log_entries = end_phase(state);
        state.turn.advance_phase();
        log_entries.extend(begin_phase(state));
        Ok(TurnOutcome {
            turn: state.turn.turn,
            phase: state.turn.phase,
            log_entries,
        })
    }
}

/// End-of-phase upkeep for the side that owns the ending phase.
///
/// Every status counter of that side's living units is decremented once, so
/// an effect lasts through the whole of each phase it was counted for.
pub fn end_phase(state: &mut SessionState) -> Vec<CombatLogEntry> {
    let (turn, phase) = (state.turn.turn, state.turn.phase);
    let mut entries = Vec::new();

    for unit in state.side_units_mut(phase.owner()) {
        if !unit.is_alive() || unit.status.is_empty() {
            continue;
        }
        for kind in unit.status.decay() {
            entries.push(
                CombatLogEntry::new(turn, phase, "status_expired")
                    .with("target", &unit.id)
                    .with("effect", kind),
            );
        }
    }
    entries
}

/// Start-of-phase upkeep for the side that now owns the phase.
///
/// Each living unit of that side takes its damage-over-time. Durations are
/// left alone until [`end_phase`].
pub fn begin_phase(state: &mut SessionState) -> Vec<CombatLogEntry> {
    let (turn, phase) = (state.turn.turn, state.turn.phase);
    let mut entries = vec![CombatLogEntry::new(turn, phase, "phase_start")];

    for unit in state.side_units_mut(phase.owner()) {
        if !unit.is_alive() {
            continue;
        }
        let damage = unit.status.pending_damage();
        if damage == 0 {
            continue;
        }
        let dealt = unit.take_damage(damage);
        entries.push(
            CombatLogEntry::new(turn, phase, "status_damage")
                .with("target", &unit.id)
                .with("amount", dealt),
        );
        if !unit.is_alive() {
            entries.push(
                CombatLogEntry::new(turn, phase, "defeated")
                    .with("target", &unit.id)
                    .with("entity", &unit.entity),
            );
        }
    }
    entries
}
