use crate::action::{ActionError, ActionTransition, ready_actor};
use crate::env::GameEnv;
use crate::state::{CombatLogEntry, SessionState, Side, UnitId};

/// Opens a chest standing on or next to the actor.
///
/// Only player-side units open chests; opening consumes the unit's action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenChestAction {
    pub actor: UnitId,
    pub chest: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChestOutcome {
    pub chest: String,
    pub gold: u64,
    pub log_entries: Vec<CombatLogEntry>,
}

impl OpenChestAction {
    pub fn new(actor: UnitId, chest: impl Into<String>) -> Self {
        Self {
            actor,
            chest: chest.into(),
        }
    }
}

impl ActionTransition for OpenChestAction {
    type Error = ActionError;
    type Result = ChestOutcome;

    fn pre_validate(&self, state: &SessionState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let unit = ready_actor(state, &self.actor)?;
        if state.side_of(&self.actor) != Some(Side::Player) {
            return Err(ActionError::NotPhaseOwner {
                actor: self.actor.clone(),
                phase: state.turn.phase,
            });
        }

        let chest = env
            .config()
            .chest(&self.chest)
            .ok_or_else(|| ActionError::ChestNotFound(self.chest.clone()))?;
        if state.opened_chests.contains(&chest.id) {
            return Err(ActionError::ChestAlreadyOpened(chest.id.clone()));
        }

        let distance = unit.position.chebyshev(chest.position);
        if distance > 1 {
            return Err(ActionError::OutOfRange { distance, reach: 1 });
        }
        Ok(())
    }

    fn apply(&self, state: &mut SessionState, env: &GameEnv<'_>) -> Result<ChestOutcome, Self::Error> {
        let chest = env
            .config()
            .chest(&self.chest)
            .ok_or_else(|| ActionError::ChestNotFound(self.chest.clone()))?;

        state.opened_chests.insert(chest.id.clone());
        state.turn.acted.insert(self.actor.clone());

        let entry = CombatLogEntry::new(state.turn.turn, state.turn.phase, "chest_opened")
            .with("actor", &self.actor)
            .with("chest", &chest.id)
            .with("gold", chest.gold);

        Ok(ChestOutcome {
            chest: chest.id.clone(),
            gold: chest.gold,
            log_entries: vec![entry],
        })
    }
}
