use crate::action::{ActionError, ActionTransition, ready_actor};
use crate::env::GameEnv;
use crate::state::{CombatLogEntry, Position, SessionState, UnitId};

/// Moves a unit to a destination tile within its movement range.
///
/// Moving does not consume the unit's action, but each unit moves at most
/// once per phase. Stepping the player onto an unseen dialogue trigger marks
/// the dialogue as shown.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveAction {
    pub actor: UnitId,
    pub to: Position,
}

/// Outcome of a successful move.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveOutcome {
    pub actor: UnitId,
    pub from: Position,
    pub to: Position,
    /// Dialogue triggered by this move, if any.
    pub dialogue: Option<String>,
    pub log_entries: Vec<CombatLogEntry>,
}

impl MoveAction {
    pub fn new(actor: UnitId, to: Position) -> Self {
        Self { actor, to }
    }
}

impl ActionTransition for MoveAction {
    type Error = ActionError;
    type Result = MoveOutcome;

    fn pre_validate(&self, state: &SessionState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let unit = ready_actor(state, &self.actor)?;
        if state.turn.has_moved(&self.actor) {
            return Err(ActionError::AlreadyMoved(self.actor.clone()));
        }

        let config = env.config();
        if !config.map.contains(self.to) {
            return Err(ActionError::OutOfBounds(self.to));
        }
        if config.walls.contains(&self.to) {
            return Err(ActionError::Blocked(self.to));
        }
        if unit.position == self.to {
            return Err(ActionError::NoMovement(self.to));
        }

        let distance = unit.position.manhattan(self.to);
        if distance > unit.move_range {
            return Err(ActionError::OutOfRange {
                distance,
                reach: unit.move_range,
            });
        }

        if state.occupant(self.to).is_some() {
            return Err(ActionError::Occupied(self.to));
        }

        Ok(())
    }

    fn apply(&self, state: &mut SessionState, env: &GameEnv<'_>) -> Result<MoveOutcome, Self::Error> {
        let (turn, phase) = (state.turn.turn, state.turn.phase);
        let unit = state
            .unit_mut(&self.actor)
            .ok_or_else(|| ActionError::ActorNotFound(self.actor.clone()))?;
        let from = unit.position;
        unit.position = self.to;
        state.turn.moved.insert(self.actor.clone());

        let mut log_entries = Vec::new();
        let dialogue = if self.actor.is_player() {
            env.config()
                .dialogue_at(self.to)
                .filter(|trigger| !state.dialogues_shown.contains(&trigger.id))
                .map(|trigger| trigger.id.clone())
        } else {
            None
        };
        if let Some(id) = &dialogue {
            state.dialogues_shown.insert(id.clone());
            log_entries.push(CombatLogEntry::new(turn, phase, "dialogue").with("dialogue", id));
        }

        Ok(MoveOutcome {
            actor: self.actor.clone(),
            from,
            to: self.to,
            dialogue,
            log_entries,
        })
    }

    fn post_validate(&self, state: &SessionState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let sharing = state
            .units()
            .filter(|unit| unit.is_alive() && unit.position == self.to)
            .count();
        if sharing > 1 {
            return Err(ActionError::Occupied(self.to));
        }
        Ok(())
    }
}
