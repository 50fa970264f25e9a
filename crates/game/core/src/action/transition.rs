use crate::env::GameEnv;
use crate::state::{SessionState, UnitId, UnitState};

use super::ActionError;

/// Defines how a concrete intent mutates session state.
///
/// Implementors override the validation hooks to surface pre- and
/// post-conditions that must hold around the mutation. Hooks receive
/// read-only access to config, tables and RNG via [`GameEnv`] and must stay
/// side-effect free.
pub trait ActionTransition {
    type Error;
    type Result;

    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(&self, _state: &SessionState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the action by mutating the state directly. Implementations
    /// may assume that `pre_validate` has already run successfully.
    fn apply(&self, state: &mut SessionState, env: &GameEnv<'_>)
    -> Result<Self::Result, Self::Error>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(&self, _state: &SessionState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Resolves `actor` and checks it may take a turn-consuming action now.
///
/// The actor must exist, be alive, belong to the side owning the phase,
/// not have acted yet and not be stunned or frozen.
pub(crate) fn ready_actor<'s>(
    state: &'s SessionState,
    actor: &UnitId,
) -> Result<&'s UnitState, ActionError> {
    let unit = state
        .unit(actor)
        .ok_or_else(|| ActionError::ActorNotFound(actor.clone()))?;

    let phase = state.turn.phase;
    if state.side_of(actor) != Some(phase.owner()) {
        return Err(ActionError::NotPhaseOwner {
            actor: actor.clone(),
            phase,
        });
    }
    if !unit.is_alive() {
        return Err(ActionError::ActorDead(actor.clone()));
    }
    if state.turn.has_acted(actor) {
        return Err(ActionError::AlreadyActed(actor.clone()));
    }
    if unit.status.is_incapacitated() {
        return Err(ActionError::ActorIncapacitated(actor.clone()));
    }
    Ok(unit)
}
