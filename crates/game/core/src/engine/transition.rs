//! Intent dispatch and execution logic.

use crate::action::{ActionResult, ActionTransition, Intent};
use crate::env::GameEnv;
use crate::state::SessionState;

use super::errors::{ExecuteError, TransitionPhase, TransitionPhaseError};

/// Executes a transition through the three-phase pipeline and returns the result.
///
/// Phases:
/// 1. `pre_validate` - Check preconditions before mutation
/// 2. `apply` - Mutate the session state and return result
/// 3. `post_validate` - Verify postconditions after mutation
#[inline]
fn drive_transition<T>(
    transition: &T,
    state: &mut SessionState,
    env: &GameEnv<'_>,
) -> Result<T::Result, TransitionPhaseError<T::Error>>
where
    T: ActionTransition,
{
    transition
        .pre_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    let result = transition
        .apply(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(result)
}

/// Routes each intent to its transition and wraps the result in [`ActionResult`].
pub(super) fn execute_transition(
    intent: &Intent,
    state: &mut SessionState,
    env: &GameEnv<'_>,
) -> Result<ActionResult, ExecuteError> {
    match intent {
        Intent::Move(transition) => drive_transition(transition, state, env)
            .map(ActionResult::Move)
            .map_err(ExecuteError::Move),
        Intent::Attack(transition) => drive_transition(transition, state, env)
            .map(ActionResult::Attack)
            .map_err(ExecuteError::Attack),
        Intent::Cast(transition) => drive_transition(transition, state, env)
            .map(ActionResult::Cast)
            .map_err(ExecuteError::Cast),
        Intent::EndTurn(transition) => drive_transition(transition, state, env)
            .map(ActionResult::EndTurn)
            .map_err(ExecuteError::EndTurn),
        Intent::OpenChest(transition) => drive_transition(transition, state, env)
            .map(ActionResult::OpenChest)
            .map_err(ExecuteError::OpenChest),
    }
}
