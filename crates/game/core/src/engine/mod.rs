//! Intent processing pipeline.
//!
//! The [`ActionProcessor`] is the authoritative reducer for [`SessionState`].
//! It never mutates the caller's state: every intent runs against a copy,
//! defeated enemies are pruned, and the candidate is checked against the
//! transition invariants before it is handed back.

mod errors;
mod transition;

pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};

use crate::action::{ActionResult, Intent};
use crate::env::GameEnv;
use crate::state::{CombatLogEntry, SessionState, UnitState};
use crate::validate::validate_transition;

/// Complete outcome of processing one intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// The resulting authoritative state.
    pub state: SessionState,

    /// Action-specific result (combat outcome, move, chest, ...).
    pub result: ActionResult,

    /// Log entries to append to the session's combat log.
    pub log_entries: Vec<CombatLogEntry>,

    /// Enemies defeated by this intent, already removed from `state`.
    pub defeated: Vec<UnitState>,
}

/// Applies typed intents to a session state.
///
/// All state mutations flow through the three-phase action pipeline:
/// pre_validate → apply → post_validate, followed by a transition check of
/// the whole `(old, new)` pair.
#[derive(Clone, Copy, Debug)]
pub struct ActionProcessor<'a> {
    env: GameEnv<'a>,
}

impl<'a> ActionProcessor<'a> {
    pub fn new(env: GameEnv<'a>) -> Self {
        Self { env }
    }

    /// Processes `intent` against `state` and returns the new state.
    ///
    /// On error the input state is untouched and no partial result exists.
    pub fn process(
        &self,
        state: &SessionState,
        intent: &Intent,
    ) -> Result<ProcessOutcome, ExecuteError> {
        let mut next = state.clone();

        let result = transition::execute_transition(intent, &mut next, &self.env)?;

        next.turn.action_nonce += 1;
        let defeated = next.prune_defeated_enemies();

        let report = validate_transition(state, &next, self.env.policy());
        if !report.is_empty() {
            return Err(ExecuteError::InvariantViolation(report));
        }

        let log_entries = result.log_entries().to_vec();
        Ok(ProcessOutcome {
            state: next,
            result,
            log_entries,
            defeated,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::action::{
        ActionError, AttackAction, CastAction, EndTurnAction, MoveAction, OpenChestAction,
    };
    use crate::env::fixtures::TestEnv;
    use crate::state::{Phase, Position, StatusEffectKind, UnitId};

    #[test]
    fn lethal_attack_removes_enemy_and_reports_it() {
        let fixture = TestEnv::new();
        let processor = ActionProcessor::new(fixture.env());
        let mut state = SessionState::from_config(&fixture.config, 1);
        state.player.position = Position::new(1, 0);
        state.enemies[0].hp = 3;

        let intent = Intent::Attack(AttackAction::new(UnitId::player(), UnitId::from("e1")));
        let outcome = processor.process(&state, &intent).unwrap();

        assert!(outcome.state.enemies.is_empty());
        assert_eq!(outcome.defeated.len(), 1);
        assert_eq!(outcome.defeated[0].id, UnitId::from("e1"));
        assert_eq!(outcome.state.turn.action_nonce, 1);
        assert!(outcome.log_entries.iter().any(|e| e.key == "defeated"));
        // caller's state is untouched
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn rejection_carries_phase_and_reason() {
        let fixture = TestEnv::new();
        let processor = ActionProcessor::new(fixture.env());
        let state = SessionState::from_config(&fixture.config, 1);

        let intent = Intent::Move(MoveAction::new(UnitId::player(), Position::new(3, 3)));
        let error = processor.process(&state, &intent).unwrap_err();
        assert_eq!(error.phase(), Some(TransitionPhase::PreValidate));
        assert_eq!(
            error.action_error(),
            Some(&ActionError::Blocked(Position::new(3, 3)))
        );
    }

    #[test]
    fn full_round_advances_turn() {
        let fixture = TestEnv::new();
        let processor = ActionProcessor::new(fixture.env());
        let state = SessionState::from_config(&fixture.config, 1);

        let state = processor
            .process(&state, &Intent::EndTurn(EndTurnAction::new(1, Phase::Player)))
            .unwrap()
            .state;
        let state = processor
            .process(&state, &Intent::EndTurn(EndTurnAction::new(1, Phase::Enemy)))
            .unwrap()
            .state;
        assert_eq!((state.turn.turn, state.turn.phase), (2, Phase::Player));
    }

    const UNITS: [&str; 3] = ["player", "a1", "e1"];
    const SKILLS: [&str; 3] = ["fire", "mend", "focus"];

    /// Intent shape, resolved against the current state when it runs.
    #[derive(Clone, Debug)]
    enum Step {
        Move(usize, i32, i32),
        Attack(usize, usize),
        Cast(usize, usize, usize),
        EndCurrent,
        EndAt(u32, bool),
        OpenChest(usize),
    }

    impl Step {
        fn intent(&self, state: &SessionState) -> Intent {
            let unit = |index: usize| UnitId::from(UNITS[index]);
            match *self {
                Step::Move(actor, x, y) => {
                    Intent::Move(MoveAction::new(unit(actor), Position::new(x, y)))
                }
                Step::Attack(actor, target) => {
                    Intent::Attack(AttackAction::new(unit(actor), unit(target)))
                }
                Step::Cast(actor, skill, target) => Intent::Cast(CastAction::new(
                    unit(actor),
                    SKILLS[skill],
                    vec![unit(target)],
                )),
                Step::EndCurrent => {
                    Intent::EndTurn(EndTurnAction::new(state.turn.turn, state.turn.phase))
                }
                Step::EndAt(turn, enemy) => {
                    let phase = if enemy { Phase::Enemy } else { Phase::Player };
                    Intent::EndTurn(EndTurnAction::new(turn, phase))
                }
                Step::OpenChest(actor) => Intent::OpenChest(OpenChestAction::new(unit(actor), "c1")),
            }
        }
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..3usize, -1..9i32, -1..9i32).prop_map(|(actor, x, y)| Step::Move(actor, x, y)),
            (0..3usize, 0..3usize).prop_map(|(actor, target)| Step::Attack(actor, target)),
            (0..3usize, 0..3usize, 0..3usize)
                .prop_map(|(actor, skill, target)| Step::Cast(actor, skill, target)),
            Just(Step::EndCurrent),
            (0..5u32, any::<bool>()).prop_map(|(turn, enemy)| Step::EndAt(turn, enemy)),
            (0..3usize).prop_map(Step::OpenChest),
        ]
    }

    fn sequence(state: &SessionState) -> u64 {
        u64::from(state.turn.turn) * 2 + u64::from(state.turn.phase == Phase::Enemy)
    }

    proptest! {
        #[test]
        fn accepted_states_move_forward_and_stay_in_bounds(
            steps in prop::collection::vec(step_strategy(), 1..40),
            afflicted in any::<bool>(),
        ) {
            let fixture = TestEnv::new();
            let processor = ActionProcessor::new(fixture.env());
            let mut state = SessionState::from_config(&fixture.config, 7);
            if afflicted {
                state.player.status.add(StatusEffectKind::Poison, 3);
                state.enemies[0].status.add(StatusEffectKind::Stun, 1);
            }

            for step in &steps {
                let intent = step.intent(&state);
                let next = match processor.process(&state, &intent) {
                    Ok(outcome) => outcome.state,
                    Err(ExecuteError::InvariantViolation(report)) => {
                        return Err(TestCaseError::fail(format!("{intent:?}: {report:?}")));
                    }
                    Err(_) => continue,
                };

                prop_assert!(sequence(&next) >= sequence(&state));
                prop_assert!(sequence(&next) - sequence(&state) <= 1);
                prop_assert!(next.turn.action_nonce > state.turn.action_nonce);
                for unit in next.units() {
                    prop_assert!(unit.hp <= unit.max_hp, "{} hp {}", unit.id, unit.hp);
                    prop_assert!(unit.sp <= unit.max_sp, "{} sp {}", unit.id, unit.sp);
                }
                state = next;
            }
        }
    }
}
