//! Whitelisted merge of a client proposal into the authoritative state.

use super::checks::{illegal_move, requested_move, validate_proposal};
use super::error::ValidationErrorKind as Kind;
use super::policy::{ValidationPolicy, ValidationReport};
use super::proposal::{StateProposal, UnitPatch};
use crate::config::SessionConfig;
use crate::state::{SessionState, UnitState, newly_defeated};

/// Result of a successful merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    pub state: SessionState,
    /// Enemies alive before the merge and gone after it.
    pub defeated: Vec<UnitState>,
    /// Soft issues that were clamped, dropped or ignored.
    pub report: ValidationReport,
}

/// Validates `proposal` and, if no hard issue is found, merges the
/// client-authorable fields into a copy of `old`.
///
/// Only positions, HP/SP, turn/phase, the acted set, enemy removals and shown
/// dialogues are taken from the proposal. Values are clamped into their
/// pools, illegal moves keep the previous position, and unknown unit ids
/// never enter the state. Config-owned fields are never read from the client.
///
/// # Errors
///
/// Returns the full report when any issue is hard under `policy`.
pub fn merge_proposal(
    old: &SessionState,
    proposal: &StateProposal,
    config: &SessionConfig,
    policy: &ValidationPolicy,
) -> Result<MergeOutcome, ValidationReport> {
    let report = validate_proposal(old, proposal, config, policy);
    if !report.is_valid() {
        return Err(report);
    }

    let mut state = old.clone();

    let sequence_ok = !report.issues.iter().any(|issue| {
        matches!(
            issue.kind,
            Kind::TurnRegression | Kind::InvalidPhaseTransition | Kind::TurnSkipped
        )
    });
    let advanced = sequence_ok
        && (proposal.turn, proposal.phase) != (old.turn.turn, old.turn.phase);

    if advanced {
        // The ending side's durations run down; DoT is already in the proposal.
        let ending = state.turn.phase.owner();
        for unit in state.side_units_mut(ending).filter(|unit| unit.is_alive()) {
            unit.status.decay();
        }
        state.turn.advance_phase();
    }

    let merge = |unit: &mut UnitState, patch: &UnitPatch| apply_patch(old, proposal, config, unit, patch);

    if proposal.player.id == state.player.id {
        merge(&mut state.player, &proposal.player);
    }

    for ally in &mut state.allies {
        if let Some(patch) = proposal.ally(&ally.id) {
            merge(ally, patch);
        }
    }

    state.enemies = std::mem::take(&mut state.enemies)
        .into_iter()
        .filter_map(|mut enemy| {
            let patch = proposal.enemy(&enemy.id)?;
            merge(&mut enemy, patch);
            enemy.is_alive().then_some(enemy)
        })
        .collect();

    let acted = proposal
        .acted
        .iter()
        .filter(|id| state.unit(id).is_some())
        .cloned()
        .collect::<Vec<_>>();
    if !advanced {
        state.turn.acted.extend(old.turn.acted.iter().cloned());
    }
    state.turn.acted.extend(acted);

    state.dialogues_shown.extend(
        proposal
            .dialogues_shown
            .iter()
            .filter(|id| config.has_dialogue(id))
            .cloned(),
    );

    let defeated = newly_defeated(old, &state).into_iter().cloned().collect();

    Ok(MergeOutcome {
        state,
        defeated,
        report,
    })
}

fn apply_patch(
    old: &SessionState,
    proposal: &StateProposal,
    config: &SessionConfig,
    unit: &mut UnitState,
    patch: &UnitPatch,
) {
    let legal_move = requested_move(unit, patch)
        .filter(|to| illegal_move(old, proposal, config, unit, *to).is_none());
    if let Some(position) = legal_move {
        unit.position = position;
    }

    if unit.is_alive() {
        unit.hp = clamp_pool(patch.hp, unit.max_hp);
    }
    unit.sp = clamp_pool(patch.sp, unit.max_sp);
}

fn clamp_pool(value: i64, max: u32) -> u32 {
    u32::try_from(value.clamp(0, i64::from(max))).unwrap_or(max)
}
