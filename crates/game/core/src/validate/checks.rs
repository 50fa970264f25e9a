//! Invariant checks over `(old, new)` pairs.

use super::error::ValidationErrorKind as Kind;
use super::policy::{ValidationPolicy, ValidationReport};
use super::proposal::{StateProposal, UnitPatch};
use crate::config::SessionConfig;
use crate::state::{Phase, Position, SessionState, UnitId, UnitState};

/// Validates a client proposal against the previous authoritative state.
///
/// Never mutates anything; the returned report lists every issue found,
/// classified hard or soft by `policy`.
pub fn validate_proposal(
    old: &SessionState,
    proposal: &StateProposal,
    config: &SessionConfig,
    policy: &ValidationPolicy,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    check_sequence(
        (old.turn.turn, old.turn.phase),
        (proposal.turn, proposal.phase),
        policy,
        &mut report,
    );

    if proposal.player.id == old.player.id {
        check_patch(old, proposal, &old.player, &proposal.player, config, policy, &mut report);
    } else {
        report.push(policy.issue(
            Kind::UnknownUnit,
            Some(&proposal.player.id),
            "player patch does not reference the session player",
        ));
    }

    for patch in &proposal.allies {
        match old.allies.iter().find(|ally| ally.id == patch.id) {
            Some(ally) => check_patch(old, proposal, ally, patch, config, policy, &mut report),
            None => report.push(policy.issue(
                Kind::UnknownUnit,
                Some(&patch.id),
                format!("ally {} does not exist in this session", patch.id),
            )),
        }
    }

    for patch in &proposal.enemies {
        match old.enemies.iter().find(|enemy| enemy.id == patch.id) {
            Some(enemy) => check_patch(old, proposal, enemy, patch, config, policy, &mut report),
            None => report.push(policy.issue(
                Kind::UnknownUnit,
                Some(&patch.id),
                format!("enemy {} does not exist in this session", patch.id),
            )),
        }
    }

    for enemy in old.enemies.iter().filter(|enemy| !enemy.is_alive()) {
        if proposal.enemy(&enemy.id).is_none() {
            report.push(policy.issue(
                Kind::StaleRemoval,
                Some(&enemy.id),
                format!("enemy {} was already defeated", enemy.id),
            ));
        }
    }

    for id in &proposal.acted {
        if old.unit(id).is_none() {
            report.push(policy.issue(
                Kind::UnknownUnit,
                Some(id),
                format!("acted unit {id} does not exist in this session"),
            ));
        }
    }

    for dialogue in &proposal.dialogues_shown {
        if !config.has_dialogue(dialogue) {
            report.push(policy.issue(
                Kind::UnknownDialogue,
                None,
                format!("dialogue {dialogue} is not part of this session"),
            ));
        }
    }

    report
}

/// Validates a server-computed transition.
///
/// Used as the post-condition of every processed intent: the turn sequence
/// must be monotonic, no unit may appear from nowhere or come back from
/// defeat, and resources must sit inside their pools.
pub fn validate_transition(
    old: &SessionState,
    new: &SessionState,
    policy: &ValidationPolicy,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    check_sequence(
        (old.turn.turn, old.turn.phase),
        (new.turn.turn, new.turn.phase),
        policy,
        &mut report,
    );

    for unit in new.units() {
        let Some(previous) = old.unit(&unit.id) else {
            report.push(policy.issue(
                Kind::UnknownUnit,
                Some(&unit.id),
                format!("unit {} appeared during the transition", unit.id),
            ));
            continue;
        };
        if !previous.is_alive() && unit.is_alive() {
            report.push(policy.issue(
                Kind::Resurrection,
                Some(&unit.id),
                format!("unit {} regained hp after defeat", unit.id),
            ));
        }
        check_resource(&unit.id, "hp", i64::from(unit.hp), unit.max_hp, policy, &mut report);
        check_resource(&unit.id, "sp", i64::from(unit.sp), unit.max_sp, policy, &mut report);
    }

    for id in &new.turn.acted {
        if old.unit(id).is_none() {
            report.push(policy.issue(
                Kind::UnknownUnit,
                Some(id),
                format!("acted unit {id} does not exist in this session"),
            ));
        }
    }

    report
}

/// Position in the global phase sequence: `(1, player) = 2`, `(1, enemy) = 3`, ...
fn sequence_index(turn: u32, phase: Phase) -> i64 {
    i64::from(turn) * 2 + i64::from(matches!(phase, Phase::Enemy))
}

/// Turn and phase may stay put or move exactly one step along
/// `player -> enemy -> player(turn + 1)`.
pub(crate) fn check_sequence(
    old: (u32, Phase),
    new: (u32, Phase),
    policy: &ValidationPolicy,
    report: &mut ValidationReport,
) {
    let (old_turn, old_phase) = old;
    let (new_turn, new_phase) = new;

    if new_turn < old_turn {
        report.push(policy.issue(
            Kind::TurnRegression,
            None,
            format!("turn went from {old_turn} to {new_turn}"),
        ));
        return;
    }

    let step = sequence_index(new_turn, new_phase) - sequence_index(old_turn, old_phase);
    match step {
        0 | 1 => {}
        s if s < 0 => report.push(policy.issue(
            Kind::InvalidPhaseTransition,
            None,
            format!("phase went from {old_phase} back to {new_phase} within turn {old_turn}"),
        )),
        _ if new_turn - old_turn >= 2 => report.push(policy.issue(
            Kind::TurnSkipped,
            None,
            format!("turn jumped from {old_turn} to {new_turn}"),
        )),
        _ => report.push(policy.issue(
            Kind::InvalidPhaseTransition,
            None,
            format!("({old_turn}, {old_phase}) -> ({new_turn}, {new_phase}) skips a phase"),
        )),
    }
}

/// Classifies one resource value against its pool.
pub(crate) fn check_resource(
    unit: &UnitId,
    label: &str,
    value: i64,
    max: u32,
    policy: &ValidationPolicy,
    report: &mut ValidationReport,
) {
    if value < 0 {
        report.push(policy.issue(
            Kind::NegativeResource,
            Some(unit),
            format!("{unit} {label} is negative ({value})"),
        ));
    } else if value > policy.tolerance(max) {
        report.push(policy.issue(
            Kind::ExcessiveResource,
            Some(unit),
            format!("{unit} {label} {value} far exceeds max {max}"),
        ));
    } else if value > i64::from(max) {
        report.push(policy.issue(
            Kind::ResourceOverflow,
            Some(unit),
            format!("{unit} {label} {value} exceeds max {max}"),
        ));
    }
}

fn check_patch(
    old: &SessionState,
    proposal: &StateProposal,
    unit: &UnitState,
    patch: &UnitPatch,
    config: &SessionConfig,
    policy: &ValidationPolicy,
    report: &mut ValidationReport,
) {
    check_resource(&unit.id, "hp", patch.hp, unit.max_hp, policy, report);
    check_resource(&unit.id, "sp", patch.sp, unit.max_sp, policy, report);

    if !unit.is_alive() && patch.hp > 0 {
        report.push(policy.issue(
            Kind::Resurrection,
            Some(&unit.id),
            format!("{} was defeated and cannot regain hp", unit.id),
        ));
    }

    if let Some(reason) = requested_move(unit, patch)
        .and_then(|to| illegal_move(old, proposal, config, unit, to))
    {
        report.push(policy.issue(Kind::InvalidPosition, Some(&unit.id), reason));
    }
}

/// Destination of `patch` when it moves `unit` off its current tile.
pub(crate) fn requested_move(unit: &UnitState, patch: &UnitPatch) -> Option<Position> {
    patch.position.filter(|position| *position != unit.position)
}

/// Explains why `unit` may not end the submission on `to`, if it may not.
///
/// The destination must be walkable, within one move of the previous
/// position, free of any unit still standing after the proposal, and not
/// claimed by another unit of the same proposal. Swaps are therefore refused.
pub(crate) fn illegal_move(
    old: &SessionState,
    proposal: &StateProposal,
    config: &SessionConfig,
    unit: &UnitState,
    to: Position,
) -> Option<String> {
    if !config.is_walkable(to) {
        return Some(format!("{} cannot stand on {to}", unit.id));
    }

    let distance = unit.position.manhattan(to);
    if distance > unit.move_range {
        return Some(format!(
            "{} moved {distance} tiles, range is {}",
            unit.id, unit.move_range
        ));
    }

    let occupied = old
        .units()
        .filter(|other| other.id != unit.id && other.position == to)
        .any(|other| still_standing(old, proposal, other));
    if occupied {
        return Some(format!("{} cannot move onto occupied {to}", unit.id));
    }

    let contested = proposal.patches().any(|patch| {
        patch.id != unit.id
            && patch.position == Some(to)
            && old.unit(&patch.id).is_some_and(UnitState::is_alive)
    });
    if contested {
        return Some(format!("{} and another unit both claim {to}", unit.id));
    }

    None
}

/// A unit keeps its tile unless the proposal defeats it. Omitted enemies are
/// removed; omitted allies are unchanged.
fn still_standing(old: &SessionState, proposal: &StateProposal, unit: &UnitState) -> bool {
    if !unit.is_alive() {
        return false;
    }
    match proposal.patch(&unit.id) {
        Some(patch) => patch.hp > 0,
        None => !old.enemies.iter().any(|enemy| enemy.id == unit.id),
    }
}
