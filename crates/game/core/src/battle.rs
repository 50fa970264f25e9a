//! Battle sub-sessions.
//!
//! A battle copies the player, allies and engaged enemies out of an explore
//! state, keeping their session-scoped ids. When the battle ends, its final
//! state is folded back into the parent using those ids only.

use crate::env::compute_seed;
use crate::state::{Phase, SessionState, TurnState, UnitId, UnitState, newly_defeated};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("enemy {0} is not on the map")]
    UnknownEnemy(UnitId),

    #[error("battle has no living enemies")]
    NoEnemies,
}

/// Builds the opening state of a battle.
///
/// `engaged` selects which enemies join; `None` engages every living enemy.
/// The battle starts at turn 1, player phase, with a seed derived from the
/// parent so replays stay deterministic.
///
/// # Errors
///
/// Fails if an engaged id is unknown or if no living enemy would take part.
pub fn start_battle_state(
    parent: &SessionState,
    engaged: Option<&[UnitId]>,
) -> Result<SessionState, BattleError> {
    let enemies: Vec<UnitState> = match engaged {
        Some(ids) => ids
            .iter()
            .map(|id| {
                parent
                    .alive_enemies()
                    .find(|enemy| &enemy.id == id)
                    .cloned()
                    .ok_or_else(|| BattleError::UnknownEnemy(id.clone()))
            })
            .collect::<Result<_, _>>()?,
        None => parent.alive_enemies().cloned().collect(),
    };
    if enemies.is_empty() {
        return Err(BattleError::NoEnemies);
    }

    Ok(SessionState {
        seed: compute_seed(parent.seed, parent.turn.action_nonce, "battle", parent.turn.turn),
        turn: TurnState::new(),
        player: parent.player.clone(),
        allies: parent.allies.clone(),
        enemies,
        dialogues_shown: parent.dialogues_shown.clone(),
        opened_chests: parent.opened_chests.clone(),
    })
}

/// Parent state after a battle, plus the enemies it defeated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub state: SessionState,
    pub defeated: Vec<UnitState>,
}

/// Folds a finished battle back into its parent explore state.
///
/// - Player and ally HP, SP and status effects are copied by id; positions
///   stay where they were on the explore map.
/// - Engaged enemies missing from the battle or at zero HP are removed;
///   survivors keep their battle HP, SP and status effects.
/// - Enemies that were not engaged are untouched.
/// - Control returns to the player: if the parent was in the enemy phase the
///   turn advances, and the acted and moved sets are cleared.
pub fn reconcile(parent: &SessionState, battle: &SessionState, engaged: &[UnitId]) -> Reconciliation {
    let mut state = parent.clone();

    sync_unit(&mut state.player, &battle.player);
    for ally in &mut state.allies {
        if let Some(fought) = battle.allies.iter().find(|unit| unit.id == ally.id) {
            sync_unit(ally, fought);
        }
    }

    state.enemies.retain_mut(|enemy| {
        if !engaged.contains(&enemy.id) {
            return true;
        }
        match battle.enemies.iter().find(|unit| unit.id == enemy.id) {
            Some(fought) if fought.is_alive() => {
                sync_unit(enemy, fought);
                true
            }
            _ => false,
        }
    });

    if state.turn.phase == Phase::Enemy {
        state.turn.advance_phase();
    } else {
        state.turn.acted.clear();
        state.turn.moved.clear();
    }

    let defeated = newly_defeated(parent, &state).into_iter().cloned().collect();
    Reconciliation { state, defeated }
}

fn sync_unit(unit: &mut UnitState, fought: &UnitState) {
    unit.hp = fought.hp.min(unit.max_hp);
    unit.sp = fought.sp.min(unit.max_sp);
    unit.status = fought.status.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::{small_config, template};
    use crate::state::Position;

    fn two_enemy_parent() -> SessionState {
        let mut config = small_config();
        config.enemies.push(template("bat", Position::new(5, 5), 8));
        SessionState::from_config(&config, 11)
    }

    #[test]
    fn start_engages_selected_enemies() {
        let parent = two_enemy_parent();
        let battle = start_battle_state(&parent, Some(&[UnitId::from("e2")][..])).unwrap();
        assert_eq!(battle.enemies.len(), 1);
        assert_eq!(battle.enemies[0].id, UnitId::from("e2"));
        assert_eq!(battle.turn, TurnState::new());

        assert_eq!(
            start_battle_state(&parent, Some(&[UnitId::from("e9")][..])),
            Err(BattleError::UnknownEnemy(UnitId::from("e9")))
        );
    }

    #[test]
    fn reconcile_uses_server_ids() {
        let parent = two_enemy_parent();
        let engaged = [UnitId::from("e1")];
        let mut battle = start_battle_state(&parent, Some(&engaged[..])).unwrap();
        battle.player.hp = 12;
        battle.player.position = Position::new(4, 4);
        battle.enemies[0].hp = 0;

        let result = reconcile(&parent, &battle, &engaged);
        assert_eq!(result.state.player.hp, 12);
        assert_eq!(result.state.player.position, parent.player.position);
        assert_eq!(result.state.enemies.len(), 1);
        assert_eq!(result.state.enemies[0].id, UnitId::from("e2"));
        assert_eq!(result.defeated.len(), 1);
        assert_eq!(result.defeated[0].id, UnitId::from("e1"));
    }

    #[test]
    fn reconcile_survivor_keeps_battle_hp() {
        let parent = two_enemy_parent();
        let engaged = [UnitId::from("e1")];
        let mut battle = start_battle_state(&parent, Some(&engaged[..])).unwrap();
        battle.enemies[0].hp = 4;

        let result = reconcile(&parent, &battle, &engaged);
        assert_eq!(result.state.enemies[0].hp, 4);
        assert!(result.defeated.is_empty());
    }

    #[test]
    fn reconcile_returns_control_to_player() {
        let mut parent = two_enemy_parent();
        parent.turn.advance_phase();
        assert_eq!(parent.turn.phase, Phase::Enemy);
        let battle = start_battle_state(&parent, None).unwrap();

        let result = reconcile(&parent, &battle, &[UnitId::from("e1"), UnitId::from("e2")]);
        assert_eq!(result.state.turn.phase, Phase::Player);
        assert_eq!(result.state.turn.turn, 2);
    }
}
