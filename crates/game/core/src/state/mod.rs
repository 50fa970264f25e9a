//! Authoritative session state representation.
//!
//! This module owns the strongly-typed state document: turn bookkeeping,
//! the player, allies and enemies, and the sets of dialogues and chests
//! already consumed. Runtime layers clone or query this state but mutate it
//! exclusively through the [`crate::engine::ActionProcessor`] or the
//! whitelisted merge in [`crate::validate`].
mod common;
mod log;
mod status;
mod turn;
mod unit;

use std::collections::BTreeSet;

pub use common::{Phase, Position, SessionStatus, Side, UnitId};
pub use log::{CombatLog, CombatLogEntry, LogParams};
pub use status::{StatusEffect, StatusEffectKind, StatusEffects};
pub use turn::TurnState;
pub use unit::UnitState;

#[cfg(test)]
pub(crate) use unit::test_unit;

use crate::config::{SessionConfig, UnitTemplate};

/// Canonical snapshot of one session (or battle).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionState {
    /// RNG seed, set once at creation and never modified.
    ///
    /// Combined with `turn.action_nonce` to derive a unique seed per roll.
    pub seed: u64,

    pub turn: TurnState,
    pub player: UnitState,
    pub allies: Vec<UnitState>,
    pub enemies: Vec<UnitState>,

    /// Dialogue ids already shown to the player.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dialogues_shown: BTreeSet<String>,

    /// Chest ids already opened.
    #[cfg_attr(feature = "serde", serde(default))]
    pub opened_chests: BTreeSet<String>,
}

impl SessionState {
    /// Initializes a fresh state from config defaults.
    ///
    /// Unit identifiers are issued here (`player`, `a1..`, `e1..`) and stay
    /// stable for the lifetime of the session.
    pub fn from_config(config: &SessionConfig, seed: u64) -> Self {
        let player = spawn(UnitId::player(), &config.player);
        let allies = config
            .allies
            .iter()
            .enumerate()
            .map(|(index, template)| spawn(UnitId::ally(index), template))
            .collect();
        let enemies = config
            .enemies
            .iter()
            .enumerate()
            .map(|(index, template)| spawn(UnitId::enemy(index), template))
            .collect();

        Self {
            seed,
            turn: TurnState::new(),
            player,
            allies,
            enemies,
            dialogues_shown: BTreeSet::new(),
            opened_chests: BTreeSet::new(),
        }
    }

    /// Returns a unit by id (player, ally or enemy).
    pub fn unit(&self, id: &UnitId) -> Option<&UnitState> {
        self.units().find(|unit| &unit.id == id)
    }

    /// Returns a mutable unit by id (player, ally or enemy).
    pub fn unit_mut(&mut self, id: &UnitId) -> Option<&mut UnitState> {
        if &self.player.id == id {
            return Some(&mut self.player);
        }
        self.allies
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .find(|unit| &unit.id == id)
    }

    /// Which side a unit belongs to, if it exists.
    pub fn side_of(&self, id: &UnitId) -> Option<Side> {
        if &self.player.id == id || self.allies.iter().any(|u| &u.id == id) {
            Some(Side::Player)
        } else if self.enemies.iter().any(|u| &u.id == id) {
            Some(Side::Enemy)
        } else {
            None
        }
    }

    /// Iterates over all units (player, allies, enemies).
    pub fn units(&self) -> impl Iterator<Item = &UnitState> {
        std::iter::once(&self.player)
            .chain(self.allies.iter())
            .chain(self.enemies.iter())
    }

    /// Iterates over the units of one side.
    pub fn side_units_mut(&mut self, side: Side) -> Box<dyn Iterator<Item = &mut UnitState> + '_> {
        match side {
            Side::Player => Box::new(std::iter::once(&mut self.player).chain(self.allies.iter_mut())),
            Side::Enemy => Box::new(self.enemies.iter_mut()),
        }
    }

    /// Returns the living unit standing on `position`, if any.
    pub fn occupant(&self, position: Position) -> Option<&UnitState> {
        self.units()
            .find(|unit| unit.is_alive() && unit.position == position)
    }

    pub fn alive_enemies(&self) -> impl Iterator<Item = &UnitState> {
        self.enemies.iter().filter(|enemy| enemy.is_alive())
    }

    /// Removes defeated enemies from the roster and returns them.
    pub fn prune_defeated_enemies(&mut self) -> Vec<UnitState> {
        let (alive, defeated) = std::mem::take(&mut self.enemies)
            .into_iter()
            .partition(|enemy| enemy.is_alive());
        self.enemies = alive;
        defeated
    }
}

/// Enemies alive in `before` that are absent or at zero HP in `after`.
///
/// This is the only source of kill triggers. Enemies that were already dead
/// in `before`, or that never existed there, are never reported.
pub fn newly_defeated<'a>(before: &'a SessionState, after: &SessionState) -> Vec<&'a UnitState> {
    before
        .alive_enemies()
        .filter(|enemy| {
            after
                .enemies
                .iter()
                .find(|candidate| candidate.id == enemy.id)
                .is_none_or(|candidate| !candidate.is_alive())
        })
        .collect()
}

fn spawn(id: UnitId, template: &UnitTemplate) -> UnitState {
    UnitState {
        id,
        entity: template.entity.clone(),
        name: template.name.clone(),
        level: template.level,
        position: template.position,
        hp: template.max_hp,
        max_hp: template.max_hp,
        sp: template.max_sp,
        max_sp: template.max_sp,
        attack: template.attack,
        defense: template.defense,
        move_range: template.move_range,
        attack_range: template.attack_range,
        experience: template.experience,
        status: StatusEffects::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::small_config;

    #[test]
    fn from_config_issues_stable_ids() {
        let state = SessionState::from_config(&small_config(), 7);
        assert_eq!(state.player.id, UnitId::player());
        assert_eq!(state.allies[0].id, UnitId::from("a1"));
        assert_eq!(state.enemies[0].id, UnitId::from("e1"));
        assert_eq!(state.turn.turn, 1);
        assert_eq!(state.turn.phase, Phase::Player);
        assert_eq!(state.enemies[0].hp, 10);
    }

    #[test]
    fn side_lookup() {
        let state = SessionState::from_config(&small_config(), 7);
        assert_eq!(state.side_of(&UnitId::player()), Some(Side::Player));
        assert_eq!(state.side_of(&UnitId::from("a1")), Some(Side::Player));
        assert_eq!(state.side_of(&UnitId::from("e1")), Some(Side::Enemy));
        assert_eq!(state.side_of(&UnitId::from("e9")), None);
    }

    #[test]
    fn newly_defeated_ignores_already_dead_and_unknown() {
        let config = small_config();
        let mut before = SessionState::from_config(&config, 1);
        let mut ghost = before.enemies[0].clone();
        ghost.id = UnitId::from("e2");
        ghost.hp = 0;
        before.enemies.push(ghost);

        let mut after = before.clone();
        after.enemies.clear();

        let defeated = newly_defeated(&before, &after);
        assert_eq!(defeated.len(), 1);
        assert_eq!(defeated[0].id, UnitId::from("e1"));
    }

    #[test]
    fn prune_keeps_living() {
        let mut state = SessionState::from_config(&small_config(), 1);
        state.enemies[0].hp = 0;
        let defeated = state.prune_defeated_enemies();
        assert_eq!(defeated.len(), 1);
        assert!(state.enemies.is_empty());
    }
}
