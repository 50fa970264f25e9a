use super::{Position, StatusEffects, UnitId};

/// A single unit on the map: the player, an ally, or an enemy.
///
/// Resources are unsigned; client-submitted values that may be negative are
/// handled by [`crate::validate::UnitPatch`] before they reach this type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitState {
    pub id: UnitId,
    /// Content key of the entity (e.g. `slime`). Used for rendering and logs.
    pub entity: String,
    pub name: String,
    pub level: u32,
    pub position: Position,

    pub hp: u32,
    pub max_hp: u32,
    pub sp: u32,
    pub max_sp: u32,

    pub attack: u32,
    pub defense: u32,
    /// Tiles reachable by a single move (Manhattan distance).
    pub move_range: u32,
    /// Reach of a basic attack (Chebyshev distance).
    pub attack_range: u32,

    /// Experience granted when this unit is defeated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub experience: u64,

    #[cfg_attr(feature = "serde", serde(default))]
    pub status: StatusEffects,
}

impl UnitState {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Applies damage, clamping HP at zero. Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restores HP up to the maximum. Returns the amount actually restored.
    pub fn restore_hp(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += restored;
        restored
    }

    /// Restores SP up to the maximum. Returns the amount actually restored.
    pub fn restore_sp(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_sp.saturating_sub(self.sp));
        self.sp += restored;
        restored
    }

    /// Spends SP, failing without mutation when the pool is too small.
    pub fn spend_sp(&mut self, amount: u32) -> bool {
        if self.sp < amount {
            return false;
        }
        self.sp -= amount;
        true
    }

    /// Clamps both resources into `[0, max]`.
    pub fn clamp_resources(&mut self) {
        self.hp = self.hp.min(self.max_hp);
        self.sp = self.sp.min(self.max_sp);
    }
}

#[cfg(test)]
pub(crate) fn test_unit(id: &str, position: Position) -> UnitState {
    UnitState {
        id: UnitId::from(id),
        entity: "test".into(),
        name: id.into(),
        level: 1,
        position,
        hp: 20,
        max_hp: 20,
        sp: 10,
        max_sp: 10,
        attack: 6,
        defense: 2,
        move_range: 3,
        attack_range: 1,
        experience: 0,
        status: StatusEffects::empty(),
    }
}
