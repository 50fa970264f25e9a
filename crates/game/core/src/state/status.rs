//! Status effect system for units.
//!
//! Status effects are temporary conditions applied by attacks and skills.
//!
//! # Turn-based Duration
//!
//! Each effect carries a `remaining` counter. Damage-over-time lands at the
//! start of every phase owned by the affected unit's side; the counter is
//! decremented when that phase ends. An effect with `remaining == N` is
//! therefore active for exactly N of the unit's own phases.

use arrayvec::ArrayVec;

use crate::config::GameConfig;

/// Active status effects on a unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { GameConfig::MAX_STATUS_EFFECTS }>,
}

/// A single status effect with its remaining duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    /// Number of the unit's own turns left before the effect expires.
    pub remaining: u32,
}

/// Types of status effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum StatusEffectKind {
    /// Cannot act.
    Stun,
    /// Fire damage over time.
    Burn,
    /// HP loss over time.
    Poison,
    /// Cannot act.
    Freeze,
    /// HP loss over time.
    Bleed,
}

impl StatusEffectKind {
    /// Returns true if this effect prevents the unit from moving or acting.
    pub const fn incapacitates(self) -> bool {
        matches!(self, Self::Stun | Self::Freeze)
    }

    /// Damage dealt to the affected unit each time the effect ticks.
    pub const fn tick_damage(self) -> u32 {
        match self {
            Self::Burn => 3,
            Self::Poison => 2,
            Self::Bleed => 2,
            Self::Stun | Self::Freeze => 0,
        }
    }
}

impl StatusEffects {
    /// Creates an empty status effect set.
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Checks if a specific status effect is active.
    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Returns true if any active effect prevents acting.
    pub fn is_incapacitated(&self) -> bool {
        self.effects.iter().any(|e| e.kind.incapacitates())
    }

    /// Remaining duration of an effect, if active.
    pub fn remaining(&self, kind: StatusEffectKind) -> Option<u32> {
        self.effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.remaining)
    }

    /// Adds a status effect with the given duration.
    ///
    /// If the effect already exists, the longer of the two durations is kept.
    /// Zero-length effects are ignored. Returns true if the set changed.
    pub fn add(&mut self, kind: StatusEffectKind, duration: u32) -> bool {
        if duration == 0 {
            return false;
        }

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            let before = existing.remaining;
            existing.remaining = existing.remaining.max(duration);
            return existing.remaining != before;
        }

        if self.effects.is_full() {
            return false;
        }
        self.effects.push(StatusEffect {
            kind,
            remaining: duration,
        });
        true
    }

    /// Removes a status effect immediately.
    pub fn remove(&mut self, kind: StatusEffectKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    /// Total damage-over-time dealt at the start of the unit's phase.
    pub fn pending_damage(&self) -> u32 {
        self.effects.iter().map(|e| e.kind.tick_damage()).sum()
    }

    /// Decrements every counter once and drops expired effects.
    ///
    /// Called when the unit's side ends its phase. Returns the effects that
    /// ran out.
    pub fn decay(&mut self) -> Vec<StatusEffectKind> {
        let mut expired = Vec::new();
        for effect in self.effects.iter_mut() {
            effect.remaining = effect.remaining.saturating_sub(1);
            if effect.remaining == 0 {
                expired.push(effect.kind);
            }
        }
        self.effects.retain(|e| e.remaining > 0);
        expired
    }

    /// Returns an iterator over all active effects.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    /// Returns true if no status effects are active.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
