use std::collections::HashMap;

use crate::state::StatusEffectKind;

/// Oracle providing combat balance parameters and skill definitions.
///
/// Skills, multipliers and costs are external game-design data; this trait
/// is the seam where that data enters the rules.
pub trait TablesOracle: Send + Sync {
    fn combat(&self) -> CombatParams;
    fn skill(&self, id: &str) -> Option<&SkillDefinition>;
}

/// Balance parameters for damage resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatParams {
    /// Defense is divided by this before being subtracted from offense.
    pub defense_divisor: u32,
    /// Floor applied to every damaging hit.
    pub minimum_damage: u32,
    /// Multiplier of a basic attack, in percent.
    pub basic_attack_multiplier: u32,
}

impl CombatParams {
    pub const fn new(defense_divisor: u32, minimum_damage: u32, basic_attack_multiplier: u32) -> Self {
        Self {
            defense_divisor,
            minimum_damage,
            basic_attack_multiplier,
        }
    }
}

impl Default for CombatParams {
    fn default() -> Self {
        Self::new(2, 1, 100)
    }
}

/// What a skill does to its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum SkillKind {
    /// Deals damage scaled by the caster's attack.
    Damage,
    /// Restores HP scaled by the caster's attack.
    Heal,
    /// Restores SP scaled by the caster's attack.
    Recharge,
}

/// Which units a skill may be aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum SkillTargeting {
    /// Living units of the opposing side.
    Enemy,
    /// Living units of the caster's side, including the caster.
    Ally,
    /// Only the caster.
    SelfOnly,
}

/// Probabilistic status effect attached to an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectSpec {
    pub kind: StatusEffectKind,
    /// Chance to apply per target, in percent (0-100).
    pub chance: u32,
    /// Duration in the affected unit's turns.
    pub duration: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    pub kind: SkillKind,
    pub targeting: SkillTargeting,
    pub sp_cost: u32,
    /// Power multiplier in percent of the caster's attack.
    pub multiplier: u32,
    /// Chebyshev range from the caster to each target.
    pub range: u32,
    pub max_targets: u32,
    pub effect: Option<StatusEffectSpec>,
}

/// In-memory tables built from loaded game-design data.
#[derive(Clone, Debug, Default)]
pub struct StaticTables {
    combat: CombatParams,
    skills: HashMap<String, SkillDefinition>,
}

impl StaticTables {
    pub fn new(combat: CombatParams) -> Self {
        Self {
            combat,
            skills: HashMap::new(),
        }
    }

    /// Registers a skill (builder pattern). Later registrations replace earlier ones.
    #[must_use]
    pub fn with_skill(mut self, skill: SkillDefinition) -> Self {
        self.skills.insert(skill.id.clone(), skill);
        self
    }

    pub fn with_skills(self, skills: impl IntoIterator<Item = SkillDefinition>) -> Self {
        skills.into_iter().fold(self, Self::with_skill)
    }
}

impl TablesOracle for StaticTables {
    fn combat(&self) -> CombatParams {
        self.combat
    }

    fn skill(&self, id: &str) -> Option<&SkillDefinition> {
        self.skills.get(id)
    }
}
