//! Combat resolution types and the calculator entry point.

use crate::env::{
    CombatParams, RngOracle, SkillDefinition, SkillKind, StatusEffectSpec, compute_seed,
};
use crate::state::{CombatLogEntry, Phase, SessionState, StatusEffectKind, UnitId, UnitState};

use super::damage::{calculate_damage, calculate_restoration};

/// The action being resolved.
#[derive(Clone, Copy, Debug)]
pub enum CombatAction<'a> {
    BasicAttack,
    Skill(&'a SkillDefinition),
}

impl CombatAction<'_> {
    fn log_key(&self) -> &'static str {
        match self {
            CombatAction::BasicAttack => "attack",
            CombatAction::Skill(_) => "skill",
        }
    }
}

/// Everything the calculator needs besides the units themselves.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub params: CombatParams,
    pub rng: &'a dyn RngOracle,
    pub session_seed: u64,
    pub nonce: u64,
    pub turn: u32,
    pub phase: Phase,
}

/// Numeric outcome for a single target.
///
/// `hp_delta` and `sp_delta` are losses: positive means the resource went
/// down, negative means it was restored. Deltas are the amounts that will
/// actually change, already clamped to the target's current pools.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetOutcome {
    pub id: UnitId,
    pub hp_delta: i64,
    pub sp_delta: i64,
    pub status_effects_applied: Vec<StatusEffectKind>,
    pub defeated: bool,
}

/// Complete result of resolving one action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatResolution {
    pub attacker: UnitId,
    /// SP paid by the attacker.
    pub sp_cost: u32,
    pub targets: Vec<TargetOutcome>,
    pub log_entries: Vec<CombatLogEntry>,
}

/// Resolve a single action into numeric outcomes.
///
/// Pure: no state is mutated and randomness comes only from `ctx.rng`
/// seeded by `(session_seed, nonce, attacker, target index)`.
pub fn resolve(
    action: CombatAction<'_>,
    attacker: &UnitState,
    targets: &[&UnitState],
    ctx: &ResolveContext<'_>,
) -> CombatResolution {
    let (kind, multiplier, effect, sp_cost) = match action {
        CombatAction::BasicAttack => (SkillKind::Damage, ctx.params.basic_attack_multiplier, None, 0),
        CombatAction::Skill(skill) => (skill.kind, skill.multiplier, skill.effect, skill.sp_cost),
    };

    let mut header = CombatLogEntry::new(ctx.turn, ctx.phase, action.log_key())
        .with("attacker", &attacker.id);
    if let CombatAction::Skill(skill) = action {
        header = header.with("skill", &skill.id);
    }
    let mut log_entries = vec![header];

    let outcomes = targets
        .iter()
        .enumerate()
        .map(|(index, target)| {
            let outcome = match kind {
                SkillKind::Damage => {
                    resolve_damage(attacker, target, multiplier, effect, index as u32, ctx)
                }
                SkillKind::Heal => {
                    let amount = calculate_restoration(attacker.attack, multiplier);
                    let restored = amount.min(target.max_hp.saturating_sub(target.hp));
                    TargetOutcome {
                        id: target.id.clone(),
                        hp_delta: -i64::from(restored),
                        sp_delta: 0,
                        status_effects_applied: Vec::new(),
                        defeated: false,
                    }
                }
                SkillKind::Recharge => {
                    let amount = calculate_restoration(attacker.attack, multiplier);
                    let restored = amount.min(target.max_sp.saturating_sub(target.sp));
                    TargetOutcome {
                        id: target.id.clone(),
                        hp_delta: 0,
                        sp_delta: -i64::from(restored),
                        status_effects_applied: Vec::new(),
                        defeated: false,
                    }
                }
            };
            log_entries.extend(outcome_log(&outcome, target, effect, ctx));
            outcome
        })
        .collect();

    CombatResolution {
        attacker: attacker.id.clone(),
        sp_cost,
        targets: outcomes,
        log_entries,
    }
}

fn resolve_damage(
    attacker: &UnitState,
    target: &UnitState,
    multiplier: u32,
    effect: Option<StatusEffectSpec>,
    index: u32,
    ctx: &ResolveContext<'_>,
) -> TargetOutcome {
    let damage = calculate_damage(attacker.attack, target.defense, multiplier, ctx.params);
    let dealt = damage.min(target.hp);
    let defeated = target.hp > 0 && dealt == target.hp;

    let mut applied = Vec::new();
    if let Some(spec) = effect.filter(|_| !defeated) {
        let seed = compute_seed(ctx.session_seed, ctx.nonce, attacker.id.as_str(), index);
        if ctx.rng.chance(seed, spec.chance) && spec.duration > 0 {
            applied.push(spec.kind);
        }
    }

    TargetOutcome {
        id: target.id.clone(),
        hp_delta: i64::from(dealt),
        sp_delta: 0,
        status_effects_applied: applied,
        defeated,
    }
}

fn outcome_log(
    outcome: &TargetOutcome,
    target: &UnitState,
    effect: Option<StatusEffectSpec>,
    ctx: &ResolveContext<'_>,
) -> Vec<CombatLogEntry> {
    let entry = |key: &str| CombatLogEntry::new(ctx.turn, ctx.phase, key).with("target", &outcome.id);
    let mut entries = Vec::new();

    if outcome.hp_delta > 0 {
        entries.push(entry("damage").with("amount", outcome.hp_delta));
    } else if outcome.hp_delta < 0 {
        entries.push(entry("heal").with("amount", -outcome.hp_delta));
    }
    if outcome.sp_delta < 0 {
        entries.push(entry("recharge").with("amount", -outcome.sp_delta));
    }
    for kind in &outcome.status_effects_applied {
        let duration = effect.map(|spec| spec.duration).unwrap_or_default();
        entries.push(entry("status").with("effect", kind).with("duration", duration));
    }
    if outcome.defeated {
        entries.push(entry("defeated").with("entity", &target.entity));
    }
    entries
}

impl CombatResolution {
    /// Applies the resolved deltas to `state`.
    ///
    /// The attacker pays `sp_cost`; each target's HP/SP change by their deltas
    /// and newly applied effects are added with the action's duration.
    pub fn apply_to(&self, state: &mut SessionState, effect: Option<StatusEffectSpec>) {
        if let Some(attacker) = state.unit_mut(&self.attacker) {
            attacker.spend_sp(self.sp_cost);
        }

        for outcome in &self.targets {
            let Some(unit) = state.unit_mut(&outcome.id) else {
                continue;
            };
            apply_delta(unit, outcome);
            if let Some(spec) = effect {
                for kind in &outcome.status_effects_applied {
                    unit.status.add(*kind, spec.duration);
                }
            }
        }
    }
}

fn apply_delta(unit: &mut UnitState, outcome: &TargetOutcome) {
    let magnitude = |delta: i64| u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);

    if outcome.hp_delta > 0 {
        unit.take_damage(magnitude(outcome.hp_delta));
    } else if outcome.hp_delta < 0 {
        unit.restore_hp(magnitude(outcome.hp_delta));
    }

    if outcome.sp_delta > 0 {
        unit.sp = unit.sp.saturating_sub(magnitude(outcome.sp_delta));
    } else if outcome.sp_delta < 0 {
        unit.restore_sp(magnitude(outcome.sp_delta));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{PcgRng, SkillTargeting};
    use crate::state::{Position, test_unit};

    fn ctx(rng: &PcgRng) -> ResolveContext<'_> {
        ResolveContext {
            params: CombatParams::default(),
            rng,
            session_seed: 9,
            nonce: 0,
            turn: 1,
            phase: Phase::Player,
        }
    }

    fn skill(kind: SkillKind, effect: Option<StatusEffectSpec>) -> SkillDefinition {
        SkillDefinition {
            id: "fire".into(),
            name: "Fire".into(),
            kind,
            targeting: SkillTargeting::Enemy,
            sp_cost: 4,
            multiplier: 200,
            range: 3,
            max_targets: 2,
            effect,
        }
    }

    #[test]
    fn basic_attack_defeats_weak_target() {
        let rng = PcgRng;
        let attacker = test_unit("player", Position::ORIGIN);
        let mut slime = test_unit("e1", Position::new(1, 0));
        slime.hp = 3;

        let resolution = resolve(CombatAction::BasicAttack, &attacker, &[&slime], &ctx(&rng));
        let outcome = &resolution.targets[0];
        assert_eq!(outcome.hp_delta, 3);
        assert!(outcome.defeated);
        assert!(resolution.log_entries.iter().any(|e| e.key == "defeated"));
    }

    #[test]
    fn guaranteed_effect_is_applied_to_survivors() {
        let rng = PcgRng;
        let attacker = test_unit("player", Position::ORIGIN);
        let target = test_unit("e1", Position::new(1, 0));
        let burn = StatusEffectSpec {
            kind: StatusEffectKind::Burn,
            chance: 100,
            duration: 2,
        };
        let fire = skill(SkillKind::Damage, Some(burn));

        let resolution = resolve(CombatAction::Skill(&fire), &attacker, &[&target], &ctx(&rng));
        assert_eq!(resolution.sp_cost, 4);
        assert_eq!(
            resolution.targets[0].status_effects_applied,
            vec![StatusEffectKind::Burn]
        );
    }

    #[test]
    fn zero_chance_never_applies() {
        let rng = PcgRng;
        let attacker = test_unit("player", Position::ORIGIN);
        let target = test_unit("e1", Position::new(1, 0));
        let frost = skill(
            SkillKind::Damage,
            Some(StatusEffectSpec {
                kind: StatusEffectKind::Freeze,
                chance: 0,
                duration: 2,
            }),
        );
        let resolution = resolve(CombatAction::Skill(&frost), &attacker, &[&target], &ctx(&rng));
        assert!(resolution.targets[0].status_effects_applied.is_empty());
    }

    #[test]
    fn heal_reports_negative_delta_clamped_to_missing_hp() {
        let rng = PcgRng;
        let caster = test_unit("player", Position::ORIGIN);
        let mut ally = test_unit("a1", Position::new(0, 1));
        ally.hp = 15;

        let heal = skill(SkillKind::Heal, None);
        let resolution = resolve(CombatAction::Skill(&heal), &caster, &[&ally], &ctx(&rng));
        assert_eq!(resolution.targets[0].hp_delta, -5);
    }

    #[test]
    fn apply_to_updates_state() {
        let rng = PcgRng;
        let config = crate::config::fixtures::small_config();
        let mut state = SessionState::from_config(&config, 1);
        let burn = StatusEffectSpec {
            kind: StatusEffectKind::Burn,
            chance: 100,
            duration: 2,
        };
        let mut fire = skill(SkillKind::Damage, Some(burn));
        fire.multiplier = 50;

        let attacker = state.player.clone();
        let target = state.allies[0].clone();
        let resolution = resolve(CombatAction::Skill(&fire), &attacker, &[&target], &ctx(&rng));
        resolution.apply_to(&mut state, fire.effect);

        assert_eq!(state.player.sp, state.player.max_sp - 4);
        assert!(state.allies[0].hp < state.allies[0].max_hp);
        assert_eq!(state.allies[0].status.remaining(StatusEffectKind::Burn), Some(2));
    }

    #[test]
    fn resolution_is_deterministic() {
        let rng = PcgRng;
        let attacker = test_unit("player", Position::ORIGIN);
        let target = test_unit("e1", Position::new(1, 0));
        let poison = skill(
            SkillKind::Damage,
            Some(StatusEffectSpec {
                kind: StatusEffectKind::Poison,
                chance: 50,
                duration: 3,
            }),
        );
        let first = resolve(CombatAction::Skill(&poison), &attacker, &[&target], &ctx(&rng));
        let second = resolve(CombatAction::Skill(&poison), &attacker, &[&target], &ctx(&rng));
        assert_eq!(first, second);
    }
}
