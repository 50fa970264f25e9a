use std::collections::BTreeSet;

use crate::action::{ActionError, ActionTransition, ready_actor};
use crate::combat::{CombatAction, CombatResolution, ResolveContext, resolve};
use crate::config::GameConfig;
use crate::env::{GameEnv, SkillDefinition, SkillTargeting};
use crate::state::{SessionState, Side, UnitId, UnitState};

// ============================================================================
// Basic Attack
// ============================================================================

/// Basic attack against a single opposing unit within attack range.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackAction {
    pub actor: UnitId,
    pub target: UnitId,
}

impl AttackAction {
    pub fn new(actor: UnitId, target: UnitId) -> Self {
        Self { actor, target }
    }
}

impl ActionTransition for AttackAction {
    type Error = ActionError;
    type Result = CombatResolution;

    fn pre_validate(&self, state: &SessionState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let attacker = ready_actor(state, &self.actor)?;
        let target = living_target(state, &self.target, opposing(state, &self.actor))?;

        let distance = attacker.position.chebyshev(target.position);
        if distance > attacker.attack_range {
            return Err(ActionError::OutOfRange {
                distance,
                reach: attacker.attack_range,
            });
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut SessionState,
        env: &GameEnv<'_>,
    ) -> Result<CombatResolution, Self::Error> {
        let targets = [self.target.clone()];
        let resolution =
            resolve_against(state, env, CombatAction::BasicAttack, &self.actor, &targets)?;
        resolution.apply_to(state, None);
        state.turn.acted.insert(self.actor.clone());
        Ok(resolution)
    }
}

// ============================================================================
// Skill Cast
// ============================================================================

/// Skill invocation against one or more targets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastAction {
    pub actor: UnitId,
    pub skill: String,
    pub targets: Vec<UnitId>,
}

impl CastAction {
    pub fn new(actor: UnitId, skill: impl Into<String>, targets: Vec<UnitId>) -> Self {
        Self {
            actor,
            skill: skill.into(),
            targets,
        }
    }

    fn definition<'e>(&self, env: &GameEnv<'e>) -> Result<&'e SkillDefinition, ActionError> {
        env.tables()
            .skill(&self.skill)
            .ok_or_else(|| ActionError::SkillNotFound(self.skill.clone()))
    }
}

impl ActionTransition for CastAction {
    type Error = ActionError;
    type Result = CombatResolution;

    fn pre_validate(&self, state: &SessionState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let caster = ready_actor(state, &self.actor)?;
        let skill = self.definition(env)?;

        if self.targets.is_empty() {
            return Err(ActionError::NoTargets);
        }
        let max = (skill.max_targets as usize).clamp(1, GameConfig::MAX_SKILL_TARGETS);
        if self.targets.len() > max {
            return Err(ActionError::TooManyTargets {
                given: self.targets.len(),
                max,
            });
        }
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = self.targets.iter().find(|id| !seen.insert(*id)) {
            return Err(ActionError::DuplicateTarget(duplicate.clone()));
        }

        if caster.sp < skill.sp_cost {
            return Err(ActionError::InsufficientSp {
                required: skill.sp_cost,
                available: caster.sp,
            });
        }

        let own_side = state
            .side_of(&self.actor)
            .ok_or_else(|| ActionError::ActorNotFound(self.actor.clone()))?;
        for id in &self.targets {
            let target = match skill.targeting {
                SkillTargeting::Enemy => living_target(state, id, own_side.opponent())?,
                SkillTargeting::Ally => living_target(state, id, own_side)?,
                SkillTargeting::SelfOnly if id == &self.actor => caster,
                SkillTargeting::SelfOnly => return Err(ActionError::InvalidTarget(id.clone())),
            };
            let distance = caster.position.chebyshev(target.position);
            if distance > skill.range {
                return Err(ActionError::OutOfRange {
                    distance,
                    reach: skill.range,
                });
            }
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut SessionState,
        env: &GameEnv<'_>,
    ) -> Result<CombatResolution, Self::Error> {
        let skill = self.definition(env)?;
        let resolution =
            resolve_against(state, env, CombatAction::Skill(skill), &self.actor, &self.targets)?;
        resolution.apply_to(state, skill.effect);
        state.turn.acted.insert(self.actor.clone());
        Ok(resolution)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn opposing(state: &SessionState, actor: &UnitId) -> Side {
    state
        .side_of(actor)
        .map(Side::opponent)
        .unwrap_or(Side::Enemy)
}

fn living_target<'s>(
    state: &'s SessionState,
    id: &UnitId,
    side: Side,
) -> Result<&'s UnitState, ActionError> {
    let target = state
        .unit(id)
        .ok_or_else(|| ActionError::TargetNotFound(id.clone()))?;
    if state.side_of(id) != Some(side) || !target.is_alive() {
        return Err(ActionError::InvalidTarget(id.clone()));
    }
    Ok(target)
}

fn resolve_against(
    state: &SessionState,
    env: &GameEnv<'_>,
    action: CombatAction<'_>,
    actor: &UnitId,
    targets: &[UnitId],
) -> Result<CombatResolution, ActionError> {
    let attacker = state
        .unit(actor)
        .ok_or_else(|| ActionError::ActorNotFound(actor.clone()))?;
    let targets = targets
        .iter()
        .map(|id| {
            state
                .unit(id)
                .ok_or_else(|| ActionError::TargetNotFound(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ctx = ResolveContext {
        params: env.tables().combat(),
        rng: env.rng(),
        session_seed: state.seed,
        nonce: state.turn.action_nonce,
        turn: state.turn.turn,
        phase: state.turn.phase,
    };
    Ok(resolve(action, attacker, &targets, &ctx))
}
