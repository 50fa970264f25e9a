//! Versioned wire schema.
//!
//! These types are what clients send and receive. They are deliberately
//! separate from the core state so the internal representation can change
//! without breaking clients. Every response carries [`WIRE_SCHEMA_VERSION`].

use serde::{Deserialize, Serialize};

use tactics_core::{
    ActionResult, AttackAction, CastAction, CombatLogEntry, CombatResolution, EndTurnAction,
    Intent, MoveAction, OpenChestAction, Phase, Position, SessionConfig, SessionState,
    SessionStatus, StateProposal, UnitId, UnitPatch, UnitState, ValidationError,
};

use crate::repository::{RewardPayload, TriggerType};

pub const WIRE_SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Snapshot
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub width: u32,
    pub height: u32,
    pub walls: Vec<Position>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub kind: String,
    pub remaining: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub entity: String,
    pub name: String,
    pub level: u32,
    pub x: i32,
    pub y: i32,
    pub hp: u32,
    pub max_hp: u32,
    pub sp: u32,
    pub max_sp: u32,
    pub attack: u32,
    pub defense: u32,
    pub move_range: u32,
    pub attack_range: u32,
    pub status: Vec<StatusView>,
}

impl From<&UnitState> for UnitView {
    fn from(unit: &UnitState) -> Self {
        Self {
            id: unit.id.clone(),
            entity: unit.entity.clone(),
            name: unit.name.clone(),
            level: unit.level,
            x: unit.position.x,
            y: unit.position.y,
            hp: unit.hp,
            max_hp: unit.max_hp,
            sp: unit.sp,
            max_sp: unit.max_sp,
            attack: unit.attack,
            defense: unit.defense,
            move_range: unit.move_range,
            attack_range: unit.attack_range,
            status: unit
                .status
                .iter()
                .map(|effect| StatusView {
                    kind: effect.kind.to_string(),
                    remaining: effect.remaining,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestView {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub gold: u64,
    pub opened: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueView {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub shown: bool,
}

/// Full renderable state of an explore session (or battle).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExploreSnapshot {
    pub schema_version: u32,
    pub session: String,
    pub status: SessionStatus,
    pub map: MapView,
    pub portal: Position,
    pub turn: u32,
    pub phase: Phase,
    pub player: UnitView,
    pub allies: Vec<UnitView>,
    pub enemies: Vec<UnitView>,
    pub acted: Vec<UnitId>,
    pub chests: Vec<ChestView>,
    pub dialogues: Vec<DialogueView>,
    pub logs: Vec<CombatLogEntry>,
}

impl ExploreSnapshot {
    pub fn build(
        session: &str,
        status: SessionStatus,
        config: &SessionConfig,
        state: &SessionState,
        logs: Vec<CombatLogEntry>,
    ) -> Self {
        Self {
            schema_version: WIRE_SCHEMA_VERSION,
            session: session.to_owned(),
            status,
            map: MapView {
                width: config.map.width,
                height: config.map.height,
                walls: config.walls.iter().copied().collect(),
            },
            portal: config.portal,
            turn: state.turn.turn,
            phase: state.turn.phase,
            player: UnitView::from(&state.player),
            allies: state.allies.iter().map(UnitView::from).collect(),
            enemies: state.enemies.iter().map(UnitView::from).collect(),
            acted: state.turn.acted.iter().cloned().collect(),
            chests: config
                .chests
                .iter()
                .map(|chest| ChestView {
                    id: chest.id.clone(),
                    x: chest.position.x,
                    y: chest.position.y,
                    gold: chest.gold,
                    opened: state.opened_chests.contains(&chest.id),
                })
                .collect(),
            dialogues: config
                .dialogues
                .iter()
                .map(|dialogue| DialogueView {
                    id: dialogue.id.clone(),
                    x: dialogue.position.x,
                    y: dialogue.position.y,
                    shown: state.dialogues_shown.contains(&dialogue.id),
                })
                .collect(),
            logs,
        }
    }
}

// ============================================================================
// State submission
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedUnit {
    pub id: UnitId,
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    pub hp: i64,
    pub sp: i64,
}

impl SubmittedUnit {
    fn into_patch(self) -> UnitPatch {
        let position = match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Position::new(x, y)),
            _ => None,
        };
        UnitPatch {
            id: self.id,
            position,
            hp: self.hp,
            sp: self.sp,
        }
    }
}

impl From<&UnitState> for SubmittedUnit {
    fn from(unit: &UnitState) -> Self {
        Self {
            id: unit.id.clone(),
            x: Some(unit.position.x),
            y: Some(unit.position.y),
            hp: i64::from(unit.hp),
            sp: i64::from(unit.sp),
        }
    }
}

/// Client-computed explore state.
///
/// Fields the client may not author (map, walls, portal, chests) are not
/// declared, so any copy the client sends is dropped during decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSubmission {
    #[serde(default)]
    pub schema_version: Option<u32>,
    pub turn: u32,
    pub phase: Phase,
    pub player: SubmittedUnit,
    #[serde(default)]
    pub allies: Vec<SubmittedUnit>,
    #[serde(default)]
    pub enemies: Vec<SubmittedUnit>,
    #[serde(default)]
    pub acted: Vec<UnitId>,
    #[serde(default)]
    pub dialogues_shown: Vec<String>,
    #[serde(default)]
    pub logs: Vec<CombatLogEntry>,
}

impl StateSubmission {
    /// A submission restating `state` unchanged.
    pub fn echo(state: &SessionState) -> Self {
        Self {
            schema_version: Some(WIRE_SCHEMA_VERSION),
            turn: state.turn.turn,
            phase: state.turn.phase,
            player: SubmittedUnit::from(&state.player),
            allies: state.allies.iter().map(SubmittedUnit::from).collect(),
            enemies: state.enemies.iter().map(SubmittedUnit::from).collect(),
            acted: state.turn.acted.iter().cloned().collect(),
            dialogues_shown: state.dialogues_shown.iter().cloned().collect(),
            logs: Vec::new(),
        }
    }

    /// Splits the submission into the core proposal and its log batch.
    pub fn into_proposal(self) -> (StateProposal, Vec<CombatLogEntry>) {
        let proposal = StateProposal {
            turn: self.turn,
            phase: self.phase,
            player: self.player.into_patch(),
            allies: self.allies.into_iter().map(SubmittedUnit::into_patch).collect(),
            enemies: self.enemies.into_iter().map(SubmittedUnit::into_patch).collect(),
            acted: self.acted,
            dialogues_shown: self.dialogues_shown,
        };
        (proposal, self.logs)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Intent as sent by the client, tagged by `action`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ActionRequest {
    Move {
        unit: UnitId,
        x: i32,
        y: i32,
    },
    Attack {
        attacker: UnitId,
        target: UnitId,
    },
    Skill {
        caster: UnitId,
        skill: String,
        targets: Vec<UnitId>,
    },
    EndTurn {
        turn: u32,
        phase: Phase,
    },
    OpenChest {
        unit: UnitId,
        chest: String,
    },
}

impl ActionRequest {
    pub fn into_intent(self) -> Intent {
        match self {
            ActionRequest::Move { unit, x, y } => {
                Intent::Move(MoveAction::new(unit, Position::new(x, y)))
            }
            ActionRequest::Attack { attacker, target } => {
                Intent::Attack(AttackAction::new(attacker, target))
            }
            ActionRequest::Skill {
                caster,
                skill,
                targets,
            } => Intent::Cast(CastAction::new(caster, skill, targets)),
            ActionRequest::EndTurn { turn, phase } => {
                Intent::EndTurn(EndTurnAction::new(turn, phase))
            }
            ActionRequest::OpenChest { unit, chest } => {
                Intent::OpenChest(OpenChestAction::new(unit, chest))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetView {
    pub id: UnitId,
    pub hp_delta: i64,
    pub sp_delta: i64,
    pub status_effects_applied: Vec<String>,
    pub defeated: bool,
}

/// Outcome details of one action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResultView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<UnitId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<TargetView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sp_cost: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<u64>,
}

impl ActionResultView {
    fn combat(resolution: &CombatResolution) -> Self {
        Self {
            actor: Some(resolution.attacker.clone()),
            targets: resolution
                .targets
                .iter()
                .map(|target| TargetView {
                    id: target.id.clone(),
                    hp_delta: target.hp_delta,
                    sp_delta: target.sp_delta,
                    status_effects_applied: target
                        .status_effects_applied
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                    defeated: target.defeated,
                })
                .collect(),
            sp_cost: Some(resolution.sp_cost),
            ..Self::default()
        }
    }
}

impl From<&ActionResult> for ActionResultView {
    fn from(result: &ActionResult) -> Self {
        match result {
            ActionResult::Move(outcome) => Self {
                actor: Some(outcome.actor.clone()),
                dialogue: outcome.dialogue.clone(),
                ..Self::default()
            },
            ActionResult::Attack(resolution) | ActionResult::Cast(resolution) => {
                Self::combat(resolution)
            }
            ActionResult::EndTurn(_) => Self::default(),
            ActionResult::OpenChest(outcome) => Self {
                chest: Some(outcome.chest.clone()),
                gold: Some(outcome.gold),
                ..Self::default()
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub schema_version: u32,
    pub success: bool,
    pub action: String,
    /// Position of the acting unit after the action, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub turn: u32,
    pub phase: Phase,
    pub result: ActionResultView,
    pub logs: Vec<CombatLogEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewards: Vec<RewardView>,
}

// ============================================================================
// Other responses
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardView {
    pub trigger_type: TriggerType,
    pub trigger_key: String,
    pub experience: u64,
    pub gold: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_experience: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl RewardView {
    pub fn new(trigger_type: TriggerType, trigger_key: String, payload: RewardPayload) -> Self {
        Self {
            trigger_type,
            trigger_key,
            experience: payload.experience,
            gold: payload.gold,
            total_experience: payload.total_experience,
            level: payload.level,
        }
    }
}

/// One validation issue as reported to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueView {
    pub code: String,
    pub kind: String,
    pub hard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitId>,
    pub message: String,
}

impl From<&ValidationError> for IssueView {
    fn from(issue: &ValidationError) -> Self {
        Self {
            code: issue.kind.code().to_owned(),
            kind: issue.kind.to_string(),
            hard: issue.is_hard(),
            unit: issue.unit.clone(),
            message: issue.message.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub schema_version: u32,
    pub success: bool,
    pub turn: u32,
    pub phase: Phase,
    /// Soft issues that were clamped or dropped.
    pub warnings: Vec<IssueView>,
    pub rewards: Vec<RewardView>,
    pub logs_appended: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub schema_version: u32,
    pub success: bool,
    pub status: SessionStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionKeyResponse {
    pub token: String,
    /// Base64 AES-256 key.
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleStarted {
    pub battle_uid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub uid: String,
    pub status: SessionStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleStateResponse {
    pub battle: BattleSummary,
    pub state: ExploreSnapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleSaveResponse {
    pub success: bool,
    pub warnings: Vec<IssueView>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleCompleteResponse {
    pub success: bool,
    pub defeated: Vec<UnitId>,
    pub rewards: Vec<RewardView>,
    pub turn: u32,
    pub phase: Phase,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_requests_use_kebab_case_tags() {
        let request: ActionRequest = serde_json::from_value(json!({
            "action": "end-turn",
            "turn": 3,
            "phase": "enemy",
        }))
        .unwrap();
        assert_eq!(
            request.into_intent(),
            Intent::EndTurn(EndTurnAction::new(3, Phase::Enemy))
        );

        let request: ActionRequest = serde_json::from_value(json!({
            "action": "skill",
            "caster": "player",
            "skill": "fire",
            "targets": ["e1", "e2"],
        }))
        .unwrap();
        assert!(matches!(request.into_intent(), Intent::Cast(cast) if cast.targets.len() == 2));
    }

    #[test]
    fn submission_ignores_client_map_fields() {
        let submission: StateSubmission = serde_json::from_value(json!({
            "turn": 1,
            "phase": "player",
            "player": {"id": "player", "x": 1, "y": 0, "hp": 30, "sp": 10},
            "walls": [],
            "portal": {"x": 0, "y": 0},
            "map": {"width": 99, "height": 99},
        }))
        .unwrap();
        let (proposal, logs) = submission.into_proposal();
        assert_eq!(proposal.player.position, Some(Position::new(1, 0)));
        assert!(proposal.enemies.is_empty());
        assert!(logs.is_empty());
    }

    #[test]
    fn partial_coordinates_leave_position_unset() {
        let unit = SubmittedUnit {
            id: UnitId::player(),
            x: Some(2),
            y: None,
            hp: 1,
            sp: 1,
        };
        assert_eq!(unit.into_patch().position, None);
    }
}
