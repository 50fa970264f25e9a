use crate::state::{Phase, Position, UnitId, UnitState};

/// Client-authored candidate state for an explore submission.
///
/// Carries only the fields a client may legitimately author. Map layout,
/// walls, portal, chests and rosters are absent on purpose: they are taken
/// from the session config and never from the client.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateProposal {
    pub turn: u32,
    pub phase: Phase,
    pub player: UnitPatch,
    #[cfg_attr(feature = "serde", serde(default))]
    pub allies: Vec<UnitPatch>,
    /// Enemies still on the map. Omitted enemies are treated as removed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enemies: Vec<UnitPatch>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub acted: Vec<UnitId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dialogues_shown: Vec<String>,
}

/// Client-authored unit fields. Resources are signed so that tampered
/// negative values reach the validator instead of failing deserialization.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitPatch {
    pub id: UnitId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: Option<Position>,
    pub hp: i64,
    pub sp: i64,
}

impl UnitPatch {
    /// Mirrors a unit's current values.
    pub fn from_unit(unit: &UnitState) -> Self {
        Self {
            id: unit.id.clone(),
            position: Some(unit.position),
            hp: i64::from(unit.hp),
            sp: i64::from(unit.sp),
        }
    }
}

impl StateProposal {
    /// A proposal that restates `state` unchanged.
    pub fn echo(state: &crate::state::SessionState) -> Self {
        Self {
            turn: state.turn.turn,
            phase: state.turn.phase,
            player: UnitPatch::from_unit(&state.player),
            allies: state.allies.iter().map(UnitPatch::from_unit).collect(),
            enemies: state
                .alive_enemies()
                .map(UnitPatch::from_unit)
                .collect(),
            acted: state.turn.acted.iter().cloned().collect(),
            dialogues_shown: state.dialogues_shown.iter().cloned().collect(),
        }
    }

    /// Every unit patch: player first, then allies, then enemies.
    pub fn patches(&self) -> impl Iterator<Item = &UnitPatch> {
        std::iter::once(&self.player)
            .chain(&self.allies)
            .chain(&self.enemies)
    }

    pub fn patch(&self, id: &UnitId) -> Option<&UnitPatch> {
        self.patches().find(|patch| &patch.id == id)
    }

    pub fn enemy(&self, id: &UnitId) -> Option<&UnitPatch> {
        self.enemies.iter().find(|patch| &patch.id == id)
    }

    pub fn ally(&self, id: &UnitId) -> Option<&UnitPatch> {
        self.allies.iter().find(|patch| &patch.id == id)
    }
}
