//! Session configuration: the immutable document snapshotted at quest start.
//!
//! Map layout, walls, portal, rosters, chests and dialogue triggers come from
//! external game-design data. Gameplay never mutates a [`SessionConfig`]; any
//! client-submitted copy of these fields is ignored.

use std::collections::{BTreeMap, BTreeSet};

use crate::state::Position;

/// Compile-time limits shared across the crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameConfig;

impl GameConfig {
    pub const MAX_STATUS_EFFECTS: usize = 5;
    pub const MAX_SKILL_TARGETS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MOVE_RANGE: u32 = 3;
    pub const DEFAULT_ATTACK_RANGE: u32 = 1;
}

/// Dimensions of the tile grid. Valid coordinates are `0..width` x `0..height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapLayout {
    pub width: u32,
    pub height: u32,
}

impl MapLayout {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }
}

/// Template used to spawn the player, allies and enemies.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTemplate {
    pub entity: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default = "default_level"))]
    pub level: u32,
    pub position: Position,
    pub max_hp: u32,
    pub max_sp: u32,
    pub attack: u32,
    pub defense: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_move_range"))]
    pub move_range: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_attack_range"))]
    pub attack_range: u32,
    /// Experience granted when this unit is defeated (enemies only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub experience: u64,
}

#[cfg(feature = "serde")]
fn default_level() -> u32 {
    1
}

#[cfg(feature = "serde")]
fn default_move_range() -> u32 {
    GameConfig::DEFAULT_MOVE_RANGE
}

#[cfg(feature = "serde")]
fn default_attack_range() -> u32 {
    GameConfig::DEFAULT_ATTACK_RANGE
}

/// A chest that can be opened once per session for a gold reward.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChestSpec {
    pub id: String,
    pub position: Position,
    pub gold: u64,
}

/// Dialogue shown the first time the player steps onto `position`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DialogueTrigger {
    pub id: String,
    pub position: Position,
}

/// Immutable per-session configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    pub map: MapLayout,
    #[cfg_attr(feature = "serde", serde(default))]
    pub walls: BTreeSet<Position>,
    pub portal: Position,
    pub player: UnitTemplate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub allies: Vec<UnitTemplate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub enemies: Vec<UnitTemplate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub chests: Vec<ChestSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dialogues: Vec<DialogueTrigger>,
}

impl SessionConfig {
    /// Returns true if the tile is inside the map and not a wall.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.map.contains(position) && !self.walls.contains(&position)
    }

    pub fn chest(&self, id: &str) -> Option<&ChestSpec> {
        self.chests.iter().find(|chest| chest.id == id)
    }

    /// Dialogue trigger located at `position`, if any.
    pub fn dialogue_at(&self, position: Position) -> Option<&DialogueTrigger> {
        self.dialogues.iter().find(|d| d.position == position)
    }

    pub fn has_dialogue(&self, id: &str) -> bool {
        self.dialogues.iter().any(|d| d.id == id)
    }

    /// Chests keyed by id, for snapshot rendering.
    pub fn chests_by_id(&self) -> BTreeMap<&str, &ChestSpec> {
        self.chests.iter().map(|c| (c.id.as_str(), c)).collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn template(entity: &str, position: Position, max_hp: u32) -> UnitTemplate {
        UnitTemplate {
            entity: entity.into(),
            name: entity.into(),
            level: 1,
            position,
            max_hp,
            max_sp: 10,
            attack: 6,
            defense: 2,
            move_range: GameConfig::DEFAULT_MOVE_RANGE,
            attack_range: GameConfig::DEFAULT_ATTACK_RANGE,
            experience: 10,
        }
    }

    /// 8x8 map, player at origin, one slime (10 hp) at (2, 0), portal in the corner.
    pub fn small_config() -> SessionConfig {
        SessionConfig {
            map: MapLayout::new(8, 8),
            walls: [Position::new(3, 3)].into_iter().collect(),
            portal: Position::new(7, 7),
            player: template("hero", Position::ORIGIN, 30),
            allies: vec![template("squire", Position::new(0, 1), 20)],
            enemies: vec![template("slime", Position::new(2, 0), 10)],
            chests: vec![ChestSpec {
                id: "c1".into(),
                position: Position::new(1, 2),
                gold: 25,
            }],
            dialogues: vec![DialogueTrigger {
                id: "intro".into(),
                position: Position::new(1, 0),
            }],
        }
    }
}
