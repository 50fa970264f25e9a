#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};

use session_runtime::api::ServiceError;
use session_runtime::{
    CharacterId, Envelope, RequestContext, RuntimeConfig, SessionService, SessionUid,
    TransportMode,
};
use tactics_core::{
    ChestSpec, DialogueTrigger, GameConfig, MapLayout, Position, SessionConfig, UnitTemplate,
};

pub const OWNER: &str = "alice";
pub const CHARACTER: &str = "alice-knight";

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

/// 8x8 quest: hero at origin, squire below, one slime (10 hp, level 1)
/// right next to the hero, portal at (5, 5).
pub fn quest_config() -> SessionConfig {
    SessionConfig {
        map: MapLayout::new(8, 8),
        walls: [Position::new(3, 3)].into_iter().collect(),
        portal: Position::new(5, 5),
        player: template("hero", Position::ORIGIN, 30),
        allies: vec![template("squire", Position::new(0, 1), 20)],
        enemies: vec![template("slime", Position::new(1, 0), 10)],
        chests: vec![ChestSpec {
            id: "c1".into(),
            position: Position::new(2, 2),
            gold: 25,
        }],
        dialogues: vec![DialogueTrigger {
            id: "intro".into(),
            position: Position::new(0, 2),
        }],
    }
}

pub fn service(mode: TransportMode) -> Arc<SessionService> {
    session_runtime::telemetry::init();
    Arc::new(
        SessionService::builder()
            .config(RuntimeConfig::default().with_transport_mode(mode))
            .build(),
    )
}

pub fn owner() -> RequestContext {
    RequestContext::owner(OWNER)
}

pub async fn start(service: &SessionService) -> SessionUid {
    let started = service
        .start_session(&owner(), CharacterId::from(CHARACTER), quest_config())
        .await
        .expect("session should start");
    SessionUid::new(started.session)
}

pub fn plain(value: Value) -> Envelope {
    Envelope::Plain(value)
}

pub fn attack(attacker: &str, target: &str) -> Envelope {
    plain(json!({"action": "attack", "attacker": attacker, "target": target}))
}

pub fn end_turn(turn: u32, phase: &str) -> Envelope {
    plain(json!({"action": "end-turn", "turn": turn, "phase": phase}))
}

pub fn move_to(unit: &str, x: i32, y: i32) -> Envelope {
    plain(json!({"action": "move", "unit": unit, "x": x, "y": y}))
}

/// A turn-1 player-phase submission with the slime removed and the hero at `(x, y)`.
pub fn cleared_submission(x: i32, y: i32) -> Value {
    json!({
        "schema_version": 1,
        "turn": 1,
        "phase": "player",
        "player": {"id": "player", "x": x, "y": y, "hp": 30, "sp": 10},
        "allies": [{"id": "a1", "x": 0, "y": 1, "hp": 20, "sp": 10}],
        "enemies": [],
    })
}

/// Hero path from the origin to the portal, one legal move per step.
pub const PATH_TO_PORTAL: [(i32, i32); 4] = [(2, 1), (4, 2), (5, 4), (5, 5)];

/// Submits one cleared state per step so the hero walks along `path`.
pub async fn walk_cleared(service: &SessionService, uid: &SessionUid, path: &[(i32, i32)]) {
    for &(x, y) in path {
        let response = service
            .submit_explore_state(&owner(), uid, plain(cleared_submission(x, y)))
            .await
            .expect("cleared step should be accepted");
        assert!(
            response.warnings.is_empty(),
            "step to ({x}, {y}) was not clean: {:?}",
            response.warnings
        );
    }
}

pub fn status_and_code(err: &ServiceError) -> (u16, String) {
    (err.status_code(), err.body().code)
}
