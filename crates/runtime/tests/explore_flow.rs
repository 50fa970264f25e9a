//! End-to-end explore scenarios against the in-memory service.

mod common;

use serde_json::json;

use common::*;
use session_runtime::api::ServiceError;
use session_runtime::repository::TriggerType;
use session_runtime::{
    CharacterId, CharacterRepository, RequestContext, RewardLedgerRepository, RuntimeConfig,
    SessionService, SessionUid, TransportMode,
};
use tactics_core::{Phase, Position, SessionStatus};

// ============================================================================
// Rewards
// ============================================================================

#[tokio::test]
async fn killing_the_slime_awards_experience_exactly_once() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    // 6 attack against 2 defense: 5 damage per hit on a 10 hp slime.
    let first = service
        .perform_action(&ctx, &uid, attack("player", "e1"))
        .await
        .expect("first attack should land");
    assert_eq!(first.result.targets[0].hp_delta, 5);
    assert!(first.rewards.is_empty());

    service
        .perform_action(&ctx, &uid, end_turn(1, "player"))
        .await
        .expect("player phase should end");
    service
        .perform_action(&ctx, &uid, end_turn(1, "enemy"))
        .await
        .expect("enemy phase should end");

    let second = service
        .perform_action(&ctx, &uid, attack("player", "e1"))
        .await
        .expect("second attack should land");
    assert!(second.result.targets[0].defeated);
    assert_eq!(second.rewards.len(), 1);
    assert_eq!(second.rewards[0].trigger_key, "e1");
    assert_eq!(second.rewards[0].experience, 10);
    assert_eq!(second.rewards[0].total_experience, Some(10));
    assert_eq!(second.rewards[0].level, Some(1));

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert!(snapshot.enemies.is_empty());
    assert!(snapshot.logs.iter().any(|entry| entry.key == "defeated"));

    // Re-submitting a state without the slime grants nothing more.
    let resubmit = service
        .submit_explore_state(&ctx, &uid, plain(json!({
            "turn": 2,
            "phase": "player",
            "player": {"id": "player", "x": 0, "y": 0, "hp": 30, "sp": 10},
            "allies": [{"id": "a1", "x": 0, "y": 1, "hp": 20, "sp": 10}],
            "enemies": [],
        })))
        .await
        .expect("echo submission should be accepted");
    assert!(resubmit.rewards.is_empty());

    let character = service
        .characters()
        .find(&CharacterId::from(CHARACTER))
        .await
        .unwrap()
        .expect("character exists");
    assert_eq!(character.experience, 10);
    assert_eq!(character.level, 1);
    assert_eq!(service.ledger().repository().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn opening_a_chest_grants_gold_once() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    service
        .perform_action(&ctx, &uid, move_to("player", 1, 1))
        .await
        .expect("move next to the chest");
    let opened = service
        .perform_action(
            &ctx,
            &uid,
            plain(json!({"action": "open-chest", "unit": "player", "chest": "c1"})),
        )
        .await
        .expect("chest should open");
    assert_eq!(opened.result.gold, Some(25));
    assert_eq!(opened.rewards.len(), 1);
    assert_eq!(opened.rewards[0].gold, 25);

    let again = service
        .perform_action(
            &ctx,
            &uid,
            plain(json!({"action": "open-chest", "unit": "a1", "chest": "c1"})),
        )
        .await
        .unwrap_err();
    assert_eq!(
        status_and_code(&again),
        (400, "ACTION_CHEST_ALREADY_OPENED".to_owned())
    );

    let character = service
        .characters()
        .find(&CharacterId::from(CHARACTER))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(character.gold, 25);

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert!(snapshot.chests[0].opened);
}

// ============================================================================
// Turn flow
// ============================================================================

#[tokio::test]
async fn stale_end_turn_is_rejected() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let ended = service
        .perform_action(&ctx, &uid, end_turn(1, "player"))
        .await
        .unwrap();
    assert_eq!((ended.turn, ended.phase), (1, Phase::Enemy));

    let err = service
        .perform_action(&ctx, &uid, end_turn(1, "player"))
        .await
        .unwrap_err();
    assert_eq!(status_and_code(&err), (400, "ACTION_STALE_TURN".to_owned()));
    assert!(err.body().retryable);

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!((snapshot.turn, snapshot.phase), (1, Phase::Enemy));
}

#[tokio::test]
async fn moving_onto_a_trigger_shows_dialogue_once() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let moved = service
        .perform_action(&ctx, &uid, move_to("player", 0, 2))
        .await
        .unwrap();
    assert_eq!(moved.position, Some(Position::new(0, 2)));
    assert_eq!(moved.result.dialogue.as_deref(), Some("intro"));

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert!(snapshot.dialogues.iter().all(|dialogue| dialogue.shown));
}

#[tokio::test]
async fn rejected_move_leaves_state_untouched() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let err = service
        .perform_action(&ctx, &uid, move_to("player", 1, 0))
        .await
        .unwrap_err();
    assert_eq!(status_and_code(&err), (400, "ACTION_OCCUPIED".to_owned()));

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!((snapshot.player.x, snapshot.player.y), (0, 0));
    assert!(snapshot.logs.is_empty());
}

// ============================================================================
// Submissions
// ============================================================================

#[tokio::test]
async fn submitted_map_fields_never_change_the_snapshot() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let mut body = cleared_submission(0, 0);
    body["walls"] = json!([]);
    body["portal"] = json!({"x": 0, "y": 0});
    body["map"] = json!({"width": 99, "height": 99, "walls": []});
    service
        .submit_explore_state(&ctx, &uid, plain(body))
        .await
        .expect("submission should be accepted");

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!(snapshot.map.walls, vec![Position::new(3, 3)]);
    assert_eq!(snapshot.portal, Position::new(5, 5));
    assert_eq!((snapshot.map.width, snapshot.map.height), (8, 8));
}

#[tokio::test]
async fn excessive_resources_are_tampering() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let mut body = cleared_submission(0, 0);
    body["player"]["hp"] = json!(999);
    let err = service
        .submit_explore_state(&ctx, &uid, plain(body))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    let errors = err.body().errors;
    assert!(errors.iter().any(|issue| issue.code == "VALIDATION_EXCESSIVE_RESOURCE"));

    // Nothing was persisted: the slime is still there and no reward exists.
    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!(snapshot.enemies.len(), 1);
    assert!(service.ledger().repository().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn small_overflow_is_clamped_with_a_warning() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let mut body = cleared_submission(0, 0);
    body["player"]["hp"] = json!(45);
    let response = service
        .submit_explore_state(&ctx, &uid, plain(body))
        .await
        .unwrap();
    assert!(response
        .warnings
        .iter()
        .any(|issue| issue.code == "VALIDATION_RESOURCE_OVERFLOW" && !issue.hard));

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!(snapshot.player.hp, 30);
}

#[tokio::test]
async fn identical_kill_submission_grants_experience_once() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();
    let body = cleared_submission(0, 0);

    let first = service
        .submit_explore_state(&ctx, &uid, plain(body.clone()))
        .await
        .unwrap();
    assert_eq!(first.rewards.len(), 1);
    assert_eq!(first.rewards[0].experience, 10);

    let second = service
        .submit_explore_state(&ctx, &uid, plain(body))
        .await
        .unwrap();
    assert!(second.rewards.is_empty());

    let character = service
        .characters()
        .find(&CharacterId::from(CHARACTER))
        .await
        .unwrap()
        .expect("character exists");
    assert_eq!(character.experience, 10);

    let rows = service.ledger().repository().list().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key.trigger_type, TriggerType::EnemyDefeated);
    assert_eq!(rows[0].key.trigger_key, "e1");
}

#[tokio::test]
async fn teleporting_onto_the_portal_keeps_the_hero_in_place() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let response = service
        .submit_explore_state(&ctx, &uid, plain(cleared_submission(5, 5)))
        .await
        .expect("an illegal move is corrected, not rejected");
    assert!(response
        .warnings
        .iter()
        .any(|issue| issue.code == "VALIDATION_INVALID_POSITION" && !issue.hard));

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!((snapshot.player.x, snapshot.player.y), (0, 0));

    let err = service.complete_explore(&ctx, &uid).await.unwrap_err();
    assert!(err
        .body()
        .errors
        .iter()
        .any(|issue| issue.code == "VALIDATION_NOT_ON_PORTAL"));
}

#[tokio::test]
async fn moving_onto_the_squire_is_refused() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let response = service
        .submit_explore_state(&ctx, &uid, plain(cleared_submission(0, 1)))
        .await
        .unwrap();
    assert!(response
        .warnings
        .iter()
        .any(|issue| issue.code == "VALIDATION_INVALID_POSITION"));

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!((snapshot.player.x, snapshot.player.y), (0, 0));
    assert_eq!((snapshot.allies[0].x, snapshot.allies[0].y), (0, 1));
}

#[tokio::test]
async fn skipping_a_phase_is_rejected() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;

    let mut body = cleared_submission(0, 0);
    body["turn"] = json!(3);
    let err = service
        .submit_explore_state(&owner(), &uid, plain(body))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationFailed(_)));
}

#[tokio::test]
async fn oversized_log_batch_is_rejected() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;

    let entries: Vec<_> = (0..300)
        .map(|i| json!({"turn": 1, "phase": "player", "key": "attack", "params": {"n": i.to_string()}}))
        .collect();
    let mut body = cleared_submission(0, 0);
    body["logs"] = json!(entries);

    let err = service
        .submit_explore_state(&owner(), &uid, plain(body))
        .await
        .unwrap_err();
    assert_eq!(status_and_code(&err), (400, "LOG_BATCH_TOO_LARGE".to_owned()));
}

#[tokio::test]
async fn resubmitted_logs_are_deduplicated() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let mut body = cleared_submission(0, 0);
    body["logs"] = json!([
        {"turn": 1, "phase": "player", "key": "attack", "params": {"damage": "5"}},
        {"turn": 1, "phase": "player", "key": "defeated", "params": {"target": "e1"}},
    ]);

    let first = service
        .submit_explore_state(&ctx, &uid, plain(body.clone()))
        .await
        .unwrap();
    let second = service
        .submit_explore_state(&ctx, &uid, plain(body))
        .await
        .unwrap();
    assert_eq!(first.logs_appended, 2);
    assert_eq!(second.logs_appended, 0);
    assert_eq!(service.snapshot(&ctx, &uid).await.unwrap().logs.len(), 2);
}

#[tokio::test]
async fn full_log_refuses_the_submission_before_any_reward() {
    session_runtime::telemetry::init();
    let service = SessionService::builder()
        .config(
            RuntimeConfig::default()
                .with_transport_mode(TransportMode::Plaintext)
                .with_log_capacity(2),
        )
        .build();
    let uid = start(&service).await;
    let ctx = owner();

    let mut body = cleared_submission(0, 0);
    body["logs"] = json!([
        {"turn": 1, "phase": "player", "key": "attack", "params": {"damage": "5"}},
        {"turn": 1, "phase": "player", "key": "attack", "params": {"damage": "6"}},
        {"turn": 1, "phase": "player", "key": "defeated", "params": {"target": "e1"}},
    ]);
    let err = service
        .submit_explore_state(&ctx, &uid, plain(body))
        .await
        .unwrap_err();
    assert_eq!(status_and_code(&err), (409, "LOG_FULL".to_owned()));

    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!(snapshot.enemies.len(), 1);
    assert!(snapshot.logs.is_empty());
    assert!(service.ledger().repository().list().await.unwrap().is_empty());
}

// ============================================================================
// Completion & lifecycle
// ============================================================================

#[tokio::test]
async fn completion_requires_cleared_map_and_portal() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let err = service.complete_explore(&ctx, &uid).await.unwrap_err();
    let body = err.body();
    assert_eq!(err.status_code(), 400);
    assert!(body
        .errors
        .iter()
        .any(|issue| issue.message == "Enemies still alive (1)"));

    // Clear the map but stop short of the portal.
    walk_cleared(&service, &uid, &PATH_TO_PORTAL[..3]).await;
    let err = service.complete_explore(&ctx, &uid).await.unwrap_err();
    assert!(err
        .body()
        .errors
        .iter()
        .all(|issue| issue.code == "VALIDATION_NOT_ON_PORTAL"));

    walk_cleared(&service, &uid, &PATH_TO_PORTAL[3..]).await;
    let done = service.complete_explore(&ctx, &uid).await.unwrap();
    assert_eq!(done.status, SessionStatus::Completed);

    let err = service
        .perform_action(&ctx, &uid, end_turn(1, "player"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn abandoned_session_accepts_no_mutation() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;
    let ctx = owner();

    let abandoned = service.abandon_session(&ctx, &uid).await.unwrap();
    assert_eq!(abandoned.status, SessionStatus::Abandoned);

    let err = service
        .submit_explore_state(&ctx, &uid, plain(cleared_submission(0, 0)))
        .await
        .unwrap_err();
    assert_eq!(status_and_code(&err), (409, "SESSION_CLOSED".to_owned()));

    // Reading is still allowed.
    let snapshot = service.snapshot(&ctx, &uid).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Abandoned);
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
async fn foreign_and_missing_sessions_are_both_404() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;

    let mallory = RequestContext::owner("mallory");
    let foreign = service.snapshot(&mallory, &uid).await.unwrap_err();
    let missing = service
        .snapshot(&owner(), &SessionUid::from("no-such-session"))
        .await
        .unwrap_err();

    assert_eq!(foreign.status_code(), 404);
    assert_eq!(foreign.body(), missing.body());
}

#[tokio::test]
async fn anonymous_callers_are_rejected() {
    let service = service(TransportMode::Plaintext);
    let uid = start(&service).await;

    let err = service
        .snapshot(&RequestContext::anonymous(), &uid)
        .await
        .unwrap_err();
    assert_eq!(status_and_code(&err), (401, "AUTHENTICATION_REQUIRED".to_owned()));
}
