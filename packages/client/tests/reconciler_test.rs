use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use client::models::chat::ChatLog;
use client::models::events::ComputationResultNotification;
use client::models::game::GameResult;
use client::models::role::Role;
use client::private_state::PrivateRoundState;
use client::{
    ClientError, GameApiClient, InMemorySessionStore, PrivateStateStore, ResultReconciler,
    SessionStore,
};

fn result_notification(
    computation_type: &str,
    result_data: serde_json::Value,
    target_player_id: Option<&str>,
) -> ComputationResultNotification {
    ComputationResultNotification {
        message_type: "computation_result".to_string(),
        computation_type: computation_type.to_string(),
        result_data,
        room_id: "room1".to_string(),
        target_player_id: target_player_id.map(|s| s.to_string()),
        timestamp: "2025-01-01T00:00:00Z".to_string(),
        batch_id: "batch-1".to_string(),
    }
}

struct Setup {
    reconciler: ResultReconciler,
    chat: Arc<Mutex<ChatLog>>,
    state_view: PrivateStateStore,
}

fn setup(server_uri: &str) -> Setup {
    let api = Arc::new(GameApiClient::new(server_uri.to_string()));
    let chat = Arc::new(Mutex::new(ChatLog::new("room1".to_string())));

    let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let private_state =
        PrivateStateStore::new(session.clone(), "room1".to_string(), "p1".to_string());
    private_state.create(PrivateRoundState {
        player_id: "p1".to_string(),
        player_role: None,
        has_acted: false,
    });
    let state_view = PrivateStateStore::new(session, "room1".to_string(), "p1".to_string());

    let reconciler = ResultReconciler::new(
        "room1".to_string(),
        "p1".to_string(),
        api,
        chat.clone(),
        private_state,
    );

    Setup {
        reconciler,
        chat,
        state_view,
    }
}

/// 他プレイヤー宛の結果はローカル状態を一切変えない
#[tokio::test]
async fn result_for_other_player_is_dropped() {
    let mock_server = MockServer::start().await;
    let setup = setup(&mock_server.uri());

    let notification = result_notification(
        "divination",
        json!({"ciphertext": "abc"}),
        Some("p2"), // 自分はp1
    );
    setup.reconciler.process(&notification);

    assert!(setup.reconciler.divination_result().is_none());
    assert!(setup.chat.lock().unwrap().messages.is_empty());
}

#[tokio::test]
async fn role_assignment_result_updates_private_state() {
    let mock_server = MockServer::start().await;
    let setup = setup(&mock_server.uri());

    let notification =
        result_notification("role_assignment", json!({"role": "Seer"}), Some("p1"));
    setup.reconciler.process(&notification);

    assert_eq!(setup.reconciler.assigned_role(), Some(Role::Seer));
    assert_eq!(
        setup.state_view.read().unwrap().player_role,
        Some(Role::Seer)
    );

    let announced = setup
        .chat
        .lock()
        .unwrap()
        .messages
        .iter()
        .any(|m| m.content.contains("占い師"));
    assert!(announced);
}

#[tokio::test]
async fn winning_judgement_result_is_cached() {
    let mock_server = MockServer::start().await;
    let setup = setup(&mock_server.uri());

    let notification =
        result_notification("winning_judge", json!({"result": "VillagerWin"}), None);
    setup.reconciler.process(&notification);

    assert_eq!(setup.reconciler.winner(), Some(GameResult::VillagerWin));
}

/// 占い結果の復号。人狼ならシステムメッセージがちょうど1件積まれる
#[tokio::test]
async fn scenario_d_decrypt_divination_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/game/room1/divination/decrypt"))
        .and(body_partial_json(json!({
            "player_id": "p1",
            "private_key": "privkey123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_werewolf": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let setup = setup(&mock_server.uri());

    // まず占い結果を受信しておく
    let notification =
        result_notification("divination", json!({"ciphertext": "abc"}), Some("p1"));
    setup.reconciler.process(&notification);
    assert!(setup.reconciler.divination_result().is_some());

    let is_werewolf = setup
        .reconciler
        .decrypt_divination_result("privkey123")
        .await
        .unwrap();
    assert!(is_werewolf);

    let werewolf_messages = setup
        .chat
        .lock()
        .unwrap()
        .messages
        .iter()
        .filter(|m| m.content.contains("人狼"))
        .count();
    assert_eq!(werewolf_messages, 1);
}

#[tokio::test]
async fn decrypt_without_result_fails_and_mutates_nothing() {
    let mock_server = MockServer::start().await;
    let setup = setup(&mock_server.uri());

    let result = setup.reconciler.decrypt_divination_result("privkey123").await;
    assert!(matches!(result, Err(ClientError::State(_))));
    assert!(setup.chat.lock().unwrap().messages.is_empty());
}

/// 壊れたイベントはエラーメッセージ1件に変換され、後続の処理を妨げない
#[tokio::test]
async fn malformed_event_is_isolated() {
    let mock_server = MockServer::start().await;
    let setup = setup(&mock_server.uri());

    // resultフィールドを欠いた勝利判定
    let bad = result_notification("winning_judge", json!({}), None);
    setup.reconciler.process(&bad);

    let error_count = setup
        .chat
        .lock()
        .unwrap()
        .messages
        .iter()
        .filter(|m| m.content.contains("失敗"))
        .count();
    assert_eq!(error_count, 1);

    // 続くイベントは通常どおり処理される
    let good = result_notification("winning_judge", json!({"result": "WerewolfWin"}), None);
    setup.reconciler.process(&good);
    assert_eq!(setup.reconciler.winner(), Some(GameResult::WerewolfWin));
}
