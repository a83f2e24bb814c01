use std::sync::{Arc, Mutex};

use base64::encode;
use nalgebra as na;

use client::models::chat::ChatLog;
use client::models::events::PhaseChangeNotification;
use client::models::game::{GamePhase, GameResult, GameSnapshot, Player};
use client::params::{CryptoParameterStore, CryptoParameters};
use client::{
    EncryptionGateway, GameApiClient, InMemorySessionStore, MpcInputBackend, PhaseOrchestrator,
    PrivateStateStore, SessionStore,
};
use mpc_inputs::{GroupingParameter, NodeKey, SecretSharingScheme};

pub fn test_snapshot(room_id: &str, player_num: usize, phase: GamePhase) -> GameSnapshot {
    GameSnapshot {
        room_id: room_id.to_string(),
        name: "Test Room".to_string(),
        players: (0..player_num)
            .map(|i| Player {
                id: format!("p{}", i + 1),
                name: format!("Player{}", i + 1),
                is_dead: false,
                is_ready: true,
                role: None,
            })
            .collect(),
        phase,
        result: GameResult::InProgress,
        crypto_parameters: None,
    }
}

pub fn test_parameters(player_num: usize) -> CryptoParameters {
    // 任意の32バイトはx25519の公開鍵として有効
    let node_keys = (0..3)
        .map(|i| NodeKey {
            node_id: format!("{}", i),
            public_key: encode([i as u8 + 1; 32]),
        })
        .collect();

    CryptoParameters {
        pedersen_param: serde_json::Value::Null,
        elgamal_param: serde_json::Value::Null,
        elgamal_pub_key: serde_json::Value::Null,
        player_commitment: vec![serde_json::Value::Null; player_num],
        player_randomness: (0..player_num as u64).map(|i| i + 11).collect(),
        role_commitment: vec![serde_json::Value::Null; 3],
        grouping_parameter: GroupingParameter {
            num_werewolves: 1,
            num_seers: 1,
            num_villagers: player_num - 2,
        },
        tau_matrix: na::DMatrix::zeros(player_num, player_num),
        node_keys,
        scheme: SecretSharingScheme {
            total_shares: 3,
            modulus: 97,
        },
    }
}

pub fn phase_change(from: &str, to: &str, requires_dummy_request: bool) -> PhaseChangeNotification {
    PhaseChangeNotification {
        message_type: "phase_change".to_string(),
        from_phase: from.to_string(),
        to_phase: to.to_string(),
        room_id: "room1".to_string(),
        timestamp: "2025-01-01T00:00:00Z".to_string(),
        requires_dummy_request,
    }
}

pub struct TestHarness {
    pub orchestrator: PhaseOrchestrator,
    pub chat: Arc<Mutex<ChatLog>>,
    /// オーケストレータと同じレコードを覗くための別ハンドル
    pub state_view: PrivateStateStore,
}

pub fn harness(server_uri: &str, room_id: &str, player_id: &str, player_num: usize) -> TestHarness {
    let api = Arc::new(GameApiClient::new(server_uri.to_string()));
    let gateway = Arc::new(EncryptionGateway::new(Arc::new(MpcInputBackend)));

    let params = Arc::new(CryptoParameterStore::new());
    params.load(test_parameters(player_num));

    let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let private_state =
        PrivateStateStore::new(session.clone(), room_id.to_string(), player_id.to_string());
    let state_view =
        PrivateStateStore::new(session, room_id.to_string(), player_id.to_string());

    let chat = Arc::new(Mutex::new(ChatLog::new(room_id.to_string())));

    let orchestrator = PhaseOrchestrator::new(
        room_id.to_string(),
        player_id.to_string(),
        api,
        gateway,
        params,
        private_state,
        chat.clone(),
    );

    TestHarness {
        orchestrator,
        chat,
        state_view,
    }
}
