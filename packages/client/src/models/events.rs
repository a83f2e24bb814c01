use serde::{Deserialize, Serialize};

/// サーバーがプッシュ配信するフェーズ遷移通知
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseChangeNotification {
    pub message_type: String,
    pub from_phase: String,
    pub to_phase: String,
    pub room_id: String,
    pub timestamp: String,
    pub requires_dummy_request: bool,
}

/// MPCクラスタの計算結果通知
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationResultNotification {
    pub message_type: String,
    pub computation_type: String, // "divination", "role_assignment", "winning_judge", "anonymous_voting"
    pub result_data: serde_json::Value,
    pub room_id: String,
    pub target_player_id: Option<String>, // 特定のプレイヤーのみに送信する場合
    pub timestamp: String,
    pub batch_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatNotification {
    pub message_type: String,
    pub player_id: String,
    pub player_name: String,
    pub content: String,
    pub timestamp: String,
    pub room_id: String,
}

/// グローバルなイベントバスの代わりに型付きチャネルへ流すエンベロープ
#[derive(Debug, Clone)]
pub enum GameEvent {
    PhaseChange(PhaseChangeNotification),
    ComputationResult(ComputationResultNotification),
    Chat(ChatNotification),
    /// プッシュチャネルが切断された。データ欠損ではなく表示上の状態変化
    Disconnected,
}

impl GameEvent {
    /// message_typeで振り分けてJSONエンベロープをパースする
    pub fn parse(text: &str) -> Result<GameEvent, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let message_type = value
            .get("message_type")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        match message_type {
            "phase_change" => Ok(GameEvent::PhaseChange(serde_json::from_value(value)?)),
            "computation_result" => {
                Ok(GameEvent::ComputationResult(serde_json::from_value(value)?))
            }
            _ => Ok(GameEvent::Chat(serde_json::from_value(value)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_phase_change_envelope() {
        let text = serde_json::json!({
            "message_type": "phase_change",
            "from_phase": "Waiting",
            "to_phase": "Night",
            "room_id": "room1",
            "timestamp": "2025-01-01T00:00:00Z",
            "requires_dummy_request": true
        })
        .to_string();

        match GameEvent::parse(&text).unwrap() {
            GameEvent::PhaseChange(n) => {
                assert_eq!(n.from_phase, "Waiting");
                assert_eq!(n.to_phase, "Night");
                assert!(n.requires_dummy_request);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn parse_computation_result_envelope() {
        let text = serde_json::json!({
            "message_type": "computation_result",
            "computation_type": "divination",
            "result_data": {"ciphertext": "abc"},
            "room_id": "room1",
            "target_player_id": "p2",
            "timestamp": "2025-01-01T00:00:00Z",
            "batch_id": "batch-7"
        })
        .to_string();

        match GameEvent::parse(&text).unwrap() {
            GameEvent::ComputationResult(n) => {
                assert_eq!(n.computation_type, "divination");
                assert_eq!(n.target_player_id.as_deref(), Some("p2"));
                assert_eq!(n.batch_id, "batch-7");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn plain_chat_falls_through() {
        let text = serde_json::json!({
            "message_type": "public",
            "player_id": "p1",
            "player_name": "Player1",
            "content": "hello",
            "timestamp": "2025-01-01T00:00:00Z",
            "room_id": "room1"
        })
        .to_string();

        assert!(matches!(
            GameEvent::parse(&text).unwrap(),
            GameEvent::Chat(_)
        ));
    }
}
