use std::str::FromStr;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::api_client::GameApiClient;
use crate::error::ClientError;
use crate::models::api::DivinationDecryptRequest;
use crate::models::chat::{ChatLog, ChatMessage, ChatMessageType};
use crate::models::events::{ComputationResultNotification, GameEvent};
use crate::models::game::GameResult;
use crate::models::role::Role;
use crate::private_state::{PrivateStateStore, PrivateRoundStateUpdate};

/// MPCクラスタからの非同期な計算結果をローカル状態へ取り込む。
/// 1件のイベントの失敗が購読全体を止めることはない
pub struct ResultReconciler {
    room_id: String,
    player_id: String,
    api: Arc<GameApiClient>,
    chat: Arc<Mutex<ChatLog>>,
    private_state: PrivateStateStore,

    divination_result: Mutex<Option<serde_json::Value>>,
    vote_result: Mutex<Option<serde_json::Value>>,
    winner: Mutex<Option<GameResult>>,
}

impl ResultReconciler {
    pub fn new(
        room_id: String,
        player_id: String,
        api: Arc<GameApiClient>,
        chat: Arc<Mutex<ChatLog>>,
        private_state: PrivateStateStore,
    ) -> Self {
        ResultReconciler {
            room_id,
            player_id,
            api,
            chat,
            private_state,
            divination_result: Mutex::new(None),
            vote_result: Mutex::new(None),
            winner: Mutex::new(None),
        }
    }

    pub fn divination_result(&self) -> Option<serde_json::Value> {
        self.divination_result.lock().expect("lock poisoned").clone()
    }

    pub fn vote_result(&self) -> Option<serde_json::Value> {
        self.vote_result.lock().expect("lock poisoned").clone()
    }

    pub fn winner(&self) -> Option<GameResult> {
        self.winner.lock().expect("lock poisoned").clone()
    }

    pub fn assigned_role(&self) -> Option<Role> {
        self.private_state.read().and_then(|s| s.player_role)
    }

    /// 購読ループ。イベントごとの例外は吸収してエラーメッセージ1件に変換する
    pub async fn run(self: Arc<Self>, mut events: broadcast::Receiver<GameEvent>) {
        loop {
            match events.recv().await {
                Ok(GameEvent::ComputationResult(notification)) => {
                    self.process(&notification);
                }
                Ok(GameEvent::Chat(chat)) => {
                    let message = ChatMessage::new(
                        chat.player_id,
                        chat.player_name,
                        chat.content,
                        ChatMessageType::Public,
                    );
                    self.chat.lock().expect("lock poisoned").add_message(message);
                }
                Ok(GameEvent::Disconnected) => {
                    self.chat
                        .lock()
                        .expect("lock poisoned")
                        .add_error_message("サーバーとの接続が切断されました".to_string());
                }
                Ok(GameEvent::PhaseChange(_)) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("result receiver lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// 1件の計算結果を処理する。失敗は飲み込んでチャットに1件だけ残す
    pub fn process(&self, notification: &ComputationResultNotification) {
        if let Err(e) = self.handle(notification) {
            warn!(
                computation_type = %notification.computation_type,
                batch_id = %notification.batch_id,
                "failed to reconcile computation result: {}", e
            );
            self.chat
                .lock()
                .expect("lock poisoned")
                .add_error_message(format!("計算結果の処理に失敗しました: {}", e));
        }
    }

    fn handle(&self, notification: &ComputationResultNotification) -> Result<(), ClientError> {
        // 宛先指定がある場合、自分宛でなければ黙って捨てる
        if let Some(target) = &notification.target_player_id {
            if target != &self.player_id {
                return Ok(());
            }
        }

        info!(
            computation_type = %notification.computation_type,
            batch_id = %notification.batch_id,
            "received computation result"
        );

        match notification.computation_type.as_str() {
            "role_assignment" => self.handle_role_assignment(&notification.result_data),
            "divination" => self.handle_divination(&notification.result_data),
            "anonymous_voting" => self.handle_vote(&notification.result_data),
            "winning_judge" => self.handle_winning_judgement(&notification.result_data),
            other => {
                warn!("unknown computation type: {}", other);
                Ok(())
            }
        }
    }

    fn handle_role_assignment(&self, data: &serde_json::Value) -> Result<(), ClientError> {
        let role_name = data
            .get("role")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ClientError::State("role assignment result without role".into()))?;
        let role = Role::from_str(role_name).map_err(ClientError::State)?;

        self.private_state.update(PrivateRoundStateUpdate {
            player_role: Some(role),
            ..Default::default()
        });

        self.add_system_message(format!("あなたの役職は {} です", role));
        Ok(())
    }

    fn handle_divination(&self, data: &serde_json::Value) -> Result<(), ClientError> {
        *self.divination_result.lock().expect("lock poisoned") = Some(data.clone());
        self.add_system_message("占い結果が届きました。復号できます".to_string());
        Ok(())
    }

    fn handle_vote(&self, data: &serde_json::Value) -> Result<(), ClientError> {
        *self.vote_result.lock().expect("lock poisoned") = Some(data.clone());

        let executed = data.get("executed_player_name").and_then(|v| v.as_str());
        match executed {
            Some(name) => self.add_system_message(format!("投票の結果、{} が処刑されました", name)),
            None => self.add_system_message("投票結果が届きました".to_string()),
        }
        Ok(())
    }

    fn handle_winning_judgement(&self, data: &serde_json::Value) -> Result<(), ClientError> {
        let result = data
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ClientError::State("winning judgement without result".into()))?;

        let outcome = match result {
            "VillagerWin" => GameResult::VillagerWin,
            "WerewolfWin" => GameResult::WerewolfWin,
            "InProgress" => GameResult::InProgress,
            other => {
                return Err(ClientError::State(format!(
                    "unknown winning judgement: {}",
                    other
                )))
            }
        };

        match &outcome {
            GameResult::VillagerWin => {
                self.add_system_message("村人陣営の勝利です".to_string());
            }
            GameResult::WerewolfWin => {
                self.add_system_message("人狼陣営の勝利です".to_string());
            }
            GameResult::InProgress => {
                self.add_system_message("勝敗はまだ決していません".to_string());
            }
        }

        *self.winner.lock().expect("lock poisoned") = Some(outcome);
        Ok(())
    }

    /// 届いた占い結果をサーバー側で復号し、人狼かどうかの真偽を得る。
    /// 失敗時はローカル状態を一切変更しない
    pub async fn decrypt_divination_result(&self, private_key: &str) -> Result<bool, ClientError> {
        if self.divination_result().is_none() {
            return Err(ClientError::State(
                "no divination result to decrypt".to_string(),
            ));
        }

        let is_werewolf = self
            .api
            .decrypt_divination(
                &self.room_id,
                &DivinationDecryptRequest {
                    player_id: self.player_id.clone(),
                    private_key: private_key.to_string(),
                },
            )
            .await?;

        if is_werewolf {
            self.add_system_message("占い結果: 対象は人狼です".to_string());
        } else {
            self.add_system_message("占い結果: 対象は人間です".to_string());
        }

        Ok(is_werewolf)
    }

    fn add_system_message(&self, content: String) {
        self.chat
            .lock()
            .expect("lock poisoned")
            .add_system_message(content);
    }
}
