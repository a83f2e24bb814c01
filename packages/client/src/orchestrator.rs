use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{info, warn};

use mpc_inputs::Share;

use crate::api_client::GameApiClient;
use crate::builder::InputBuilder;
use crate::error::ClientError;
use crate::gateway::EncryptionGateway;
use crate::models::api::{ProofData, ProofRequest, ProofType};
use crate::models::chat::ChatLog;
use crate::models::events::{GameEvent, PhaseChangeNotification};
use crate::models::game::{GamePhase, GameSnapshot};
use crate::models::role::Role;
use crate::params::CryptoParameterStore;
use crate::private_state::{PrivateRoundState, PrivateStateStore};

/// 勝利判定は1ラウンドに2回走る（夜明けと処刑後）。完了記録上は別操作
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum JudgementSlot {
    AfterNight,
    AfterVoting,
    None,
}

type CompletionKey = (ProofType, JudgementSlot, u32);

/// (roomId, playerId)ごとのフェーズ進行の司令塔。
/// フェーズ遷移イベントを受けて 生成 → 暗号化 → 提出 を
/// (player, phase, round)あたり高々一度だけ駆動する
pub struct PhaseOrchestrator {
    room_id: String,
    player_id: String,
    api: Arc<GameApiClient>,
    gateway: Arc<EncryptionGateway>,
    params: Arc<CryptoParameterStore>,
    private_state: PrivateStateStore,
    chat: Arc<Mutex<ChatLog>>,

    completed: Mutex<HashSet<CompletionKey>>,
    /// 連打されたイベントによる同時重複提出を直列化する単一スロットのガード
    in_flight: tokio::sync::Mutex<()>,
    round: AtomicU32,

    divination_target: Mutex<Option<usize>>,
    vote_target: Mutex<Option<usize>>,
    seer_elgamal_pub_key: Mutex<Option<(Share, Share)>>,
}

impl PhaseOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        room_id: String,
        player_id: String,
        api: Arc<GameApiClient>,
        gateway: Arc<EncryptionGateway>,
        params: Arc<CryptoParameterStore>,
        private_state: PrivateStateStore,
        chat: Arc<Mutex<ChatLog>>,
    ) -> Self {
        PhaseOrchestrator {
            room_id,
            player_id,
            api,
            gateway,
            params,
            private_state,
            chat,
            completed: Mutex::new(HashSet::new()),
            in_flight: tokio::sync::Mutex::new(()),
            round: AtomicU32::new(0),
            divination_target: Mutex::new(None),
            vote_target: Mutex::new(None),
            seer_elgamal_pub_key: Mutex::new(None),
        }
    }

    /// UIから選ばれた占い対象（プレイヤーインデックス）
    pub fn set_divination_target(&self, target_index: usize) {
        *self.divination_target.lock().expect("lock poisoned") = Some(target_index);
    }

    /// UIから選ばれた投票対象（プレイヤーインデックス）
    pub fn set_vote_target(&self, target_index: usize) {
        *self.vote_target.lock().expect("lock poisoned") = Some(target_index);
    }

    /// 占い師が鍵公開に使うElGamal公開鍵のアフィン座標
    pub fn set_seer_elgamal_pub_key(&self, x: Share, y: Share) {
        *self.seer_elgamal_pub_key.lock().expect("lock poisoned") = Some((x, y));
    }

    pub fn current_round(&self) -> u32 {
        self.round.load(Ordering::SeqCst)
    }

    /// ゲームリセット時。ローカルの秘密状態と完了記録を破棄する
    pub fn reset(&self) {
        self.private_state.clear();
        self.completed.lock().expect("lock poisoned").clear();
        self.round.store(0, Ordering::SeqCst);
        *self.divination_target.lock().expect("lock poisoned") = None;
        *self.vote_target.lock().expect("lock poisoned") = None;
    }

    /// プッシュチャネルのイベントループ。フェーズ遷移ごとに最新の
    /// スナップショットを取り直し、必要な提出を駆動する。
    /// 提出失敗はログとチャットに残すだけで自動再試行はしない
    pub async fn run(self: Arc<Self>, mut events: broadcast::Receiver<GameEvent>) {
        loop {
            match events.recv().await {
                Ok(GameEvent::PhaseChange(notification)) => {
                    let snapshot = match self.api.fetch_game_state(&self.room_id).await {
                        Ok(snapshot) => snapshot,
                        Err(e) => {
                            warn!("failed to refresh game state: {}", e);
                            self.add_error_message(format!("状態の取得に失敗しました: {}", e));
                            continue;
                        }
                    };
                    self.params.load_from_snapshot(&snapshot);

                    if let Err(e) = self.handle_phase_change(&notification, &snapshot).await {
                        warn!("phase submission failed: {}", e);
                        self.add_error_message(format!("提出に失敗しました: {}", e));
                    }
                }
                Ok(GameEvent::Disconnected) => {
                    self.add_error_message("サーバーとの接続が切断されました".to_string());
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("event receiver lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// フェーズ遷移の本処理。提出したbatch_idの一覧を返す
    pub async fn handle_phase_change(
        &self,
        notification: &PhaseChangeNotification,
        snapshot: &GameSnapshot,
    ) -> Result<Vec<String>, ClientError> {
        let from = GamePhase::parse(&notification.from_phase);
        let to = GamePhase::parse(&notification.to_phase);

        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                // 中間フェーズ（DivinationProcessingなど）はこの層では提出対象外
                info!(
                    "ignoring transition {} -> {}",
                    notification.from_phase, notification.to_phase
                );
                return Ok(Vec::new());
            }
        };

        // ゲーム開始時にローカル秘密状態を用意する
        if from == GamePhase::Waiting && self.private_state.read().is_none() {
            self.private_state.create(PrivateRoundState {
                player_id: self.player_id.clone(),
                player_role: None,
                has_acted: false,
            });
        }

        // 新しいフェーズに入る前にhas_actedを必ず落とす
        self.private_state.set_has_acted(false);

        if to == GamePhase::Night {
            self.round.fetch_add(1, Ordering::SeqCst);
        }

        let mut batch_ids = Vec::new();

        if from == GamePhase::Waiting && to == GamePhase::Night {
            // 役職割り当ては全員が本物の入力を提出する
            if let Some(batch_id) = self.submit_role_assignment(snapshot).await? {
                batch_ids.push(batch_id);
            }
            // 占い師のElGamal鍵は最初の夜より前に公開されている必要がある
            if let Some(batch_id) = self.submit_key_publicize(snapshot).await? {
                batch_ids.push(batch_id);
            }
        }

        if to == GamePhase::Night {
            if let Some(batch_id) = self
                .submit_divination(snapshot, notification.requires_dummy_request)
                .await?
            {
                batch_ids.push(batch_id);
            }
        }

        if from == GamePhase::Night && to == GamePhase::Discussion {
            if let Some(batch_id) = self
                .submit_winning_judgement(snapshot, JudgementSlot::AfterNight)
                .await?
            {
                batch_ids.push(batch_id);
            }
        }

        if to == GamePhase::Voting {
            if let Some(batch_id) = self.submit_anonymous_voting(snapshot).await? {
                batch_ids.push(batch_id);
            }
        }

        if from == GamePhase::Voting && to == GamePhase::Result {
            if let Some(batch_id) = self
                .submit_winning_judgement(snapshot, JudgementSlot::AfterVoting)
                .await?
            {
                batch_ids.push(batch_id);
            }
        }

        Ok(batch_ids)
    }

    pub async fn submit_role_assignment(
        &self,
        snapshot: &GameSnapshot,
    ) -> Result<Option<String>, ClientError> {
        let player_index = self.player_index(snapshot)?;
        let shuffle_seed = rand::random::<u64>();

        self.submit(
            ProofType::RoleAssignment,
            JudgementSlot::None,
            snapshot,
            |params| {
                let input =
                    InputBuilder::role_assignment(snapshot, player_index, shuffle_seed, params)?;
                Ok(serde_json::to_string(&input)?)
            },
        )
        .await
    }

    pub async fn submit_key_publicize(
        &self,
        snapshot: &GameSnapshot,
    ) -> Result<Option<String>, ClientError> {
        let player_index = self.player_index(snapshot)?;
        let role = self.local_role();
        let pub_key = *self.seer_elgamal_pub_key.lock().expect("lock poisoned");

        self.submit(
            ProofType::KeyPublicize,
            JudgementSlot::None,
            snapshot,
            |params| {
                let input =
                    InputBuilder::key_publicize(snapshot, player_index, role, pub_key, params)?;
                Ok(serde_json::to_string(&input)?)
            },
        )
        .await
    }

    /// 占い入力の提出。requires_dummyが立っている場合は全員分が義務で、
    /// 占い師以外も同形のダミーを投げる。義務でなければ本物の占いだけが出る
    pub async fn submit_divination(
        &self,
        snapshot: &GameSnapshot,
        requires_dummy: bool,
    ) -> Result<Option<String>, ClientError> {
        let player_index = self.player_index(snapshot)?;
        let role = self.local_role();
        let target = *self.divination_target.lock().expect("lock poisoned");

        let is_acting_seer = role.map(|r| r.is_seer()).unwrap_or(false) && target.is_some();
        if !requires_dummy && !is_acting_seer {
            return Ok(None);
        }

        self.submit(
            ProofType::Divination,
            JudgementSlot::None,
            snapshot,
            |params| {
                let input =
                    InputBuilder::divination(snapshot, player_index, role, target, params)?;
                Ok(serde_json::to_string(&input)?)
            },
        )
        .await
    }

    pub async fn submit_anonymous_voting(
        &self,
        snapshot: &GameSnapshot,
    ) -> Result<Option<String>, ClientError> {
        let player_index = self.player_index(snapshot)?;
        let target = self
            .vote_target
            .lock()
            .expect("lock poisoned")
            .ok_or_else(|| ClientError::State("no vote target selected".to_string()))?;

        self.submit(
            ProofType::AnonymousVoting,
            JudgementSlot::None,
            snapshot,
            |params| {
                let input = InputBuilder::anonymous_voting(snapshot, player_index, target, params)?;
                Ok(serde_json::to_string(&input)?)
            },
        )
        .await
    }

    async fn submit_winning_judgement(
        &self,
        snapshot: &GameSnapshot,
        slot: JudgementSlot,
    ) -> Result<Option<String>, ClientError> {
        let player_index = self.player_index(snapshot)?;
        let role = self.local_role();

        self.submit(ProofType::WinningJudge, slot, snapshot, |params| {
            let input = InputBuilder::winning_judgement(snapshot, player_index, role, params)?;
            Ok(serde_json::to_string(&input)?)
        })
        .await
    }

    /// 共通の提出パイプライン。完了済みなら何もしない。
    /// サーバーの「already completed」応答も成功として記録する
    async fn submit<F>(
        &self,
        operation: ProofType,
        slot: JudgementSlot,
        snapshot: &GameSnapshot,
        build: F,
    ) -> Result<Option<String>, ClientError>
    where
        F: FnOnce(&crate::params::CryptoParameters) -> Result<String, ClientError>,
    {
        let _guard = self.in_flight.lock().await;

        let key = (operation, slot, self.current_round());
        if self.is_completed(&key) {
            info!(operation = %operation, "submission already completed, skipping");
            self.add_system_message(format!("{} は提出済みのためスキップしました", operation));
            return Ok(None);
        }

        let params = self.params.get()?;
        let input_json = build(&params)?;

        let encrypted_data = self.gateway.encrypt(operation, &input_json).await?;

        let request = ProofRequest {
            proof_type: operation,
            data: ProofData {
                user_id: self.player_id.clone(),
                prover_count: snapshot.players.len(),
                encrypted_data,
                public_key: None,
            },
        };

        match self.api.submit_proof(&self.room_id, &request).await {
            Ok(batch_id) => {
                self.mark_completed(key);
                self.private_state.set_has_acted(true);
                self.add_system_message(format!(
                    "{} の提出が完了しました (batch: {})",
                    operation, batch_id
                ));
                Ok(Some(batch_id))
            }
            Err(ClientError::AlreadyCompleted) => {
                // 二重提出は成功と同じ観測結果に折りたたむ
                self.mark_completed(key);
                self.private_state.set_has_acted(true);
                self.add_system_message(format!(
                    "{} は既に完了済みとして扱われました",
                    operation
                ));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn player_index(&self, snapshot: &GameSnapshot) -> Result<usize, ClientError> {
        snapshot
            .player_index(&self.player_id)
            .ok_or_else(|| ClientError::PlayerNotFound(self.player_id.clone()))
    }

    fn local_role(&self) -> Option<Role> {
        self.private_state.read().and_then(|s| s.player_role)
    }

    fn is_completed(&self, key: &CompletionKey) -> bool {
        self.completed.lock().expect("lock poisoned").contains(key)
    }

    fn mark_completed(&self, key: CompletionKey) {
        self.completed.lock().expect("lock poisoned").insert(key);
    }

    fn add_system_message(&self, content: String) {
        self.chat
            .lock()
            .expect("lock poisoned")
            .add_system_message(content);
    }

    fn add_error_message(&self, content: String) {
        self.chat
            .lock()
            .expect("lock poisoned")
            .add_error_message(content);
    }
}
