use serde::{Deserialize, Serialize};

use crate::params::CryptoParameters;

/// サーバーが配信する公開ゲーム状態のスナップショット。クライアント側では読み取り専用
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GameSnapshot {
    pub room_id: String,
    pub name: String,
    pub players: Vec<Player>,
    pub phase: GamePhase,
    pub result: GameResult,
    pub crypto_parameters: Option<CryptoParameters>,
}

impl GameSnapshot {
    /// プレイヤーの秘密分散上の参加者インデックス（不透明IDとは別物）
    pub fn player_index(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_dead).count()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub is_dead: bool,
    pub is_ready: bool,
    /// サーバーには暗号化された形でしか存在しない場合がある
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Waiting,    // ゲーム開始前
    Night,      // 夜フェーズ
    Discussion, // 議論フェーズ
    Voting,     // 投票フェーズ
    Result,     // 結果発表フェーズ
    Finished,   // ゲーム終了
}

impl GamePhase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Waiting" => Some(GamePhase::Waiting),
            "Night" => Some(GamePhase::Night),
            "Discussion" => Some(GamePhase::Discussion),
            "Voting" => Some(GamePhase::Voting),
            "Result" => Some(GamePhase::Result),
            "Finished" => Some(GamePhase::Finished),
            _ => None,
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum GameResult {
    InProgress,
    VillagerWin, // 村人陣営勝利
    WerewolfWin, // 人狼陣営勝利
}
