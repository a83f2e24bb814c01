use serde::{Deserialize, Serialize};

/// proofエンドポイントが受け付ける操作種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofType {
    RoleAssignment,
    KeyPublicize,
    Divination,
    AnonymousVoting,
    WinningJudge,
}

impl std::fmt::Display for ProofType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProofType::RoleAssignment => "RoleAssignment",
            ProofType::KeyPublicize => "KeyPublicize",
            ProofType::Divination => "Divination",
            ProofType::AnonymousVoting => "AnonymousVoting",
            ProofType::WinningJudge => "WinningJudge",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofRequest {
    pub proof_type: ProofType,
    pub data: ProofData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofData {
    /// サーバー側の記録用。秘密分散のインデックスではなく不透明ID
    pub user_id: String,
    pub prover_count: usize,
    /// 暗号化済みシェアバンドルのJSON文字列
    pub encrypted_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProofResponse {
    pub batch_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DivinationDecryptRequest {
    pub player_id: String,
    pub private_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DivinationDecryptResponse {
    pub is_werewolf: bool,
}
