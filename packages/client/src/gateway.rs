use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use mpc_inputs::{
    AnonymousVotingEncryption, AnonymousVotingInput, CircuitEncryptedInput, DivinationEncryption,
    DivinationInput, KeyPublicizeEncryption, KeyPublicizeInput, RoleAssignmentEncryption,
    RoleAssignmentInput, SplitAndEncrypt, WinningJudgementEncryption, WinningJudgementInput,
};

use crate::error::ClientError;
use crate::models::api::ProofType;

/// 不透明な暗号バックエンドの能力面。操作ごとに1エントリポイント、
/// 入出力はシリアライズ済みJSON文字列
pub trait CryptoBackend: Send + Sync {
    fn initialize(&self) -> anyhow::Result<()>;

    fn encrypt_role_assignment(&self, input: &str) -> anyhow::Result<String>;
    fn encrypt_key_publicize(&self, input: &str) -> anyhow::Result<String>;
    fn encrypt_divination(&self, input: &str) -> anyhow::Result<String>;
    fn encrypt_anonymous_voting(&self, input: &str) -> anyhow::Result<String>;
    fn encrypt_winning_judgement(&self, input: &str) -> anyhow::Result<String>;
}

/// mpc-inputsのシェア分割・暗号化に委譲する本番バックエンド
pub struct MpcInputBackend;

impl CryptoBackend for MpcInputBackend {
    fn initialize(&self) -> anyhow::Result<()> {
        // シェア分割は追加の初期化を要しない
        Ok(())
    }

    fn encrypt_role_assignment(&self, input: &str) -> anyhow::Result<String> {
        let input: RoleAssignmentInput = serde_json::from_str(input)?;
        let output = RoleAssignmentEncryption::create_encrypted_shares(&input)?;
        Ok(serde_json::to_string(
            &CircuitEncryptedInput::RoleAssignment(output),
        )?)
    }

    fn encrypt_key_publicize(&self, input: &str) -> anyhow::Result<String> {
        let input: KeyPublicizeInput = serde_json::from_str(input)?;
        let output = KeyPublicizeEncryption::create_encrypted_shares(&input)?;
        Ok(serde_json::to_string(&CircuitEncryptedInput::KeyPublicize(
            output,
        ))?)
    }

    fn encrypt_divination(&self, input: &str) -> anyhow::Result<String> {
        let input: DivinationInput = serde_json::from_str(input)?;
        let output = DivinationEncryption::create_encrypted_shares(&input)?;
        Ok(serde_json::to_string(&CircuitEncryptedInput::Divination(
            output,
        ))?)
    }

    fn encrypt_anonymous_voting(&self, input: &str) -> anyhow::Result<String> {
        let input: AnonymousVotingInput = serde_json::from_str(input)?;
        let output = AnonymousVotingEncryption::create_encrypted_shares(&input)?;
        Ok(serde_json::to_string(
            &CircuitEncryptedInput::AnonymousVoting(output),
        )?)
    }

    fn encrypt_winning_judgement(&self, input: &str) -> anyhow::Result<String> {
        let input: WinningJudgementInput = serde_json::from_str(input)?;
        let output = WinningJudgementEncryption::create_encrypted_shares(&input)?;
        Ok(serde_json::to_string(&CircuitEncryptedInput::WinningJudge(
            output,
        ))?)
    }
}

/// バックエンドの遅延初期化（高々一度）と操作タグ付きのエラー変換を担う
pub struct EncryptionGateway {
    backend: Arc<dyn CryptoBackend>,
    init: OnceCell<()>,
}

impl EncryptionGateway {
    pub fn new(backend: Arc<dyn CryptoBackend>) -> Self {
        EncryptionGateway {
            backend,
            init: OnceCell::new(),
        }
    }

    pub async fn encrypt(
        &self,
        operation: ProofType,
        input_json: &str,
    ) -> Result<String, ClientError> {
        self.ensure_initialized().await?;

        debug!(operation = %operation, "encrypting phase input");

        let result = match operation {
            ProofType::RoleAssignment => self.backend.encrypt_role_assignment(input_json),
            ProofType::KeyPublicize => self.backend.encrypt_key_publicize(input_json),
            ProofType::Divination => self.backend.encrypt_divination(input_json),
            ProofType::AnonymousVoting => self.backend.encrypt_anonymous_voting(input_json),
            ProofType::WinningJudge => self.backend.encrypt_winning_judgement(input_json),
        };

        result.map_err(|e| ClientError::EncryptionFailed {
            operation: operation.to_string(),
            reason: e.to_string(),
        })
    }

    async fn ensure_initialized(&self) -> Result<(), ClientError> {
        self.init
            .get_or_try_init(|| async {
                self.backend
                    .initialize()
                    .map_err(|e| ClientError::EncryptionFailed {
                        operation: "initialize".to_string(),
                        reason: e.to_string(),
                    })
            })
            .await?;
        Ok(())
    }
}
