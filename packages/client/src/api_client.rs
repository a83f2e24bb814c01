use reqwest::Client;
use std::time::Duration;
use tracing::info;

use crate::error::ClientError;
use crate::models::api::{
    DivinationDecryptRequest, DivinationDecryptResponse, ErrorResponse, ProofRequest,
    ProofResponse,
};
use crate::models::game::GameSnapshot;

/// ゲームサーバーへの唯一のHTTP窓口。テストでは偽トランスポートに差し替える
pub struct GameApiClient {
    client: Client,
    base_url: String,
}

impl GameApiClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, base_url }
    }

    /// SERVER_URL環境変数から接続先を組み立てる
    pub fn from_env() -> Self {
        Self::new(crate::utils::config::CONFIG.server_url.clone())
    }

    /// 暗号化済み入力をproofエンドポイントへ提出してbatch_idを得る。
    /// 「already completed」系の拒否はAlreadyCompletedへ折りたたむ
    pub async fn submit_proof(
        &self,
        room_id: &str,
        request: &ProofRequest,
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .post(format!("{}/game/{}/proof", self.base_url, room_id))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let proof_response = response.json::<ProofResponse>().await?;
            info!(
                proof_type = %request.proof_type,
                batch_id = %proof_response.batch_id,
                "proof submitted"
            );
            return Ok(proof_response.batch_id);
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };

        if message.contains("already been completed") || message.contains("already completed") {
            return Err(ClientError::AlreadyCompleted);
        }

        Err(ClientError::SubmissionRejected {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn fetch_game_state(&self, room_id: &str) -> Result<GameSnapshot, ClientError> {
        let response = self
            .client
            .get(format!("{}/game/{}/state", self.base_url, room_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::SubmissionRejected {
                status: status.as_u16(),
                message: format!("state fetch failed: {}", status),
            });
        }

        Ok(response.json::<GameSnapshot>().await?)
    }

    /// 占い結果の復号。暗号文が平文になる唯一の地点
    pub async fn decrypt_divination(
        &self,
        room_id: &str,
        request: &DivinationDecryptRequest,
    ) -> Result<bool, ClientError> {
        let response = self
            .client
            .post(format!(
                "{}/game/{}/divination/decrypt",
                self.base_url, room_id
            ))
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::DecryptionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            return Err(ClientError::DecryptionFailed(message));
        }

        let body = response
            .json::<DivinationDecryptResponse>()
            .await
            .map_err(|e| ClientError::DecryptionFailed(e.to_string()))?;
        Ok(body.is_werewolf)
    }
}
