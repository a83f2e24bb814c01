use thiserror::Error;

/// クライアント全体のエラー分類
#[derive(Error, Debug)]
pub enum ClientError {
    /// 暗号パラメータが未ロード。パラメータ取得後に再試行できる
    #[error("Crypto parameters are not available yet")]
    ParametersUnavailable,

    #[error("Encryption failed for {operation}: {reason}")]
    EncryptionFailed { operation: String, reason: String },

    #[error("Proof submission rejected (status {status}): {message}")]
    SubmissionRejected { status: u16, message: String },

    /// サーバー側で既に完了済み。エラーではなく成功として扱う
    #[error("Submission already completed for this phase")]
    AlreadyCompleted,

    #[error("Divination decrypt failed: {0}")]
    DecryptionFailed(String),

    #[error("Push channel disconnected")]
    PushChannelDisconnected,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Player {0} not found in game snapshot")]
    PlayerNotFound(String),

    #[error("{0}")]
    State(String),
}

impl ClientError {
    /// 提出エラーのうち「既に完了済み」をべき等成功へ折りたたむ判定
    pub fn is_benign(&self) -> bool {
        matches!(self, ClientError::AlreadyCompleted)
    }
}
