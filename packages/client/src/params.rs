use std::sync::{Arc, RwLock};

use nalgebra as na;
use serde::{Deserialize, Serialize};

use mpc_inputs::{GroupingParameter, NodeKey, SecretSharingScheme, Share};

use crate::error::ClientError;
use crate::models::game::GameSnapshot;

/// サーバーが配布する公開暗号パラメータ一式。ロード後は読み取り専用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoParameters {
    pub pedersen_param: serde_json::Value,
    pub elgamal_param: serde_json::Value,
    pub elgamal_pub_key: serde_json::Value,
    /// プレイヤーインデックス順のコミットメント
    pub player_commitment: Vec<serde_json::Value>,
    /// プレイヤーインデックス順のコミットメント用乱数
    pub player_randomness: Vec<Share>,
    pub role_commitment: Vec<serde_json::Value>,
    pub grouping_parameter: GroupingParameter,
    pub tau_matrix: na::DMatrix<Share>,
    pub node_keys: Vec<NodeKey>,
    pub scheme: SecretSharingScheme,
}

/// キャッシュは全置換のみ。部分更新が並行ビルダーから見えることはない
pub struct CryptoParameterStore {
    inner: RwLock<Option<Arc<CryptoParameters>>>,
}

impl Default for CryptoParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoParameterStore {
    pub fn new() -> Self {
        CryptoParameterStore {
            inner: RwLock::new(None),
        }
    }

    pub fn load(&self, params: CryptoParameters) {
        let mut guard = self.inner.write().expect("parameter store lock poisoned");
        *guard = Some(Arc::new(params));
    }

    /// スナップショットにパラメータが含まれていればキャッシュを置き換える
    pub fn load_from_snapshot(&self, snapshot: &GameSnapshot) -> bool {
        match &snapshot.crypto_parameters {
            Some(params) => {
                self.load(params.clone());
                true
            }
            None => false,
        }
    }

    pub fn get(&self) -> Result<Arc<CryptoParameters>, ClientError> {
        let guard = self.inner.read().expect("parameter store lock poisoned");
        guard.clone().ok_or(ClientError::ParametersUnavailable)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner
            .read()
            .expect("parameter store lock poisoned")
            .is_some()
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().expect("parameter store lock poisoned");
        *guard = None;
    }
}
