use serde::{Deserialize, Serialize};

use crate::Share;

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DivinationPrivateInput {
    pub id: usize,
    /// 占い対象のone-hotベクトル（占い師以外は全ゼロのダミー）
    pub is_target_id: Vec<Share>,
    pub player_randomness: Share,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DivinationPublicInput {
    pub pedersen_param: serde_json::Value,
    pub elgamal_param: serde_json::Value,
    pub pub_key: serde_json::Value,
    pub player_num: usize,
}
