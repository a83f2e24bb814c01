use serde::{Deserialize, Serialize};

use crate::Share;

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousVotingPrivateInput {
    pub id: usize,
    pub is_target_id: Vec<Share>,
    pub player_randomness: Share,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousVotingPublicInput {
    pub pedersen_param: serde_json::Value,
    pub player_commitment: Vec<serde_json::Value>,
    pub player_num: usize,
}
