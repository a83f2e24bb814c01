use serde::{Deserialize, Serialize};

use crate::Share;

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct KeyPublicizePrivateInput {
    pub id: usize,
    pub pub_key_or_dummy_x: Vec<Share>,
    pub pub_key_or_dummy_y: Vec<Share>,
    pub is_fortune_teller: Vec<Share>,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct KeyPublicizePublicInput {
    pub pedersen_param: serde_json::Value,
    pub player_num: usize,
}
