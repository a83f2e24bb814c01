use serde::{Deserialize, Serialize};

use crate::Share;

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WinningJudgementPrivateInput {
    pub id: usize,
    pub am_werewolf: Share,
    pub player_randomness: Share,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WinningJudgementPublicInput {
    pub pedersen_param: serde_json::Value,
    pub player_commitment: Vec<serde_json::Value>,
    pub num_alive: usize,
}
