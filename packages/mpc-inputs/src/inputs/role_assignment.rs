use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::Share;

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentPrivateInput {
    pub id: usize,
    pub shuffle_matrix: na::DMatrix<Share>,
    pub randomness: Share,
    pub player_randomness: Share,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentPublicInput {
    // parameter
    pub num_players: usize,
    pub max_group_size: usize,
    pub pedersen_param: serde_json::Value,
    pub grouping_parameter: GroupingParameter,

    // instance
    pub tau_matrix: na::DMatrix<Share>,
    pub role_commitment: Vec<serde_json::Value>,
    pub player_commitment: Vec<serde_json::Value>,
}

/// 役職ごとの人数配分
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupingParameter {
    pub num_werewolves: usize,
    pub num_seers: usize,
    pub num_villagers: usize,
}

impl GroupingParameter {
    pub fn total(&self) -> usize {
        self.num_werewolves + self.num_seers + self.num_villagers
    }
}
