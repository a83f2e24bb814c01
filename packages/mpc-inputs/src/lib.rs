use serde::{Deserialize, Serialize};

pub mod encryption;
pub mod inputs;
pub mod types;

pub use encryption::*;
pub use inputs::*;
pub use types::*;

/// 各フィールド要素は scheme.modulus を法とする剰余として扱う
pub type Share = u64;

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NodeKey {
    pub node_id: String,
    pub public_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretSharingScheme {
    pub total_shares: usize,
    pub modulus: u64,
}

impl SecretSharingScheme {
    pub fn reduce(&self, value: u64) -> Share {
        value % self.modulus
    }
}
