use base64::{decode, encode};
use crypto_box::{
    aead::{Aead, AeadCore},
    PublicKey, SalsaBox, SecretKey,
};
use nalgebra as na;
use rand::rngs::OsRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::{types::*, NodeKey, SecretSharingScheme, Share};

#[derive(Debug, Error)]
pub enum EncryptError {
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid public key length")]
    InvalidKeyLength,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Encryption error: {0}")]
    Aead(String),
    #[error("Expected {expected} node keys, got {actual}")]
    NodeKeyCount { expected: usize, actual: usize },
}

pub trait SplitAndEncrypt {
    type Input;
    type Output;
    type ShareForNode: Serialize + DeserializeOwned;

    fn split(input: &Self::Input) -> Vec<Self::ShareForNode>;

    fn encrypt(
        plain_share: Self::ShareForNode,
        key: &NodeKey,
    ) -> Result<NodeEncryptedShare, EncryptError> {
        // Base64デコードされた公開鍵をPublicKeyに変換
        let recipient_key_bytes = decode(&key.public_key)?;

        let recipient_key = PublicKey::from(
            <[u8; 32]>::try_from(recipient_key_bytes.as_slice())
                .map_err(|_| EncryptError::InvalidKeyLength)?,
        );

        // エフェメラルキーペアの生成
        let ephemeral_secret = SecretKey::generate(&mut OsRng);
        let ephemeral_public_key = ephemeral_secret.public_key();
        let box_ = SalsaBox::new(&recipient_key, &ephemeral_secret);

        // シェアデータのシリアライズ
        let plain_data = serde_json::to_vec(&plain_share)?;

        // 暗号化
        let nonce = SalsaBox::generate_nonce(&mut OsRng);
        let encrypted_data = box_
            .encrypt(&nonce, plain_data.as_slice())
            .map_err(|e| EncryptError::Aead(e.to_string()))?;

        Ok(NodeEncryptedShare {
            node_id: key.node_id.clone(),
            encrypted_share: encode(&encrypted_data),
            nonce: encode(nonce),
            ephemeral_key: encode(ephemeral_public_key.to_bytes()),
        })
    }

    fn decrypt(
        encrypted_share: &NodeEncryptedShare,
        secret_key: &str,
    ) -> Result<Self::ShareForNode, anyhow::Error> {
        let encrypted_data = decode(&encrypted_share.encrypted_share)
            .map_err(|e| anyhow::anyhow!("Base64 decode error: {}", e))?;

        let secret_key_bytes = decode(secret_key)
            .map_err(|e| anyhow::anyhow!("Base64 decode error for secret key: {}", e))?;

        let secret_key = SecretKey::from_slice(&secret_key_bytes)
            .map_err(|_| anyhow::anyhow!("Invalid secret key length"))?;

        let ephemeral_public_key_bytes = decode(&encrypted_share.ephemeral_key)
            .map_err(|e| anyhow::anyhow!("Base64 decode error for ephemeral key: {}", e))?;
        let ephemeral_public_key = PublicKey::from_slice(&ephemeral_public_key_bytes)
            .map_err(|_| anyhow::anyhow!("Invalid ephemeral key length"))?;

        let nonce = *crypto_box::Nonce::from_slice(
            &decode(&encrypted_share.nonce)
                .map_err(|e| anyhow::anyhow!("Base64 decode error for nonce: {}", e))?,
        );

        let box_ = SalsaBox::new(&ephemeral_public_key, &secret_key);
        let decrypted_data = box_
            .decrypt(&nonce, encrypted_data.as_slice())
            .map_err(|e| anyhow::anyhow!("Decryption error: {}", e))?;

        serde_json::from_slice(&decrypted_data)
            .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))
    }

    fn create_encrypted_shares(input: &Self::Input) -> Result<Self::Output, EncryptError>;
}

pub struct AnonymousVotingEncryption;
pub struct KeyPublicizeEncryption;
pub struct RoleAssignmentEncryption;
pub struct DivinationEncryption;
pub struct WinningJudgementEncryption;

fn check_node_keys(
    node_keys: &[NodeKey],
    scheme: &SecretSharingScheme,
) -> Result<(), EncryptError> {
    if node_keys.len() != scheme.total_shares {
        return Err(EncryptError::NodeKeyCount {
            expected: scheme.total_shares,
            actual: node_keys.len(),
        });
    }
    Ok(())
}

impl SplitAndEncrypt for AnonymousVotingEncryption {
    type Input = AnonymousVotingInput;
    type Output = AnonymousVotingOutput;

    type ShareForNode = crate::AnonymousVotingPrivateInput;

    fn split(input: &Self::Input) -> Vec<Self::ShareForNode> {
        let scheme = &input.scheme;
        let private_input = &input.private_input;

        let is_target_share = split_vec(&private_input.is_target_id, scheme);
        let player_randomness_share = split_share(private_input.player_randomness, scheme);

        (0..scheme.total_shares)
            .map(|i| crate::AnonymousVotingPrivateInput {
                id: private_input.id,
                is_target_id: is_target_share.iter().map(|row| row[i]).collect(),
                player_randomness: player_randomness_share[i],
            })
            .collect::<Vec<_>>()
    }

    fn create_encrypted_shares(input: &Self::Input) -> Result<Self::Output, EncryptError> {
        check_node_keys(&input.node_keys, &input.scheme)?;

        let plain_shares = Self::split(input);

        let mut shares = Vec::new();
        for (i, node_key) in input.node_keys.iter().enumerate() {
            shares.push(Self::encrypt(plain_shares[i].clone(), node_key)?);
        }

        Ok(AnonymousVotingOutput {
            shares,
            public_input: input.public_input.clone(),
        })
    }
}

impl SplitAndEncrypt for KeyPublicizeEncryption {
    type Input = KeyPublicizeInput;
    type Output = KeyPublicizeOutput;

    type ShareForNode = crate::KeyPublicizePrivateInput;

    fn split(input: &Self::Input) -> Vec<Self::ShareForNode> {
        let scheme = &input.scheme;
        let private_input = &input.private_input;

        let pub_key_or_dummy_x_share = split_vec(&private_input.pub_key_or_dummy_x, scheme);
        let pub_key_or_dummy_y_share = split_vec(&private_input.pub_key_or_dummy_y, scheme);
        let is_fortune_teller_share = split_vec(&private_input.is_fortune_teller, scheme);

        (0..scheme.total_shares)
            .map(|i| crate::KeyPublicizePrivateInput {
                id: private_input.id,
                pub_key_or_dummy_x: pub_key_or_dummy_x_share.iter().map(|row| row[i]).collect(),
                pub_key_or_dummy_y: pub_key_or_dummy_y_share.iter().map(|row| row[i]).collect(),
                is_fortune_teller: is_fortune_teller_share.iter().map(|row| row[i]).collect(),
            })
            .collect::<Vec<_>>()
    }

    fn create_encrypted_shares(input: &Self::Input) -> Result<Self::Output, EncryptError> {
        check_node_keys(&input.node_keys, &input.scheme)?;

        let plain_shares = Self::split(input);

        let mut shares = Vec::new();
        for (i, node_key) in input.node_keys.iter().enumerate() {
            shares.push(Self::encrypt(plain_shares[i].clone(), node_key)?);
        }

        Ok(KeyPublicizeOutput {
            shares,
            public_input: input.public_input.clone(),
        })
    }
}

impl SplitAndEncrypt for RoleAssignmentEncryption {
    type Input = RoleAssignmentInput;
    type Output = RoleAssignmentOutput;

    type ShareForNode = crate::RoleAssignmentPrivateInput;

    fn split(input: &Self::Input) -> Vec<Self::ShareForNode> {
        let scheme = &input.scheme;
        let private_input = &input.private_input;

        let shuffle_matrix_share = split_matrix(&private_input.shuffle_matrix, scheme);
        let randomness_share = split_share(private_input.randomness, scheme);
        let player_randomness_share = split_share(private_input.player_randomness, scheme);

        (0..scheme.total_shares)
            .map(|i| crate::RoleAssignmentPrivateInput {
                id: private_input.id,
                shuffle_matrix: shuffle_matrix_share[i].clone(),
                randomness: randomness_share[i],
                player_randomness: player_randomness_share[i],
            })
            .collect::<Vec<_>>()
    }

    fn create_encrypted_shares(input: &Self::Input) -> Result<Self::Output, EncryptError> {
        check_node_keys(&input.node_keys, &input.scheme)?;

        let plain_shares = Self::split(input);

        let mut shares = Vec::new();
        for (i, node_key) in input.node_keys.iter().enumerate() {
            shares.push(Self::encrypt(plain_shares[i].clone(), node_key)?);
        }

        Ok(RoleAssignmentOutput {
            shares,
            public_input: input.public_input.clone(),
        })
    }
}

impl SplitAndEncrypt for DivinationEncryption {
    type Input = DivinationInput;
    type Output = DivinationOutput;

    type ShareForNode = crate::DivinationPrivateInput;

    fn split(input: &Self::Input) -> Vec<Self::ShareForNode> {
        let scheme = &input.scheme;
        let private_input = &input.private_input;

        let is_target_share = split_vec(&private_input.is_target_id, scheme);
        let player_randomness_share = split_share(private_input.player_randomness, scheme);

        (0..scheme.total_shares)
            .map(|i| crate::DivinationPrivateInput {
                id: private_input.id,
                is_target_id: is_target_share.iter().map(|row| row[i]).collect(),
                player_randomness: player_randomness_share[i],
            })
            .collect::<Vec<_>>()
    }

    fn create_encrypted_shares(input: &Self::Input) -> Result<Self::Output, EncryptError> {
        check_node_keys(&input.node_keys, &input.scheme)?;

        let plain_shares = Self::split(input);

        let mut shares = Vec::new();
        for (i, node_key) in input.node_keys.iter().enumerate() {
            shares.push(Self::encrypt(plain_shares[i].clone(), node_key)?);
        }

        Ok(DivinationOutput {
            shares,
            public_input: input.public_input.clone(),
        })
    }
}

impl SplitAndEncrypt for WinningJudgementEncryption {
    type Input = WinningJudgementInput;
    type Output = WinningJudgementOutput;

    type ShareForNode = crate::WinningJudgementPrivateInput;

    fn split(input: &Self::Input) -> Vec<Self::ShareForNode> {
        let scheme = &input.scheme;
        let private_input = &input.private_input;

        let am_werewolf_share = split_share(private_input.am_werewolf, scheme);
        let player_randomness_share = split_share(private_input.player_randomness, scheme);

        (0..scheme.total_shares)
            .map(|i| crate::WinningJudgementPrivateInput {
                id: private_input.id,
                am_werewolf: am_werewolf_share[i],
                player_randomness: player_randomness_share[i],
            })
            .collect::<Vec<_>>()
    }

    fn create_encrypted_shares(input: &Self::Input) -> Result<Self::Output, EncryptError> {
        check_node_keys(&input.node_keys, &input.scheme)?;

        let plain_shares = Self::split(input);

        let mut shares = Vec::new();
        for (i, node_key) in input.node_keys.iter().enumerate() {
            shares.push(Self::encrypt(plain_shares[i].clone(), node_key)?);
        }

        Ok(WinningJudgementOutput {
            shares,
            public_input: input.public_input.clone(),
        })
    }
}

// シンプルな加法分割: secret = s1 + s2 + ... + sn (mod modulus)
pub fn split_share(secret: Share, scheme: &SecretSharingScheme) -> Vec<Share> {
    let mut shares = Vec::with_capacity(scheme.total_shares);
    let mut sum = 0u64;
    let mut rng = rand::thread_rng();

    for _ in 0..(scheme.total_shares - 1) {
        let share = rand::Rng::gen_range(&mut rng, 0..scheme.modulus);
        shares.push(share);
        sum = (sum + share) % scheme.modulus;
    }
    let last_share = (scheme.modulus + secret % scheme.modulus - sum) % scheme.modulus;
    shares.push(last_share);

    shares
}

pub fn split_vec(values: &[Share], scheme: &SecretSharingScheme) -> Vec<Vec<Share>> {
    values.iter().map(|&x| split_share(x, scheme)).collect()
}

pub fn split_matrix(
    matrix: &na::DMatrix<Share>,
    scheme: &SecretSharingScheme,
) -> Vec<na::DMatrix<Share>> {
    let mut result =
        vec![na::DMatrix::<Share>::zeros(matrix.nrows(), matrix.ncols()); scheme.total_shares];

    for (idx, value) in matrix.iter().enumerate() {
        let shares = split_share(*value, scheme);
        for (i, share) in shares.into_iter().enumerate() {
            result[i][idx] = share;
        }
    }

    result
}

pub fn combine_shares(shares: &[Share], scheme: &SecretSharingScheme) -> Share {
    shares.iter().fold(0u64, |acc, s| (acc + s) % scheme.modulus)
}
