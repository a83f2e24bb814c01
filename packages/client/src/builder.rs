use rand::{rngs::StdRng, Rng, SeedableRng};

use nalgebra as na;

use mpc_inputs::{
    AnonymousVotingInput, AnonymousVotingPrivateInput, AnonymousVotingPublicInput, DivinationInput,
    DivinationPrivateInput, DivinationPublicInput, KeyPublicizeInput, KeyPublicizePrivateInput,
    KeyPublicizePublicInput, RoleAssignmentInput, RoleAssignmentPrivateInput,
    RoleAssignmentPublicInput, Share, WinningJudgementInput, WinningJudgementPrivateInput,
    WinningJudgementPublicInput,
};

use crate::error::ClientError;
use crate::models::game::GameSnapshot;
use crate::models::role::Role;
use crate::params::CryptoParameters;

/// フェーズ入力の純粋な構築器。ネットワークにも暗号バックエンドにも触らない。
/// 同じ引数からは常に同じ入力が得られる
pub struct InputBuilder;

impl InputBuilder {
    /// 役職割り当て。全プレイヤーが本物の入力を提出する
    pub fn role_assignment(
        snapshot: &GameSnapshot,
        player_index: usize,
        shuffle_seed: u64,
        params: &CryptoParameters,
    ) -> Result<RoleAssignmentInput, ClientError> {
        let player_num = snapshot.players.len();
        let player_randomness = Self::player_randomness(params, player_index)?;

        let mut rng = StdRng::seed_from_u64(shuffle_seed);
        let shuffle_matrix = permutation_matrix(player_num, &mut rng);
        let randomness = rng.gen_range(0..params.scheme.modulus);

        Ok(RoleAssignmentInput {
            private_input: RoleAssignmentPrivateInput {
                id: player_index,
                shuffle_matrix,
                randomness,
                player_randomness,
            },
            public_input: RoleAssignmentPublicInput {
                num_players: player_num,
                max_group_size: params.grouping_parameter.num_werewolves.max(1),
                pedersen_param: params.pedersen_param.clone(),
                grouping_parameter: params.grouping_parameter.clone(),
                tau_matrix: params.tau_matrix.clone(),
                role_commitment: params.role_commitment.clone(),
                player_commitment: params.player_commitment.clone(),
            },
            node_keys: params.node_keys.clone(),
            scheme: params.scheme.clone(),
        })
    }

    /// 鍵公開。占い師だけが実鍵を載せ、他は同形のダミーを載せる
    pub fn key_publicize(
        snapshot: &GameSnapshot,
        player_index: usize,
        role: Option<Role>,
        elgamal_pub_key_xy: Option<(Share, Share)>,
        params: &CryptoParameters,
    ) -> Result<KeyPublicizeInput, ClientError> {
        let player_num = snapshot.players.len();
        // player_randomnessの存在確認でパラメータ完全性も検査する
        let _ = Self::player_randomness(params, player_index)?;

        let mut pub_key_or_dummy_x = vec![0; player_num];
        let mut pub_key_or_dummy_y = vec![0; player_num];
        let mut is_fortune_teller = vec![0; player_num];

        if let (Some(role), Some((x, y))) = (role, elgamal_pub_key_xy) {
            if role.is_seer() {
                pub_key_or_dummy_x[player_index] = params.scheme.reduce(x);
                pub_key_or_dummy_y[player_index] = params.scheme.reduce(y);
                is_fortune_teller[player_index] = 1;
            }
        }

        Ok(KeyPublicizeInput {
            private_input: KeyPublicizePrivateInput {
                id: player_index,
                pub_key_or_dummy_x,
                pub_key_or_dummy_y,
                is_fortune_teller,
            },
            public_input: KeyPublicizePublicInput {
                pedersen_param: params.pedersen_param.clone(),
                player_num,
            },
            node_keys: params.node_keys.clone(),
            scheme: params.scheme.clone(),
        })
    }

    /// 占い入力。占い師が対象を選んだ場合のみone-hot、それ以外は全ゼロのダミー。
    /// ダミーも本物と完全に同じ形でなければ提出パターンから役職が漏れる
    pub fn divination(
        snapshot: &GameSnapshot,
        player_index: usize,
        role: Option<Role>,
        target_index: Option<usize>,
        params: &CryptoParameters,
    ) -> Result<DivinationInput, ClientError> {
        let player_num = snapshot.players.len();
        let player_randomness = Self::player_randomness(params, player_index)?;

        let is_target_id = match (role, target_index) {
            (Some(role), Some(target)) if role.is_seer() => {
                Self::check_target(target, player_num)?;
                one_hot(player_num, target)
            }
            _ => vec![0; player_num],
        };

        Ok(DivinationInput {
            private_input: DivinationPrivateInput {
                id: player_index,
                is_target_id,
                player_randomness,
            },
            public_input: DivinationPublicInput {
                pedersen_param: params.pedersen_param.clone(),
                elgamal_param: params.elgamal_param.clone(),
                pub_key: params.elgamal_pub_key.clone(),
                player_num,
            },
            node_keys: params.node_keys.clone(),
            scheme: params.scheme.clone(),
        })
    }

    /// 匿名投票。全プレイヤーが本物の対象を載せる
    pub fn anonymous_voting(
        snapshot: &GameSnapshot,
        player_index: usize,
        target_index: usize,
        params: &CryptoParameters,
    ) -> Result<AnonymousVotingInput, ClientError> {
        let player_num = snapshot.players.len();
        let player_randomness = Self::player_randomness(params, player_index)?;
        Self::check_target(target_index, player_num)?;

        Ok(AnonymousVotingInput {
            private_input: AnonymousVotingPrivateInput {
                id: player_index,
                is_target_id: one_hot(player_num, target_index),
                player_randomness,
            },
            public_input: AnonymousVotingPublicInput {
                pedersen_param: params.pedersen_param.clone(),
                player_commitment: params.player_commitment.clone(),
                player_num,
            },
            node_keys: params.node_keys.clone(),
            scheme: params.scheme.clone(),
        })
    }

    /// 勝利判定。毎ラウンド全員が提出する
    pub fn winning_judgement(
        snapshot: &GameSnapshot,
        player_index: usize,
        role: Option<Role>,
        params: &CryptoParameters,
    ) -> Result<WinningJudgementInput, ClientError> {
        let player_randomness = Self::player_randomness(params, player_index)?;

        let am_werewolf = match role {
            Some(role) if role.is_werewolf() => 1,
            _ => 0,
        };

        Ok(WinningJudgementInput {
            private_input: WinningJudgementPrivateInput {
                id: player_index,
                am_werewolf,
                player_randomness,
            },
            public_input: WinningJudgementPublicInput {
                pedersen_param: params.pedersen_param.clone(),
                player_commitment: params.player_commitment.clone(),
                num_alive: snapshot.alive_count(),
            },
            node_keys: params.node_keys.clone(),
            scheme: params.scheme.clone(),
        })
    }

    fn player_randomness(
        params: &CryptoParameters,
        player_index: usize,
    ) -> Result<Share, ClientError> {
        // 足りないパラメータで部分的な入力を作らない
        params
            .player_randomness
            .get(player_index)
            .copied()
            .ok_or(ClientError::ParametersUnavailable)
    }

    fn check_target(target: usize, player_num: usize) -> Result<(), ClientError> {
        if target >= player_num {
            return Err(ClientError::State(format!(
                "target index {} out of range for {} players",
                target, player_num
            )));
        }
        Ok(())
    }
}

fn one_hot(len: usize, index: usize) -> Vec<Share> {
    let mut v = vec![0; len];
    v[index] = 1;
    v
}

fn permutation_matrix(n: usize, rng: &mut StdRng) -> na::DMatrix<Share> {
    // Fisher-Yatesで置換を作り、置換行列に展開する
    let mut perm: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        perm.swap(i, j);
    }

    let mut matrix = na::DMatrix::<Share>::zeros(n, n);
    for (row, col) in perm.into_iter().enumerate() {
        matrix[(row, col)] = 1;
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::{GamePhase, GameResult, Player};

    fn snapshot(player_num: usize) -> GameSnapshot {
        GameSnapshot {
            room_id: "room1".to_string(),
            name: "Test Room".to_string(),
            players: (0..player_num)
                .map(|i| Player {
                    id: format!("p{}", i + 1),
                    name: format!("Player{}", i + 1),
                    is_dead: false,
                    is_ready: true,
                    role: None,
                })
                .collect(),
            phase: GamePhase::Night,
            result: GameResult::InProgress,
            crypto_parameters: None,
        }
    }

    fn params(player_num: usize) -> CryptoParameters {
        crate::params::tests::test_parameters(player_num)
    }

    #[test]
    fn seer_divination_is_one_hot_and_villager_dummy_matches_shape() {
        let snapshot = snapshot(4);
        let params = params(4);

        let seer_input =
            InputBuilder::divination(&snapshot, 0, Some(Role::Seer), Some(1), &params).unwrap();
        assert_eq!(seer_input.private_input.is_target_id, vec![0, 1, 0, 0]);

        let villager_input =
            InputBuilder::divination(&snapshot, 2, Some(Role::Villager), Some(1), &params).unwrap();
        assert_eq!(villager_input.private_input.is_target_id, vec![0, 0, 0, 0]);
        assert_eq!(
            villager_input.private_input.is_target_id.len(),
            seer_input.private_input.is_target_id.len()
        );
    }

    #[test]
    fn private_id_is_player_index_across_operations() {
        let snapshot = snapshot(4);
        let params = params(4);
        let index = snapshot.player_index("p3").unwrap();
        assert_eq!(index, 2);

        let ra = InputBuilder::role_assignment(&snapshot, index, 42, &params).unwrap();
        let dv = InputBuilder::divination(&snapshot, index, None, None, &params).unwrap();
        let av = InputBuilder::anonymous_voting(&snapshot, index, 0, &params).unwrap();
        let wj = InputBuilder::winning_judgement(&snapshot, index, None, &params).unwrap();

        assert_eq!(ra.private_input.id, index);
        assert_eq!(dv.private_input.id, index);
        assert_eq!(av.private_input.id, index);
        assert_eq!(wj.private_input.id, index);
    }

    #[test]
    fn role_assignment_is_deterministic_for_same_seed() {
        let snapshot = snapshot(4);
        let params = params(4);

        let a = InputBuilder::role_assignment(&snapshot, 0, 7, &params).unwrap();
        let b = InputBuilder::role_assignment(&snapshot, 0, 7, &params).unwrap();
        assert_eq!(a.private_input.shuffle_matrix, b.private_input.shuffle_matrix);
        assert_eq!(a.private_input.randomness, b.private_input.randomness);
    }

    #[test]
    fn shuffle_matrix_is_a_permutation() {
        let snapshot = snapshot(5);
        let params = params(5);

        let input = InputBuilder::role_assignment(&snapshot, 1, 99, &params).unwrap();
        let m = &input.private_input.shuffle_matrix;

        for row in 0..5 {
            assert_eq!(m.row(row).iter().sum::<u64>(), 1);
        }
        for col in 0..5 {
            assert_eq!(m.column(col).iter().sum::<u64>(), 1);
        }
    }

    #[test]
    fn werewolf_judgement_flag() {
        let snapshot = snapshot(4);
        let params = params(4);

        let wolf = InputBuilder::winning_judgement(&snapshot, 1, Some(Role::Werewolf), &params)
            .unwrap();
        assert_eq!(wolf.private_input.am_werewolf, 1);

        let villager =
            InputBuilder::winning_judgement(&snapshot, 2, Some(Role::Villager), &params).unwrap();
        assert_eq!(villager.private_input.am_werewolf, 0);
    }

    #[test]
    fn vote_target_out_of_range_is_rejected() {
        let snapshot = snapshot(4);
        let params = params(4);

        let result = InputBuilder::anonymous_voting(&snapshot, 0, 9, &params);
        assert!(matches!(result, Err(ClientError::State(_))));
    }

    #[test]
    fn missing_player_randomness_fails_fast() {
        let snapshot = snapshot(4);
        // 3人分しか乱数がないパラメータ
        let params = params(3);

        let result = InputBuilder::divination(&snapshot, 3, None, None, &params);
        assert!(matches!(result, Err(ClientError::ParametersUnavailable)));
    }

    #[test]
    fn key_publicize_real_only_for_seer() {
        let snapshot = snapshot(4);
        let params = params(4);

        let seer =
            InputBuilder::key_publicize(&snapshot, 0, Some(Role::Seer), Some((5, 6)), &params)
                .unwrap();
        assert_eq!(seer.private_input.is_fortune_teller, vec![1, 0, 0, 0]);
        assert_eq!(seer.private_input.pub_key_or_dummy_x[0], 5);

        let villager =
            InputBuilder::key_publicize(&snapshot, 1, Some(Role::Villager), None, &params).unwrap();
        assert_eq!(villager.private_input.is_fortune_teller, vec![0, 0, 0, 0]);
        assert_eq!(villager.private_input.pub_key_or_dummy_x, vec![0, 0, 0, 0]);
    }
}
