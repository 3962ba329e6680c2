#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Voting power conservation under arbitrary stake, transfer and
//! delegation sequences.
//!
//! Invariants tested:
//! - On each power track, the power held by all addresses equals the total
//!   supply
//! - Nobody ever holds negative power

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::StellarAssetClient;
use soroban_sdk::{Address, Env};
use staked_token::voting::PowerType;
use staked_token::{StakedTokenContract, StakedTokenContractClient};

const USERS: usize = 4;

#[derive(Debug, Clone, Arbitrary)]
enum Action {
    Stake {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "1i128..1_000_000")]
        amount: i128,
    },
    Transfer {
        #[proptest(strategy = "0usize..USERS")]
        from: usize,
        #[proptest(strategy = "0usize..USERS")]
        to: usize,
        #[proptest(strategy = "1i128..1_000_000")]
        amount: i128,
    },
    Delegate {
        #[proptest(strategy = "0usize..USERS")]
        delegator: usize,
        #[proptest(strategy = "0usize..USERS")]
        delegatee: usize,
        proposition_only: Option<bool>,
    },
    NextLedger,
}

fn setup() -> (Env, StakedTokenContractClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_sequence_number(1);

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(StakedTokenContract, ());
    let client = StakedTokenContractClient::new(&env, &contract_id);
    client.initialize(
        &Address::generate(&env),
        &token,
        &Address::generate(&env),
        &864_000,
        &172_800,
    );
    (env, client, token)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_power_is_conserved(actions in prop::collection::vec(any::<Action>(), 1..25)) {
        let (env, client, token) = setup();
        let users: std::vec::Vec<Address> = (0..USERS).map(|_| Address::generate(&env)).collect();

        for action in &actions {
            match action {
                Action::Stake { user, amount } => {
                    StellarAssetClient::new(&env, &token).mint(&users[*user], amount);
                    client.stake(&users[*user], &users[*user], amount);
                }
                Action::Transfer { from, to, amount } => {
                    let amount = (*amount).min(client.balance(&users[*from]));
                    if amount > 0 {
                        client.transfer(&users[*from], &users[*to], &amount);
                    }
                }
                Action::Delegate { delegator, delegatee, proposition_only } => {
                    let (delegator, delegatee) = (&users[*delegator], &users[*delegatee]);
                    match proposition_only {
                        None => client.delegate(delegator, delegatee),
                        Some(true) => {
                            client.delegate_by_type(delegator, delegatee, &PowerType::Proposition)
                        }
                        Some(false) => {
                            client.delegate_by_type(delegator, delegatee, &PowerType::Voting)
                        }
                    }
                }
                Action::NextLedger => {
                    let sequence = env.ledger().sequence();
                    env.ledger().set_sequence_number(sequence + 1);
                }
            }

            for power_type in PowerType::ALL {
                let powers: std::vec::Vec<i128> = users
                    .iter()
                    .map(|user| client.get_power_current(user, &power_type))
                    .collect();
                prop_assert!(powers.iter().all(|power| *power >= 0));
                prop_assert_eq!(powers.iter().sum::<i128>(), client.total_supply());
            }
        }
    }
}
