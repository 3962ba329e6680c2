#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Reward accrual checked against a direct per-second integration.
//!
//! Invariants tested:
//! - The distribution index never decreases
//! - Rewards owed to all stakers never exceed what the schedule allocated
//! - Truncation loses at most one unit per settlement

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::StellarAssetClient;
use soroban_sdk::{vec, Address, Env};
use staked_token::{StakedTokenContract, StakedTokenContractClient};

const T0: u64 = 1_000_000;
const MONTH: u64 = 2_592_000;
const SCHEDULE: [i128; 3] = [100, 200, 50];
const USERS: usize = 3;

#[derive(Debug, Clone, Arbitrary)]
enum Action {
    Stake {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "1i128..1_000_000_000")]
        amount: i128,
    },
    Transfer {
        #[proptest(strategy = "0usize..USERS")]
        from: usize,
        #[proptest(strategy = "0usize..USERS")]
        to: usize,
        #[proptest(strategy = "1i128..1_000_000_000")]
        amount: i128,
    },
    Advance {
        #[proptest(strategy = "1u64..3_000_000")]
        seconds: u64,
    },
}

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Harness {
    env: Env,
    client: StakedTokenContractClient<'static>,
    token: Address,
    users: std::vec::Vec<Address>,
}

fn setup(share_ratio: u32) -> Harness {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(T0 - 100);

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(StakedTokenContract, ());
    let client = StakedTokenContractClient::new(&env, &contract_id);

    let manager = Address::generate(&env);
    client.initialize(&manager, &token, &Address::generate(&env), &864_000, &172_800);
    client.configure_distribution(
        &manager,
        &vec![&env, SCHEDULE[0], SCHEDULE[1], SCHEDULE[2]],
        &share_ratio,
    );
    client.set_distribution_start(&manager, &T0);
    env.ledger().set_timestamp(T0);

    let users = (0..USERS).map(|_| Address::generate(&env)).collect();
    Harness {
        env,
        client,
        token,
        users,
    }
}

/// Tokens the schedule emits over `[from, to)`, one second at a time per
/// month bucket.
fn emitted(from: u64, to: u64) -> i128 {
    let mut total = 0i128;
    for (month, rate) in SCHEDULE.iter().enumerate() {
        let month_start = T0 + month as u64 * MONTH;
        let month_end = month_start + MONTH;
        let lo = from.max(month_start);
        let hi = to.min(month_end);
        if hi > lo {
            total += rate * i128::from(hi - lo);
        }
    }
    total
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_accrual_matches_direct_integration(
        share_ratio in prop::sample::select(std::vec![2_500u32, 5_000, 10_000]),
        actions in prop::collection::vec(any::<Action>(), 1..20),
    ) {
        let h = setup(share_ratio);
        let mut first_stake: Option<u64> = None;
        let mut last_index = 0i128;

        for action in &actions {
            match action {
                Action::Stake { user, amount } => {
                    let user = &h.users[*user];
                    StellarAssetClient::new(&h.env, &h.token).mint(user, amount);
                    h.client.stake(user, user, amount);
                    if first_stake.is_none() {
                        first_stake = Some(h.env.ledger().timestamp());
                    }
                }
                Action::Transfer { from, to, amount } => {
                    let amount = (*amount).min(h.client.balance(&h.users[*from]));
                    if amount > 0 {
                        h.client.transfer(&h.users[*from], &h.users[*to], &amount);
                    }
                }
                Action::Advance { seconds } => {
                    let now = h.env.ledger().timestamp();
                    h.env.ledger().set_timestamp(now + seconds);
                }
            }

            let index = h.client.get_asset_state().index;
            prop_assert!(index >= last_index, "index decreased");
            last_index = index;
        }

        let now = h.env.ledger().timestamp();
        let allocated = match first_stake {
            Some(start) => emitted(start, now) * i128::from(share_ratio) / 10_000,
            None => 0,
        };
        let owed: i128 = h
            .users
            .iter()
            .map(|user| h.client.get_total_rewards_balance(user))
            .sum();

        let settlements = (actions.len() * 3 + USERS * 2) as i128;
        prop_assert!(owed <= allocated, "owed {} > allocated {}", owed, allocated);
        prop_assert!(
            owed >= allocated - settlements,
            "owed {} lost more than {} against {}",
            owed,
            settlements,
            allocated
        );
    }

    /// A lone staker earns the allocated emission to within one unit.
    #[test]
    fn prop_single_staker_earns_full_allocation(
        amount in 1i128..1_000_000_000_000,
        entry in 0u64..MONTH,
        hold in 1u64..(3 * MONTH),
    ) {
        let h = setup(5_000);
        let user = &h.users[0];

        h.env.ledger().set_timestamp(T0 + entry);
        StellarAssetClient::new(&h.env, &h.token).mint(user, &amount);
        h.client.stake(user, user, &amount);

        h.env.ledger().set_timestamp(T0 + entry + hold);
        let expected = emitted(T0 + entry, T0 + entry + hold) / 2;
        let owed = h.client.get_total_rewards_balance(user);

        prop_assert!(owed <= expected);
        prop_assert!(owed >= expected - 1, "owed {} expected {}", owed, expected);
    }
}
