#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    vec, Address, Env,
};
use staked_token::{voting::PowerType, StakedTokenContract, StakedTokenContractClient};

const USERS: usize = 4;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { amount: u32 },
    StakeAndHeatup { amount: u32 },
    Heatup,
    Redeem { amount: u32 },
    Transfer { to: u8, amount: u32 },
    Claim { amount: u32 },
    Delegate { to: u8 },
    Advance { seconds: u32 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000);

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let manager = Address::generate(&env);
    let contract_id = env.register(StakedTokenContract, ());
    let client = StakedTokenContractClient::new(&env, &contract_id);
    let vault = Address::generate(&env);
    client.initialize(&manager, &token, &vault, &3_600, &600);
    client.configure_distribution(&manager, &vec![&env, 10i128, 5i128], &5_000);
    client.set_distribution_start(&manager, &1_000);

    StellarAssetClient::new(&env, &token).mint(&vault, &i128::from(u64::MAX));
    TokenClient::new(&env, &token).approve(&vault, &contract_id, &i128::from(u64::MAX), &10_000);

    let users: Vec<Address> = (0..USERS).map(|_| Address::generate(&env)).collect();

    // Errors are expected; panics and broken invariants are not.
    for (i, action) in actions.into_iter().enumerate() {
        let caller = &users[i % USERS];
        match action {
            FuzzAction::Stake { amount } => {
                StellarAssetClient::new(&env, &token).mint(caller, &i128::from(amount));
                let _ = client.try_stake(caller, caller, &i128::from(amount));
            }
            FuzzAction::StakeAndHeatup { amount } => {
                StellarAssetClient::new(&env, &token).mint(caller, &i128::from(amount));
                let _ = client.try_stake_and_activate_heatup(caller, &i128::from(amount));
            }
            FuzzAction::Heatup => {
                let _ = client.try_heatup(caller);
            }
            FuzzAction::Redeem { amount } => {
                let _ = client.try_redeem(caller, caller, &i128::from(amount));
            }
            FuzzAction::Transfer { to, amount } => {
                let to = &users[usize::from(to) % USERS];
                let _ = client.try_transfer(caller, to, &i128::from(amount));
            }
            FuzzAction::Claim { amount } => {
                let _ = client.try_claim_rewards(caller, caller, &i128::from(amount));
            }
            FuzzAction::Delegate { to } => {
                let to = &users[usize::from(to) % USERS];
                let _ = client.try_delegate(caller, to);
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now.saturating_add(u64::from(seconds)));
            }
        }

        let supply = client.total_supply();
        let held: i128 = users.iter().map(|user| client.balance(user)).sum();
        assert_eq!(supply, held, "total supply drifted from balances");
        for power_type in PowerType::ALL {
            let power: i128 = users
                .iter()
                .map(|user| client.get_power_current(user, &power_type))
                .sum();
            assert_eq!(power, supply, "power drifted from supply");
        }
    }
});
