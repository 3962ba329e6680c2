#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, BytesN, Env};

use crate::voting::PowerType;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub emission_manager: Address,
    pub governance_token: Address,
    pub rewards_vault: Address,
    pub heatup_seconds: u64,
    pub unstake_window: u64,
    pub timestamp: u64,
}

/// Fired when governance tokens are staked for `on_behalf_of`.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub on_behalf_of: Address,
    pub amount: i128,
    pub new_total_supply: i128,
    pub timestamp: u64,
}

/// Fired when a staker redeems during the unstake window.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RedeemedEvent {
    pub staker: Address,
    pub to: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when a settlement credits rewards to a user.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsAccruedEvent {
    pub user: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when rewards are claimed; `restaked` of `amount` went back into
/// the stake of `to`.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsClaimedEvent {
    pub staker: Address,
    pub to: Address,
    pub amount: i128,
    pub restaked: i128,
    pub timestamp: u64,
}

/// Fired when a heatup is (re)started.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeatupActivatedEvent {
    pub user: Address,
    pub heatup: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when a delegator points a power track at a new delegatee.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelegateChangedEvent {
    pub delegator: Address,
    pub delegatee: Address,
    pub power_type: PowerType,
    pub timestamp: u64,
}

/// Fired whenever a snapshot records new power for `user`.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelegatedPowerChangedEvent {
    pub user: Address,
    pub power: i128,
    pub power_type: PowerType,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SigningKeyRegisteredEvent {
    pub owner: Address,
    pub public_key: BytesN<32>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferHookSetEvent {
    pub hook: Option<Address>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeRatioSetEvent {
    pub stake_ratio: u32,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    emission_manager: Address,
    governance_token: Address,
    rewards_vault: Address,
    heatup_seconds: u64,
    unstake_window: u64,
) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        emission_manager,
        governance_token,
        rewards_vault,
        heatup_seconds,
        unstake_window,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_staked(
    env: &Env,
    staker: Address,
    on_behalf_of: Address,
    amount: i128,
    new_total_supply: i128,
) {
    let topics = (symbol_short!("STAKED"), on_behalf_of.clone());
    let data = StakedEvent {
        staker,
        on_behalf_of,
        amount,
        new_total_supply,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_redeemed(env: &Env, staker: Address, to: Address, amount: i128) {
    let topics = (symbol_short!("REDEEMED"), staker.clone());
    let data = RedeemedEvent {
        staker,
        to,
        amount,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_rewards_accrued(env: &Env, user: Address, amount: i128) {
    let topics = (symbol_short!("ACCRUED"), user.clone());
    let data = RewardsAccruedEvent {
        user,
        amount,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_rewards_claimed(
    env: &Env,
    staker: Address,
    to: Address,
    amount: i128,
    restaked: i128,
) {
    let topics = (symbol_short!("CLAIMED"), staker.clone());
    let data = RewardsClaimedEvent {
        staker,
        to,
        amount,
        restaked,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_heatup_activated(env: &Env, user: Address, heatup: u64) {
    let topics = (symbol_short!("HEATUP"), user.clone());
    let data = HeatupActivatedEvent {
        user,
        heatup,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_transfer(env: &Env, from: Address, to: Address, amount: i128) {
    let topics = (symbol_short!("TRANSFER"), from.clone(), to.clone());
    let data = TransferEvent {
        from,
        to,
        amount,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_approval(env: &Env, owner: Address, spender: Address, amount: i128) {
    let topics = (symbol_short!("APPROVE"), owner.clone(), spender.clone());
    let data = ApprovalEvent {
        owner,
        spender,
        amount,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_delegate_changed(
    env: &Env,
    delegator: Address,
    delegatee: Address,
    power_type: PowerType,
) {
    let topics = (symbol_short!("DLG_CHG"), delegator.clone());
    let data = DelegateChangedEvent {
        delegator,
        delegatee,
        power_type,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_delegated_power_changed(
    env: &Env,
    user: Address,
    power: i128,
    power_type: PowerType,
) {
    let topics = (symbol_short!("PWR_CHG"), user.clone());
    let data = DelegatedPowerChangedEvent {
        user,
        power,
        power_type,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_signing_key_registered(env: &Env, owner: Address, public_key: BytesN<32>) {
    let topics = (symbol_short!("KEY_REG"), owner.clone());
    let data = SigningKeyRegisteredEvent {
        owner,
        public_key,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_transfer_hook_set(env: &Env, hook: Option<Address>) {
    let topics = (symbol_short!("HOOK_SET"),);
    let data = TransferHookSetEvent {
        hook,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_stake_ratio_set(env: &Env, stake_ratio: u32) {
    let topics = (symbol_short!("RATIO_SET"),);
    let data = StakeRatioSetEvent {
        stake_ratio,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
