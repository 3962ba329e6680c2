#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub emission_manager: Address,
    pub staked_token: Address,
    pub governance_token: Address,
    pub rewards_vault: Address,
    pub timestamp: u64,
}

/// Fired when a settlement credits rewards to `user`.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsAccruedEvent {
    pub user: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when rewards of `user` are claimed and staked for `to`.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsClaimedEvent {
    pub user: Address,
    pub to: Address,
    pub claimer: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimerSetEvent {
    pub user: Address,
    pub claimer: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    emission_manager: Address,
    staked_token: Address,
    governance_token: Address,
    rewards_vault: Address,
) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        emission_manager,
        staked_token,
        governance_token,
        rewards_vault,
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
    user: Address,
    to: Address,
    claimer: Address,
    amount: i128,
) {
    let topics = (symbol_short!("CLAIMED"), user.clone());
    let data = RewardsClaimedEvent {
        user,
        to,
        claimer,
        amount,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_claimer_set(env: &Env, user: Address, claimer: Address) {
    let topics = (symbol_short!("CLAIMER"), user.clone());
    let data = ClaimerSetEvent {
        user,
        claimer,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
