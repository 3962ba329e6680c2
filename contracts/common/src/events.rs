#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env, Vec};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired when an asset's emission schedule or share ratio is replaced.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetConfigUpdatedEvent {
    pub asset: Address,
    pub emission_schedule: Vec<i128>,
    pub share_ratio: u32,
    pub timestamp: u64,
}

/// Fired when an asset's distribution start is moved.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributionStartSetEvent {
    pub asset: Address,
    pub distribution_start: u64,
    pub timestamp: u64,
}

/// Fired whenever the cumulative index of an asset advances.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetIndexUpdatedEvent {
    pub asset: Address,
    pub index: i128,
    pub timestamp: u64,
}

/// Fired when a user's settled index catches up with the asset index.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserIndexUpdatedEvent {
    pub user: Address,
    pub asset: Address,
    pub index: i128,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_asset_config_updated(
    env: &Env,
    asset: Address,
    emission_schedule: Vec<i128>,
    share_ratio: u32,
) {
    let topics = (symbol_short!("ASSET_CFG"), asset.clone());
    let data = AssetConfigUpdatedEvent {
        asset,
        emission_schedule,
        share_ratio,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_distribution_start_set(env: &Env, asset: Address, distribution_start: u64) {
    let topics = (symbol_short!("START_SET"), asset.clone());
    let data = DistributionStartSetEvent {
        asset,
        distribution_start,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_asset_index_updated(env: &Env, asset: Address, index: i128) {
    let topics = (symbol_short!("IDX_UPD"), asset.clone());
    let data = AssetIndexUpdatedEvent {
        asset,
        index,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_user_index_updated(env: &Env, user: Address, asset: Address, index: i128) {
    let topics = (symbol_short!("USR_IDX"), user.clone(), asset.clone());
    let data = UserIndexUpdatedEvent {
        user,
        asset,
        index,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
