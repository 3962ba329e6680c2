//! # Distribution ledger
//!
//! Per-asset reward-index accounting shared by the staked token and the
//! incentives orchestrator.
//!
//! Every tracked asset owns an emission schedule of per-second rates, one
//! rate per 30-day month counted from `distribution_start`. The schedule is
//! integrated into a cumulative 1e18 fixed-point index; a user's accrual is
//! their balance multiplied by the index movement since their last
//! settlement.
//!
//! The ledger never moves tokens. Callers pass the relevant balances and the
//! action's cached `now` in, and receive accrued amounts back.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::{
    events,
    math::{self, MAX_BPS},
    CommonError, TTL_EXTEND_TO, TTL_THRESHOLD,
};

/// Length of one emission-schedule bucket.
pub const MONTH_SECONDS: u64 = 2_592_000;

// ── Storage key ──────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum DistributionKey {
    Asset(Address),
    UserIndex(Address, Address),
}

// ── Types ────────────────────────────────────────────────────────────────────

/// Distribution state of one asset.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetDistribution {
    /// Cumulative rewards per staked unit, scaled by 1e18.
    pub index: i128,
    /// Basis points of the raw emission allocated to this asset.
    pub share_ratio: u32,
    pub last_update: u64,
    /// `0` while the distribution is unconfigured.
    pub distribution_start: u64,
    /// Per-second emission for each consecutive month.
    pub emission_schedule: Vec<i128>,
}

impl AssetDistribution {
    fn unconfigured(env: &Env) -> Self {
        Self {
            index: 0,
            share_ratio: 0,
            last_update: 0,
            distribution_start: 0,
            emission_schedule: Vec::new(env),
        }
    }

    pub fn distribution_end(&self) -> u64 {
        let months = u64::from(self.emission_schedule.len());
        self.distribution_start
            .saturating_add(months.saturating_mul(MONTH_SECONDS))
    }
}

/// One row of a multi-asset accrual preview.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserAssetStake {
    pub asset: Address,
    pub staked_by_user: i128,
    pub total_staked: i128,
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn extend_ttl(env: &Env, key: &DistributionKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Current distribution state of `asset` (zeroed when never configured).
pub fn asset_state(env: &Env, asset: &Address) -> AssetDistribution {
    env.storage()
        .persistent()
        .get(&DistributionKey::Asset(asset.clone()))
        .unwrap_or_else(|| AssetDistribution::unconfigured(env))
}

fn store_asset(env: &Env, asset: &Address, state: &AssetDistribution) {
    let key = DistributionKey::Asset(asset.clone());
    env.storage().persistent().set(&key, state);
    extend_ttl(env, &key);
}

/// Index at which `user`'s accrual on `asset` was last settled.
pub fn user_index(env: &Env, asset: &Address, user: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DistributionKey::UserIndex(asset.clone(), user.clone()))
        .unwrap_or(0)
}

fn store_user_index(env: &Env, asset: &Address, user: &Address, index: i128) {
    let key = DistributionKey::UserIndex(asset.clone(), user.clone());
    env.storage().persistent().set(&key, &index);
    extend_ttl(env, &key);
}

pub fn distribution_end(env: &Env, asset: &Address) -> u64 {
    asset_state(env, asset).distribution_end()
}

// ── Emission integration ─────────────────────────────────────────────────────

/// Tokens emitted over `[from, to)`.
///
/// Walks the months forward from the one containing `from` to the one
/// containing `to`; each month contributes its rate times the seconds of the
/// interval that fall inside it, so every second lands in exactly one bucket.
fn emission_between(
    schedule: &Vec<i128>,
    start: u64,
    from: u64,
    to: u64,
) -> Result<i128, CommonError> {
    if from >= to {
        return Ok(0);
    }
    let first_month = (from - start) / MONTH_SECONDS;
    let last_month = (to - start) / MONTH_SECONDS;

    let mut emission: i128 = 0;
    for month in first_month..=last_month {
        let month_start = start.saturating_add(month.saturating_mul(MONTH_SECONDS));
        let month_end = month_start.saturating_add(MONTH_SECONDS);
        let seconds = to.min(month_end).saturating_sub(from.max(month_start));
        if seconds == 0 {
            continue;
        }
        let Some(rate) = u32::try_from(month).ok().and_then(|m| schedule.get(m)) else {
            break;
        };
        let month_emission = rate
            .checked_mul(i128::from(seconds))
            .ok_or(CommonError::MathOverflow)?;
        emission = emission
            .checked_add(month_emission)
            .ok_or(CommonError::MathOverflow)?;
    }
    Ok(emission)
}

/// Index `state` would hold at `now` for `total_staked`, without writing it.
fn compute_index(
    env: &Env,
    state: &AssetDistribution,
    total_staked: i128,
    now: u64,
) -> Result<i128, CommonError> {
    let start = state.distribution_start;
    let end = state.distribution_end();
    if state.emission_schedule.is_empty()
        || total_staked <= 0
        || start == 0
        || start > now
        || state.last_update >= now
        || state.last_update >= end
    {
        return Ok(state.index);
    }

    let current = now.min(end);
    let from = state.last_update.max(start);
    let emission = emission_between(&state.emission_schedule, start, from, current)?;
    if emission == 0 {
        return Ok(state.index);
    }
    let delta = math::index_delta(env, emission, state.share_ratio, total_staked)?;
    state
        .index
        .checked_add(delta)
        .ok_or(CommonError::MathOverflow)
}

/// Bring `asset` up to `now` and persist it.
fn settle(
    env: &Env,
    asset: &Address,
    total_staked: i128,
    now: u64,
) -> Result<AssetDistribution, CommonError> {
    let mut state = asset_state(env, asset);
    if now <= state.last_update {
        return Ok(state);
    }

    let index = compute_index(env, &state, total_staked, now)?;
    if index != state.index {
        state.index = index;
        events::publish_asset_index_updated(env, asset.clone(), index);
    }
    // Seconds with nothing staked are dropped, never credited later.
    state.last_update = now;
    store_asset(env, asset, &state);
    Ok(state)
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Replace the emission schedule and share ratio of `asset`.
///
/// The index is first settled under the old configuration so the change
/// never applies retroactively.
///
/// # Errors
/// - [`CommonError::InvalidConfig`] — `share_ratio` above 10 000 bps or a
///   negative rate in the schedule.
pub fn configure_asset(
    env: &Env,
    asset: &Address,
    emission_schedule: Vec<i128>,
    share_ratio: u32,
    total_staked: i128,
    now: u64,
) -> Result<(), CommonError> {
    if share_ratio > MAX_BPS {
        return Err(CommonError::InvalidConfig);
    }
    if emission_schedule.iter().any(|rate| rate < 0) {
        return Err(CommonError::InvalidConfig);
    }

    let mut state = settle(env, asset, total_staked, now)?;
    state.emission_schedule = emission_schedule.clone();
    state.share_ratio = share_ratio;
    state.last_update = state.last_update.max(now);
    store_asset(env, asset, &state);

    events::publish_asset_config_updated(env, asset.clone(), emission_schedule, share_ratio);
    Ok(())
}

/// Move the start of `asset`'s schedule, settling under the old start first.
pub fn set_distribution_start(
    env: &Env,
    asset: &Address,
    distribution_start: u64,
    total_staked: i128,
    now: u64,
) -> Result<(), CommonError> {
    let mut state = settle(env, asset, total_staked, now)?;
    state.distribution_start = distribution_start;
    state.last_update = state.last_update.max(now);
    store_asset(env, asset, &state);

    events::publish_distribution_start_set(env, asset.clone(), distribution_start);
    Ok(())
}

/// Advance the index of `asset` to `now` and return it.
///
/// Returns the stored index unchanged when the schedule is empty, nothing is
/// staked, the distribution has not started, the index is already current,
/// or the distribution has ended.
pub fn update_index(
    env: &Env,
    asset: &Address,
    total_staked: i128,
    now: u64,
) -> Result<i128, CommonError> {
    Ok(settle(env, asset, total_staked, now)?.index)
}

/// Settle `user`'s accrual on `asset` and return the newly accrued amount.
///
/// `staked_by_user` must be the user's balance *before* the mutation that
/// triggered the settlement. The user's index is recorded even when nothing
/// accrued.
pub fn update_user_accrual(
    env: &Env,
    asset: &Address,
    user: &Address,
    staked_by_user: i128,
    total_staked: i128,
    now: u64,
) -> Result<i128, CommonError> {
    let index = update_index(env, asset, total_staked, now)?;
    let previous = user_index(env, asset, user);
    if previous == index {
        return Ok(0);
    }

    let accrued = if staked_by_user > 0 {
        math::accrued_rewards(env, staked_by_user, index, previous)?
    } else {
        0
    };
    store_user_index(env, asset, user, index);
    events::publish_user_index_updated(env, user.clone(), asset.clone(), index);
    Ok(accrued)
}

/// Rewards `user` would accrue across `stakes` if settled at `now`.
///
/// Read-only: runs the same arithmetic as [`update_index`] without storing
/// anything.
pub fn preview_unclaimed(
    env: &Env,
    user: &Address,
    stakes: &Vec<UserAssetStake>,
    now: u64,
) -> Result<i128, CommonError> {
    let mut total: i128 = 0;
    for stake in stakes.iter() {
        if stake.staked_by_user <= 0 {
            continue;
        }
        let state = asset_state(env, &stake.asset);
        let index = compute_index(env, &state, stake.total_staked, now)?;
        let previous = user_index(env, &stake.asset, user);
        let accrued = math::accrued_rewards(env, stake.staked_by_user, index, previous)?;
        total = total.checked_add(accrued).ok_or(CommonError::MathOverflow)?;
    }
    Ok(total)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
