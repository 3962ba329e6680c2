//! Heatup (cooldown) state machine.
//!
//! A staker must activate a heatup and wait `heatup_seconds` before the
//! unstake window of `unstake_window` seconds opens. Incoming stake or
//! transfers never start a heatup; they only push an active one later in
//! proportion to the amount mixed in.

use common::{TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

const HEATUP: Symbol = symbol_short!("HEATUP");

/// Where a staker stands relative to their heatup timestamp.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum HeatupState {
    /// No heatup has been activated.
    Idle = 0,
    /// Heatup active, redemption not yet allowed.
    Heating = 1,
    /// Inside the unstake window.
    Redeemable = 2,
    /// The unstake window passed; a new heatup is required.
    Expired = 3,
}

// ── Storage ──────────────────────────────────────────────────────────────────

fn heatup_key(user: &Address) -> (Symbol, Address) {
    (HEATUP, user.clone())
}

/// Heatup timestamp of `user`, `0` when idle.
pub fn load(env: &Env, user: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&heatup_key(user))
        .unwrap_or(0)
}

pub fn store(env: &Env, user: &Address, timestamp: u64) {
    let key = heatup_key(user);
    if timestamp == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &timestamp);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── State machine ────────────────────────────────────────────────────────────

pub fn state_at(heatup: u64, now: u64, heatup_seconds: u64, unstake_window: u64) -> HeatupState {
    if heatup == 0 {
        return HeatupState::Idle;
    }
    let ready_at = heatup.saturating_add(heatup_seconds);
    if now <= ready_at {
        HeatupState::Heating
    } else if now - ready_at <= unstake_window {
        HeatupState::Redeemable
    } else {
        HeatupState::Expired
    }
}

/// Guard for `redeem`.
///
/// # Errors
/// - [`ContractError::InsufficientHeatup`] — idle, or the heatup period has
///   not fully elapsed.
/// - [`ContractError::WindowFinished`] — the unstake window already closed.
pub fn require_redeemable(
    heatup: u64,
    now: u64,
    heatup_seconds: u64,
    unstake_window: u64,
) -> Result<(), ContractError> {
    match state_at(heatup, now, heatup_seconds, unstake_window) {
        HeatupState::Redeemable => Ok(()),
        HeatupState::Idle | HeatupState::Heating => Err(ContractError::InsufficientHeatup),
        HeatupState::Expired => Err(ContractError::WindowFinished),
    }
}

/// Heatup timestamp of a receiver after `amount` arrives from a sender whose
/// heatup is `from_heatup`.
///
/// 1. An idle receiver stays idle.
/// 2. A receiver whose window already closed becomes idle.
/// 3. An idle or expired sender counts as starting its heatup `now`.
/// 4. A sender that is further along leaves the receiver unchanged.
/// 5. Otherwise the result is the amount-weighted average of both
///    timestamps, truncated.
pub fn next_heatup(
    from_heatup: u64,
    amount: i128,
    to_heatup: u64,
    to_balance: i128,
    now: u64,
    heatup_seconds: u64,
    unstake_window: u64,
) -> u64 {
    if to_heatup == 0 {
        return 0;
    }

    let minimal_valid = now
        .saturating_sub(heatup_seconds)
        .saturating_sub(unstake_window);
    if to_heatup < minimal_valid {
        return 0;
    }

    let effective_from = if from_heatup == 0 || from_heatup < minimal_valid {
        now
    } else {
        from_heatup
    };
    if effective_from < to_heatup {
        return to_heatup;
    }

    weighted_heatup(effective_from, amount, to_heatup, to_balance)
}

/// `(amount * from + balance * to) / (amount + balance)` for `from >= to`,
/// evaluated as `to + amount * (from - to) / (amount + balance)` which is
/// exact under truncation and keeps the product small.
fn weighted_heatup(from: u64, amount: i128, to: u64, balance: i128) -> u64 {
    let amount = u128::try_from(amount).unwrap_or(0);
    let balance = u128::try_from(balance).unwrap_or(0);
    let Some(weight) = amount.checked_add(balance).filter(|w| *w != 0) else {
        return to;
    };

    let gap = u128::from(from - to);
    match amount.checked_mul(gap) {
        Some(product) => {
            // product / weight <= gap, so the sum stays within u64.
            let shift = u64::try_from(product / weight).unwrap_or(from - to);
            to + shift
        }
        None => from,
    }
}
