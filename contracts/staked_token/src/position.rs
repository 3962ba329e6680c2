//! Staked balances, total supply, allowances and unclaimed rewards.
//!
//! Per-user persistent storage uses tuple keys: `(prefix, user_address)`.

use common::{TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::{voting, ContractError};

const TOTAL_SUPPLY: Symbol = symbol_short!("TOT_SUP");
const BALANCE: Symbol = symbol_short!("BAL");
const UNCLAIMED: Symbol = symbol_short!("UNCLAIMED");
const ALLOWANCE: Symbol = symbol_short!("ALLOW");

fn bump(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Balances ─────────────────────────────────────────────────────────────────

pub fn balance(env: &Env, user: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(BALANCE, user.clone()))
        .unwrap_or(0)
}

fn store_balance(env: &Env, user: &Address, amount: i128) {
    let key = (BALANCE, user.clone());
    env.storage().persistent().set(&key, &amount);
    bump(env, &key);
}

pub fn total_supply(env: &Env) -> i128 {
    env.storage().instance().get(&TOTAL_SUPPLY).unwrap_or(0)
}

/// Apply a balance move and its voting-power side effects.
///
/// `from == None` mints, `to == None` burns. Reward settlement and heatup
/// bookkeeping are the caller's job and must already be done.
pub fn move_balance(
    env: &Env,
    from: Option<&Address>,
    to: Option<&Address>,
    amount: i128,
) -> Result<(), ContractError> {
    voting::on_balance_move(env, from, to, amount)?;

    let mut supply = total_supply(env);
    match from {
        Some(from) => {
            let held = balance(env, from);
            if held < amount {
                return Err(ContractError::InsufficientBalance);
            }
            store_balance(env, from, held - amount);
        }
        None => {
            supply = supply
                .checked_add(amount)
                .ok_or(ContractError::MathOverflow)?;
        }
    }
    match to {
        Some(to) => {
            let held = balance(env, to);
            let next = held.checked_add(amount).ok_or(ContractError::MathOverflow)?;
            store_balance(env, to, next);
        }
        None => {
            supply = supply
                .checked_sub(amount)
                .ok_or(ContractError::MathOverflow)?;
        }
    }
    env.storage().instance().set(&TOTAL_SUPPLY, &supply);
    Ok(())
}

// ── Unclaimed rewards ────────────────────────────────────────────────────────

pub fn unclaimed(env: &Env, user: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(UNCLAIMED, user.clone()))
        .unwrap_or(0)
}

pub fn set_unclaimed(env: &Env, user: &Address, amount: i128) {
    let key = (UNCLAIMED, user.clone());
    env.storage().persistent().set(&key, &amount);
    bump(env, &key);
}

pub fn add_unclaimed(env: &Env, user: &Address, amount: i128) -> Result<i128, ContractError> {
    let total = unclaimed(env, user)
        .checked_add(amount)
        .ok_or(ContractError::MathOverflow)?;
    set_unclaimed(env, user, total);
    Ok(total)
}

// ── Allowances ───────────────────────────────────────────────────────────────

pub fn allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(ALLOWANCE, owner.clone(), spender.clone()))
        .unwrap_or(0)
}

pub fn set_allowance(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    let key = (ALLOWANCE, owner.clone(), spender.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn spend_allowance(
    env: &Env,
    owner: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), ContractError> {
    let approved = allowance(env, owner, spender);
    if approved < amount {
        return Err(ContractError::InsufficientAllowance);
    }
    set_allowance(env, owner, spender, approved - amount);
    Ok(())
}
