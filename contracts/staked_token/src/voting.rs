//! # Voting power ledger
//!
//! Two independent power tracks, voting and proposition, each with its own
//! delegation edges and per-address snapshot history. Every balance move
//! shifts power between the effective delegatees of both sides and appends
//! (or overwrites, within the same ledger) a snapshot for each affected
//! address, so historical power can be read back by ledger sequence.
//!
//! Delegation by signature uses ed25519 keys. A key is bound to its owner
//! once via [`register_signing_key`] (with proof of possession); afterwards
//! anyone may relay a signed delegation for that owner.

use common::{TTL_EXTEND_TO, TTL_THRESHOLD};
use soroban_sdk::{contracttype, xdr::ToXdr, Address, Bytes, BytesN, Env};

use crate::{events, ContractError};

// ── Types ────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PowerType {
    Voting = 0,
    Proposition = 1,
}

impl PowerType {
    pub const ALL: [PowerType; 2] = [PowerType::Voting, PowerType::Proposition];
}

/// Power held by an address from `ledger` onwards.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    pub ledger: u32,
    pub value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum VotingKey {
    Delegatee(PowerType, Address),
    SnapshotCount(PowerType, Address),
    Snapshot(PowerType, Address, u32),
    SigningKey(BytesN<32>),
}

fn persist<V>(env: &Env, key: &VotingKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Delegation edges ─────────────────────────────────────────────────────────

/// Effective delegatee of `delegator` for `power_type` (itself when unset).
pub fn delegatee(env: &Env, delegator: &Address, power_type: PowerType) -> Address {
    env.storage()
        .persistent()
        .get(&VotingKey::Delegatee(power_type, delegator.clone()))
        .unwrap_or_else(|| delegator.clone())
}

fn store_delegatee(env: &Env, delegator: &Address, delegatee: &Address, power_type: PowerType) {
    let key = VotingKey::Delegatee(power_type, delegator.clone());
    if delegator == delegatee {
        env.storage().persistent().remove(&key);
    } else {
        persist(env, &key, delegatee);
    }
}

// ── Snapshots ────────────────────────────────────────────────────────────────

pub fn snapshot_count(env: &Env, user: &Address, power_type: PowerType) -> u32 {
    env.storage()
        .persistent()
        .get(&VotingKey::SnapshotCount(power_type, user.clone()))
        .unwrap_or(0)
}

fn snapshot(env: &Env, user: &Address, power_type: PowerType, position: u32) -> Option<Snapshot> {
    env.storage()
        .persistent()
        .get(&VotingKey::Snapshot(power_type, user.clone(), position))
}

fn write_snapshot(env: &Env, user: &Address, power_type: PowerType, value: i128) {
    let ledger = env.ledger().sequence();
    let count = snapshot_count(env, user, power_type);
    let entry = Snapshot { ledger, value };

    let last = count
        .checked_sub(1)
        .and_then(|position| snapshot(env, user, power_type, position).map(|s| (position, s)));
    match last {
        Some((position, previous)) if previous.ledger == ledger => {
            persist(env, &VotingKey::Snapshot(power_type, user.clone(), position), &entry);
        }
        _ => {
            persist(env, &VotingKey::Snapshot(power_type, user.clone(), count), &entry);
            persist(
                env,
                &VotingKey::SnapshotCount(power_type, user.clone()),
                &count.saturating_add(1),
            );
        }
    }

    events::publish_delegated_power_changed(env, user.clone(), value, power_type);
}

/// Latest recorded power of `user`.
pub fn power_current(env: &Env, user: &Address, power_type: PowerType) -> i128 {
    snapshot_count(env, user, power_type)
        .checked_sub(1)
        .and_then(|position| snapshot(env, user, power_type, position))
        .map(|s| s.value)
        .unwrap_or(0)
}

/// Power of `user` as of `ledger`: the latest snapshot at or before it.
pub fn power_at(env: &Env, user: &Address, power_type: PowerType, ledger: u32) -> i128 {
    let count = snapshot_count(env, user, power_type);
    if count == 0 {
        return 0;
    }
    let load = |position: u32| snapshot(env, user, power_type, position);

    match load(count - 1) {
        Some(last) if last.ledger <= ledger => return last.value,
        None => return 0,
        _ => {}
    }
    match load(0) {
        Some(first) if first.ledger > ledger => return 0,
        None => return 0,
        _ => {}
    }

    let mut lower = 0u32;
    let mut upper = count - 1;
    while upper > lower {
        let center = upper - (upper - lower) / 2;
        let Some(entry) = load(center) else {
            break;
        };
        if entry.ledger == ledger {
            return entry.value;
        } else if entry.ledger < ledger {
            lower = center;
        } else {
            upper = center - 1;
        }
    }
    load(lower).map(|s| s.value).unwrap_or(0)
}

// ── Power movement ───────────────────────────────────────────────────────────

fn move_power(
    env: &Env,
    from: Option<&Address>,
    to: Option<&Address>,
    amount: i128,
    power_type: PowerType,
) -> Result<(), ContractError> {
    if from == to || amount == 0 {
        return Ok(());
    }
    if let Some(from) = from {
        let previous = power_current(env, from, power_type);
        let next = previous
            .checked_sub(amount)
            .ok_or(ContractError::MathOverflow)?;
        write_snapshot(env, from, power_type, next);
    }
    if let Some(to) = to {
        let previous = power_current(env, to, power_type);
        let next = previous
            .checked_add(amount)
            .ok_or(ContractError::MathOverflow)?;
        write_snapshot(env, to, power_type, next);
    }
    Ok(())
}

/// Shift power on both tracks for a balance move of `amount`.
///
/// `None` stands for the mint (`from`) or burn (`to`) side.
pub fn on_balance_move(
    env: &Env,
    from: Option<&Address>,
    to: Option<&Address>,
    amount: i128,
) -> Result<(), ContractError> {
    for power_type in PowerType::ALL {
        let from_delegatee = from.map(|user| delegatee(env, user, power_type));
        let to_delegatee = to.map(|user| delegatee(env, user, power_type));
        move_power(
            env,
            from_delegatee.as_ref(),
            to_delegatee.as_ref(),
            amount,
            power_type,
        )?;
    }
    Ok(())
}

/// Point `delegator`'s `power_type` power at `new_delegatee`, carrying the
/// delegator's whole `balance` along.
pub fn delegate(
    env: &Env,
    delegator: &Address,
    new_delegatee: &Address,
    power_type: PowerType,
    balance: i128,
) -> Result<(), ContractError> {
    let previous = delegatee(env, delegator, power_type);
    store_delegatee(env, delegator, new_delegatee, power_type);
    events::publish_delegate_changed(env, delegator.clone(), new_delegatee.clone(), power_type);
    move_power(env, Some(&previous), Some(new_delegatee), balance, power_type)
}

// ── Signed delegation ────────────────────────────────────────────────────────

/// Message an owner signs to bind `owner` to their ed25519 key on `contract`.
pub fn key_registration_message(env: &Env, contract: &Address, owner: &Address) -> Bytes {
    let mut msg = Bytes::from_slice(env, b"register_signing_key");
    msg.append(&contract.clone().to_xdr(env));
    msg.append(&owner.clone().to_xdr(env));
    msg
}

/// Message signed for a delegation by signature.
///
/// `power_type == None` delegates both tracks.
///
/// Format: tag || contract(xdr) || delegatee(xdr) || [type(4 BE)]
///         || nonce(8 BE) || expiry(8 BE)
pub fn delegation_message(
    env: &Env,
    contract: &Address,
    delegatee: &Address,
    power_type: Option<PowerType>,
    nonce: u64,
    expiry: u64,
) -> Bytes {
    let tag: &[u8] = match power_type {
        Some(_) => b"delegate_by_type",
        None => b"delegate",
    };
    let mut msg = Bytes::from_slice(env, tag);
    msg.append(&contract.clone().to_xdr(env));
    msg.append(&delegatee.clone().to_xdr(env));
    if let Some(power_type) = power_type {
        msg.append(&Bytes::from_slice(env, &(power_type as u32).to_be_bytes()));
    }
    msg.append(&Bytes::from_slice(env, &nonce.to_be_bytes()));
    msg.append(&Bytes::from_slice(env, &expiry.to_be_bytes()));
    msg
}

/// Bind `public_key` to `owner` after checking `signature` over the
/// registration message.
///
/// Panics if the signature is invalid (Soroban host behavior).
pub fn register_signing_key(
    env: &Env,
    owner: &Address,
    public_key: &BytesN<32>,
    signature: &BytesN<64>,
) {
    let message = key_registration_message(env, &env.current_contract_address(), owner);
    env.crypto().ed25519_verify(public_key, &message, signature);
    persist(env, &VotingKey::SigningKey(public_key.clone()), owner);
}

pub fn signing_key_owner(env: &Env, public_key: &BytesN<32>) -> Option<Address> {
    env.storage()
        .persistent()
        .get(&VotingKey::SigningKey(public_key.clone()))
}

/// Recover the address that signed `message` with `public_key`.
///
/// # Errors
/// - [`ContractError::InvalidSignature`] — the key is not bound to any
///   address. A signature that does not verify aborts the invocation.
pub fn recover_signer(
    env: &Env,
    public_key: &BytesN<32>,
    message: &Bytes,
    signature: &BytesN<64>,
) -> Result<Address, ContractError> {
    let signer = signing_key_owner(env, public_key).ok_or(ContractError::InvalidSignature)?;
    env.crypto().ed25519_verify(public_key, message, signature);
    Ok(signer)
}
