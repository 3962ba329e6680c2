//! # Nonce-based Replay Protection
//!
//! Per-signer strictly-monotonic nonces for signed actions (delegation by
//! signature). Each signer maintains an independent counter in persistent
//! storage. A signed payload is only accepted when its nonce equals the
//! current expected value; on success the counter is incremented exactly
//! once.
//!
//! ```ignore
//! nonce::validate_and_increment_nonce(&env, &signer, payload.nonce)?;
//! // ... apply the signed action
//! ```

use soroban_sdk::{contracttype, Address, Env};

use crate::{CommonError, TTL_EXTEND_TO, TTL_THRESHOLD};

// ── Storage key ──────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum NonceKey {
    Nonce(Address),
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn load_nonce(env: &Env, signer: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&NonceKey::Nonce(signer.clone()))
        .unwrap_or(0u64)
}

fn store_nonce(env: &Env, signer: &Address, value: u64) {
    let key = NonceKey::Nonce(signer.clone());
    env.storage().persistent().set(&key, &value);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Return the nonce the next signed action of `signer` must carry.
///
/// New signers always start at `0`.
pub fn current_nonce(env: &Env, signer: &Address) -> u64 {
    load_nonce(env, signer)
}

/// Validate that `provided` equals the expected nonce for `signer`, then
/// increment the stored counter.
///
/// # Errors
/// - [`CommonError::InvalidNonce`] — `provided` does not match the expected value.
/// - [`CommonError::NonceOverflow`] — the counter is already at `u64::MAX`.
pub fn validate_and_increment_nonce(
    env: &Env,
    signer: &Address,
    provided: u64,
) -> Result<(), CommonError> {
    let expected = load_nonce(env, signer);
    if provided != expected {
        return Err(CommonError::InvalidNonce);
    }
    let next = expected.checked_add(1).ok_or(CommonError::NonceOverflow)?;
    store_nonce(env, signer, next);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
