use soroban_sdk::{Env, I256};

use crate::CommonError;

/// Fixed-point scale of every distribution index.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

/// Basis-point denominator (100 %).
pub const MAX_BPS: u32 = 10_000;

fn wide(env: &Env, value: i128) -> I256 {
    I256::from_i128(env, value)
}

/// `a * b / denominator`, truncated toward zero.
///
/// The product is formed in 256 bits so only a quotient that does not fit in
/// `i128` can fail.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Result<i128, CommonError> {
    if denominator == 0 {
        return Err(CommonError::MathOverflow);
    }
    wide(env, a)
        .mul(&wide(env, b))
        .div(&wide(env, denominator))
        .to_i128()
        .ok_or(CommonError::MathOverflow)
}

/// Index movement produced by `emission` tokens, of which `share_ratio` bps
/// belong to the distribution, spread over `total_staked` units:
/// `emission * 1e18 * share_ratio / 10000 / total_staked`.
pub fn index_delta(
    env: &Env,
    emission: i128,
    share_ratio: u32,
    total_staked: i128,
) -> Result<i128, CommonError> {
    if total_staked <= 0 {
        return Err(CommonError::MathOverflow);
    }
    let numerator = wide(env, emission)
        .mul(&wide(env, PRECISION))
        .mul(&wide(env, i128::from(share_ratio)));
    // floor(floor(x / a) / b) == floor(x / (a * b)) for positive operands.
    let denominator = wide(env, total_staked).mul(&wide(env, i128::from(MAX_BPS)));
    numerator
        .div(&denominator)
        .to_i128()
        .ok_or(CommonError::MathOverflow)
}

/// Rewards owed to `balance` units for an index movement from `user_index`
/// to `index`.
pub fn accrued_rewards(
    env: &Env,
    balance: i128,
    index: i128,
    user_index: i128,
) -> Result<i128, CommonError> {
    let movement = index
        .checked_sub(user_index)
        .ok_or(CommonError::MathOverflow)?;
    mul_div(env, balance, movement, PRECISION)
}
