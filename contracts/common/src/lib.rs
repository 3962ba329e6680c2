//! Shared accounting and utilities for the staked-token contract suite.
//!
//! This crate provides:
//! - [`CommonError`] — error codes shared by every contract in the suite.
//! - [`distribution`] — the per-asset reward-index ledger driven by a monthly
//!   emission schedule.
//! - [`math`] — fixed-point helpers with 256-bit intermediates.
//! - [`nonce`] — per-signer replay protection for signed actions.

#![no_std]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod distribution;
pub mod events;
pub mod math;
pub mod nonce;

pub use distribution::{AssetDistribution, UserAssetStake, MONTH_SECONDS};
pub use math::{MAX_BPS, PRECISION};

/// Persistent entries are bumped to `TTL_EXTEND_TO` once they fall below
/// `TTL_THRESHOLD` ledgers of remaining life.
pub const TTL_THRESHOLD: u32 = 518_400;
pub const TTL_EXTEND_TO: u32 = 3_110_400;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Standardised error codes shared by every contract in the suite.
///
/// # Code ranges
/// | Range   | Purpose                       |
/// |---------|-------------------------------|
/// | 1 – 9   | Lifecycle / initialisation    |
/// | 10 – 19 | Authentication & authorisation|
/// | 30 – 39 | Validation / input            |
/// | 50 – 59 | Arithmetic                    |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    // ── Lifecycle (1–9) ──────────────────────────────────────
    /// The contract has not been initialised yet.
    NotInitialized = 1,

    /// The contract has already been initialised.
    AlreadyInitialized = 2,

    // ── Auth (10–19) ─────────────────────────────────────────
    /// The caller is not the emission manager or otherwise lacks the
    /// required permission.
    AccessDenied = 10,

    // ── Validation (30–39) ───────────────────────────────────
    /// One or more input parameters are invalid.
    InvalidInput = 30,

    /// A supplied nonce does not match the signer's expected nonce.
    InvalidNonce = 31,

    /// The signer's nonce counter cannot advance any further.
    NonceOverflow = 32,

    /// A distribution configuration is out of range (share ratio above
    /// 100 % or a negative emission rate).
    InvalidConfig = 33,

    // ── Arithmetic (50–59) ───────────────────────────────────
    /// A fixed-point result does not fit in `i128`.
    MathOverflow = 50,
}
