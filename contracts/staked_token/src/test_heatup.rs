use crate::heatup::{next_heatup, require_redeemable, state_at, HeatupState};
use crate::ContractError;

const HEATUP: u64 = 1_000;
const WINDOW: u64 = 500;

fn merge(from_heatup: u64, amount: i128, to_heatup: u64, to_balance: i128, now: u64) -> u64 {
    next_heatup(from_heatup, amount, to_heatup, to_balance, now, HEATUP, WINDOW)
}

#[test]
fn idle_receiver_stays_idle() {
    assert_eq!(merge(0, 10, 0, 10, 400), 0);
    assert_eq!(merge(350, 10, 0, 10, 400), 0);
}

#[test]
fn weighted_average_when_sender_is_further_behind() {
    assert_eq!(merge(300, 10, 200, 10, 400), 250);
}

#[test]
fn sender_further_along_leaves_receiver_unchanged() {
    assert_eq!(merge(100, 10, 200, 10, 400), 200);
}

#[test]
fn idle_sender_counts_as_starting_now() {
    // (10 * 400 + 30 * 300) / 40
    assert_eq!(merge(0, 10, 300, 30, 400), 325);
}

#[test]
fn expired_receiver_becomes_idle() {
    // minimal valid heatup at now = 2 000 is 500.
    assert_eq!(merge(0, 10, 499, 10, 2_000), 0);
    assert_eq!(merge(0, 10, 500, 10, 2_000), 1_250);
}

#[test]
fn expired_sender_counts_as_starting_now() {
    assert_eq!(merge(100, 10, 600, 10, 2_000), 1_300);
}

#[test]
fn average_truncates() {
    // 200 + 10 * 200 / 30 = 266.66...
    assert_eq!(merge(0, 10, 200, 20, 400), 266);
}

#[test]
fn early_clock_saturates_minimal_valid() {
    assert_eq!(merge(0, 10, 5, 10, 20), 12);
}

#[test]
fn empty_weights_keep_receiver() {
    assert_eq!(merge(0, 0, 300, 0, 400), 300);
}

#[test]
fn state_transitions() {
    assert_eq!(state_at(0, 1_000, HEATUP, WINDOW), HeatupState::Idle);
    assert_eq!(state_at(10, 10, HEATUP, WINDOW), HeatupState::Heating);
    assert_eq!(state_at(10, 1_010, HEATUP, WINDOW), HeatupState::Heating);
    assert_eq!(state_at(10, 1_011, HEATUP, WINDOW), HeatupState::Redeemable);
    assert_eq!(state_at(10, 1_510, HEATUP, WINDOW), HeatupState::Redeemable);
    assert_eq!(state_at(10, 1_511, HEATUP, WINDOW), HeatupState::Expired);
}

#[test]
fn redeem_guard_errors() {
    assert_eq!(
        require_redeemable(0, 500, HEATUP, WINDOW),
        Err(ContractError::InsufficientHeatup)
    );
    assert_eq!(
        require_redeemable(10, 1_010, HEATUP, WINDOW),
        Err(ContractError::InsufficientHeatup)
    );
    assert_eq!(require_redeemable(10, 1_011, HEATUP, WINDOW), Ok(()));
    assert_eq!(
        require_redeemable(10, 1_511, HEATUP, WINDOW),
        Err(ContractError::WindowFinished)
    );
}
