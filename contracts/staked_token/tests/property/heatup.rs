#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Properties of the cooldown-merge rule.
//!
//! Invariants tested:
//! - An idle receiver always stays idle
//! - A merged heatup never moves earlier than the receiver's, nor past `now`
//! - Receiving nothing leaves a valid heatup unchanged

use proptest::prelude::*;
use staked_token::heatup::next_heatup;

const HEATUP: u64 = 864_000;
const WINDOW: u64 = 172_800;

proptest! {
    #[test]
    fn prop_idle_receiver_stays_idle(
        from_heatup in 0u64..10_000_000,
        amount in 0i128..1_000_000_000_000,
        to_balance in 0i128..1_000_000_000_000,
        now in 0u64..10_000_000,
    ) {
        prop_assert_eq!(
            next_heatup(from_heatup, amount, 0, to_balance, now, HEATUP, WINDOW),
            0
        );
    }

    #[test]
    fn prop_merge_stays_between_receiver_and_now(
        from_heatup in 0u64..10_000_000,
        amount in 0i128..1_000_000_000_000,
        to_heatup in 1u64..10_000_000,
        to_balance in 0i128..1_000_000_000_000,
        elapsed in 0u64..2_000_000,
    ) {
        let now = to_heatup + elapsed;
        let from_heatup = from_heatup.min(now);
        let merged = next_heatup(from_heatup, amount, to_heatup, to_balance, now, HEATUP, WINDOW);

        if merged != 0 {
            prop_assert!(merged >= to_heatup);
            prop_assert!(merged <= now);
        } else {
            // Only a receiver whose window closed is reset.
            prop_assert!(to_heatup < now.saturating_sub(HEATUP).saturating_sub(WINDOW));
        }
    }

    #[test]
    fn prop_receiving_nothing_keeps_valid_heatup(
        from_heatup in 0u64..10_000_000,
        to_heatup in 1u64..10_000_000,
        to_balance in 1i128..1_000_000_000_000,
        elapsed in 0u64..(HEATUP + WINDOW),
    ) {
        let now = to_heatup + elapsed;
        prop_assert_eq!(
            next_heatup(from_heatup.min(now), 0, to_heatup, to_balance, now, HEATUP, WINDOW),
            to_heatup
        );
    }
}
