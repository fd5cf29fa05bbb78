//! # Swap Math Properties
//!
//! Invariants of the swap step and sqrt price math across a spread of
//! prices, liquidities and amounts.

use fee_recycler_core::constants::*;
use fee_recycler_core::math::*;
use proptest::prelude::*;

const ONE: u128 = 1_000_000_000_000_000_000;

#[test]
fn test_rounding_direction_across_ranges() {
    let test_cases = vec![
        (Q64, Q64 + (Q64 / 100), 1_000u128),
        (Q64 - (Q64 / 100), Q64 + (Q64 / 100), 10_000 * ONE),
        (Q64 / 2, Q64, 50_000 * ONE),
        (Q64 * 3, Q64 * 4, ONE),
    ];

    for (sqrt_lower, sqrt_upper, liquidity) in test_cases {
        let amount0_up = get_amount_0_delta(sqrt_lower, sqrt_upper, liquidity, true).unwrap();
        let amount0_down = get_amount_0_delta(sqrt_lower, sqrt_upper, liquidity, false).unwrap();
        assert!(amount0_up >= amount0_down);

        let amount1_up = get_amount_1_delta(sqrt_lower, sqrt_upper, liquidity, true).unwrap();
        let amount1_down = get_amount_1_delta(sqrt_lower, sqrt_upper, liquidity, false).unwrap();
        assert!(amount1_up >= amount1_down);
        assert!(amount1_up - amount1_down <= 1);
    }
}

#[test]
fn test_zero_fee_exact_output_round_trip() {
    // Feeding the priced input back in lands on the requested output
    let liquidity = 1_000 * ONE;
    let wanted = 3 * ONE;
    let out_step = compute_swap_step(Q64, MIN_SQRT_PRICE_X64, liquidity, wanted as i128, 0).unwrap();
    assert_eq!(out_step.amount_out, wanted);

    let in_step =
        compute_swap_step(Q64, MIN_SQRT_PRICE_X64, liquidity, -(out_step.amount_in as i128), 0).unwrap();
    // One unit of sqrt price is worth about L / 2^64 of token1
    assert!(in_step.amount_out.abs_diff(wanted) <= 1_000);
}

proptest! {
    #[test]
    fn prop_exact_output_never_exceeds_request(
        liquidity in (10 * ONE)..(1_000_000 * ONE),
        amount in 1u128..ONE,
        zero_for_one in any::<bool>(),
    ) {
        let target = if zero_for_one { MIN_SQRT_PRICE_X64 } else { MAX_SQRT_PRICE_X64 };
        let step = compute_swap_step(Q64, target, liquidity, amount as i128, 0).unwrap();
        prop_assert!(step.amount_out <= amount);
        prop_assert_eq!(step.fee_amount, 0);
    }

    #[test]
    fn prop_exact_input_never_consumes_more_than_given(
        liquidity in (10 * ONE)..(1_000_000 * ONE),
        amount in 1u128..ONE,
        fee in 0u32..10_000,
        zero_for_one in any::<bool>(),
    ) {
        let target = if zero_for_one { MIN_SQRT_PRICE_X64 } else { MAX_SQRT_PRICE_X64 };
        let step = compute_swap_step(Q64, target, liquidity, -(amount as i128), fee).unwrap();
        prop_assert!(step.amount_in + step.fee_amount <= amount);
    }

    #[test]
    fn prop_price_moves_toward_target(
        liquidity in (10 * ONE)..(1_000_000 * ONE),
        amount in 1u128..ONE,
        zero_for_one in any::<bool>(),
    ) {
        let target = if zero_for_one { Q64 / 2 } else { Q64 * 2 };
        let step = compute_swap_step(Q64, target, liquidity, -(amount as i128), 0).unwrap();
        if zero_for_one {
            prop_assert!(step.sqrt_price_next_x64 <= Q64 && step.sqrt_price_next_x64 >= target);
        } else {
            prop_assert!(step.sqrt_price_next_x64 >= Q64 && step.sqrt_price_next_x64 <= target);
        }
    }

    #[test]
    fn prop_skim_is_floor_of_one_percent(amount in any::<i128>()) {
        let fee = skim_fee(amount);
        prop_assert!(fee * 100 <= amount.unsigned_abs());
        prop_assert!(amount.unsigned_abs() - fee * 100 < 100);
    }
}
