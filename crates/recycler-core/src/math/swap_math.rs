//! # Swap Step
//!
//! Prices one step of a swap inside a single liquidity range. The amount
//! convention is signed: a negative remaining amount is an exact input of the
//! supplied token, a non-negative one an exact output of the received token.
//! The direction is implied by the target: a target below the current price
//! is a token0-for-token1 swap.

use crate::constants::{MAX_FEE_PIPS, PIPS_DENOMINATOR};
use crate::errors::{RecyclerError, RecyclerResult};
use crate::math::big_int::{mul_div_u128, Rounding};
use crate::math::sqrt_price_math::{
    get_amount_0_delta, get_amount_1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use crate::types::SwapStep;

/// Compute the result of swapping towards `sqrt_price_target_x64`
///
/// Returns the price reached, the input consumed (excluding fee), the output
/// produced and the fee charged on the input.
pub fn compute_swap_step(
    sqrt_price_current_x64: u128,
    sqrt_price_target_x64: u128,
    liquidity: u128,
    amount_remaining: i128,
    fee_pips: u32,
) -> RecyclerResult<SwapStep> {
    if fee_pips > MAX_FEE_PIPS {
        return Err(RecyclerError::InvalidFee(fee_pips));
    }
    if sqrt_price_current_x64 == 0 || sqrt_price_target_x64 == 0 {
        return Err(RecyclerError::InvalidPrice);
    }

    let current = sqrt_price_current_x64;
    let target = sqrt_price_target_x64;
    let zero_for_one = current >= target;
    let exact_in = amount_remaining < 0;
    let remaining = amount_remaining.unsigned_abs();
    let fee_complement = (PIPS_DENOMINATOR - fee_pips) as u128;

    let mut amount_in = 0u128;
    let mut amount_out = 0u128;
    let mut remaining_less_fee = 0u128;

    let sqrt_price_next_x64 = if exact_in {
        remaining_less_fee =
            mul_div_u128(remaining, fee_complement, PIPS_DENOMINATOR as u128, Rounding::Down)?;
        amount_in = if zero_for_one {
            get_amount_0_delta(target, current, liquidity, true)?
        } else {
            get_amount_1_delta(current, target, liquidity, true)?
        };
        if remaining_less_fee >= amount_in {
            target
        } else {
            get_next_sqrt_price_from_input(current, liquidity, remaining_less_fee, zero_for_one)?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount_1_delta(target, current, liquidity, false)?
        } else {
            get_amount_0_delta(current, target, liquidity, false)?
        };
        if remaining >= amount_out {
            target
        } else {
            get_next_sqrt_price_from_output(current, liquidity, remaining, zero_for_one)?
        }
    };

    let reached_target = sqrt_price_next_x64 == target;
    let next = sqrt_price_next_x64;

    if zero_for_one {
        if !(reached_target && exact_in) {
            amount_in = get_amount_0_delta(next, current, liquidity, true)?;
        }
        if !(reached_target && !exact_in) {
            amount_out = get_amount_1_delta(next, current, liquidity, false)?;
        }
    } else {
        if !(reached_target && exact_in) {
            amount_in = get_amount_1_delta(current, next, liquidity, true)?;
        }
        if !(reached_target && !exact_in) {
            amount_out = get_amount_0_delta(current, next, liquidity, false)?;
        }
    }

    // Never hand out more than was asked for
    if !exact_in && amount_out > remaining {
        amount_out = remaining;
    }

    let fee_amount = if exact_in && !reached_target {
        // The whole remainder was consumed; what the price move did not use is fee
        amount_in = amount_in.min(remaining_less_fee);
        remaining - amount_in
    } else {
        mul_div_u128(amount_in, fee_pips as u128, fee_complement, Rounding::Up)?
    };

    Ok(SwapStep {
        sqrt_price_next_x64,
        amount_in,
        amount_out,
        fee_amount,
    })
}
