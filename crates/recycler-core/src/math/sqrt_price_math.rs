//! # Sqrt Price Math
//!
//! Amount deltas and next-price calculations for a single liquidity range,
//! with sqrt prices in Q64.64. Rounding always favors the curve: amounts owed
//! to the curve round up, amounts paid out round down.

use ethnum::U256;

use crate::constants::{Q64, Q64_RESOLUTION};
use crate::errors::{RecyclerError, RecyclerResult};
use crate::math::big_int::{div_rounding, mul_div, u256_to_u128, Rounding};

fn rounding(round_up: bool) -> Rounding {
    if round_up {
        Rounding::Up
    } else {
        Rounding::Down
    }
}

fn sorted(sqrt_ratio_a_x64: u128, sqrt_ratio_b_x64: u128) -> (u128, u128) {
    if sqrt_ratio_a_x64 > sqrt_ratio_b_x64 {
        (sqrt_ratio_b_x64, sqrt_ratio_a_x64)
    } else {
        (sqrt_ratio_a_x64, sqrt_ratio_b_x64)
    }
}

/// Amount of token0 between two sqrt prices: L * (b - a) / (a * b)
pub fn get_amount_0_delta(
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> RecyclerResult<u128> {
    let (lower, upper) = sorted(sqrt_ratio_a_x64, sqrt_ratio_b_x64);
    if lower == 0 {
        return Err(RecyclerError::InvalidPrice);
    }

    // Divide by upper first so the intermediate stays below 2^128
    let scaled = mul_div(
        U256::from(liquidity),
        U256::from(upper - lower),
        U256::from(upper),
        rounding(round_up),
    )?;
    let result = mul_div(scaled, U256::from(Q64), U256::from(lower), rounding(round_up))?;
    u256_to_u128(result)
}

/// Amount of token1 between two sqrt prices: L * (b - a)
pub fn get_amount_1_delta(
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> RecyclerResult<u128> {
    let (lower, upper) = sorted(sqrt_ratio_a_x64, sqrt_ratio_b_x64);
    let result = mul_div(
        U256::from(liquidity),
        U256::from(upper - lower),
        U256::from(Q64),
        rounding(round_up),
    )?;
    u256_to_u128(result)
}

/// Next sqrt price after adding or removing token0, rounded up
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> RecyclerResult<u128> {
    if amount == 0 {
        return Ok(sqrt_price_x64);
    }

    let price = U256::from(sqrt_price_x64);
    let numerator1 = U256::from(liquidity) << Q64_RESOLUTION;
    let product = U256::from(amount) * price;

    let result = if add {
        // L * P / (L + amount * P), falling back to L / (L / P + amount)
        let exact = numerator1
            .checked_add(product)
            .ok_or(RecyclerError::MulDivOverflow)
            .and_then(|denominator| mul_div(numerator1, price, denominator, Rounding::Up));
        match exact {
            Ok(value) => value,
            Err(RecyclerError::MulDivOverflow) => {
                let denominator = (numerator1 / price)
                    .checked_add(U256::from(amount))
                    .ok_or(RecyclerError::ArithmeticOverflow)?;
                div_rounding(numerator1, denominator, Rounding::Up)?
            }
            Err(err) => return Err(err),
        }
    } else {
        // L * P / (L - amount * P); the curve must hold more than it pays out
        if numerator1 <= product {
            return Err(RecyclerError::InvalidPrice);
        }
        match mul_div(numerator1, price, numerator1 - product, Rounding::Up) {
            Ok(value) => value,
            Err(RecyclerError::MulDivOverflow) => {
                let quotient = numerator1 / price;
                if quotient <= U256::from(amount) {
                    return Err(RecyclerError::InvalidPrice);
                }
                div_rounding(numerator1, quotient - U256::from(amount), Rounding::Up)?
            }
            Err(err) => return Err(err),
        }
    };

    u256_to_u128(result)
}

/// Next sqrt price after adding or removing token1, rounded down
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> RecyclerResult<u128> {
    if liquidity == 0 {
        return Err(RecyclerError::DivisionByZero);
    }
    let price = U256::from(sqrt_price_x64);

    if add {
        let quotient = mul_div(U256::from(amount), U256::from(Q64), U256::from(liquidity), Rounding::Down)?;
        let result = price.checked_add(quotient).ok_or(RecyclerError::ArithmeticOverflow)?;
        u256_to_u128(result)
    } else {
        let quotient = mul_div(U256::from(amount), U256::from(Q64), U256::from(liquidity), Rounding::Up)?;
        if price <= quotient {
            return Err(RecyclerError::InvalidPrice);
        }
        u256_to_u128(price - quotient)
    }
}

/// Next sqrt price given an input amount of the supplied token
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> RecyclerResult<u128> {
    if sqrt_price_x64 == 0 {
        return Err(RecyclerError::InvalidPrice);
    }
    if liquidity == 0 {
        return Err(RecyclerError::DivisionByZero);
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x64, liquidity, amount_in, true)
    }
}

/// Next sqrt price given an output amount of the received token
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_out: u128,
    zero_for_one: bool,
) -> RecyclerResult<u128> {
    if sqrt_price_x64 == 0 {
        return Err(RecyclerError::InvalidPrice);
    }
    if liquidity == 0 {
        return Err(RecyclerError::DivisionByZero);
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x64, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_out, false)
    }
}
