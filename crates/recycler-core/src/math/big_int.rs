//! Big integer operations for high-precision math
//!
//! Mul-div with 256-bit intermediates so that products of two u128 amounts
//! never overflow before the division.

use ethnum::U256;

use crate::errors::{RecyclerError, RecyclerResult};

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

/// Narrow a U256 back to u128
pub fn u256_to_u128(value: U256) -> RecyclerResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(RecyclerError::ConversionError);
    }
    Ok(value.as_u128())
}

/// Divide with the requested rounding
pub fn div_rounding(numerator: U256, denominator: U256, rounding: Rounding) -> RecyclerResult<U256> {
    if denominator == U256::ZERO {
        return Err(RecyclerError::DivisionByZero);
    }
    let quotient = numerator / denominator;
    if rounding == Rounding::Up && numerator % denominator != U256::ZERO {
        return quotient.checked_add(U256::ONE).ok_or(RecyclerError::MulDivOverflow);
    }
    Ok(quotient)
}

/// Multiply two values and divide by a third with specified rounding
/// result = (a * b) / denominator
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> RecyclerResult<U256> {
    if denominator == U256::ZERO {
        return Err(RecyclerError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(RecyclerError::MulDivOverflow)?;
    div_rounding(product, denominator, rounding)
}

/// Multiply two u128 values and divide by a third with specified rounding
pub fn mul_div_u128(a: u128, b: u128, denominator: u128, rounding: Rounding) -> RecyclerResult<u128> {
    let result = mul_div(U256::from(a), U256::from(b), U256::from(denominator), rounding)?;
    u256_to_u128(result).map_err(|_| RecyclerError::MulDivOverflow)
}
