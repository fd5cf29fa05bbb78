//! # Fee Math
//!
//! The skim and the proportional scaling of internal fills. Both truncate so
//! that rounding never manufactures value for the trader or the ledger.

use crate::constants::SKIM_DIVISOR;
use crate::errors::RecyclerResult;
use crate::math::big_int::{mul_div_u128, Rounding};

/// Flat 1% skim of a realized signed amount, rounded down
pub fn skim_fee(realized_amount: i128) -> u128 {
    realized_amount.unsigned_abs() / SKIM_DIVISOR
}

/// Scale a fill down to what a budget can pay for
///
/// `required_secondary * budget / full_required_base`, truncated.
pub fn scale_fill(
    required_secondary: u128,
    budget: u128,
    full_required_base: u128,
) -> RecyclerResult<u128> {
    mul_div_u128(required_secondary, budget, full_required_base, Rounding::Down)
}
