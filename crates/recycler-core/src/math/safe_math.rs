//! # Safe Math Operations
//!
//! Overflow-checked arithmetic. Ledger balances never saturate or wrap.

use crate::errors::{RecyclerError, RecyclerResult};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Binary operations with checked methods
    ($fn_name:ident, $type:ty, $checked_method:ident, $error:expr) => {
        /// Checked arithmetic, failing instead of wrapping
        pub fn $fn_name(a: $type, b: $type) -> RecyclerResult<$type> {
            a.$checked_method(b).ok_or($error)
        }
    };

    // Division operations with zero check
    (div, $fn_name:ident, $type:ty) => {
        /// Safe division with zero check, truncating
        pub fn $fn_name(a: $type, b: $type) -> RecyclerResult<$type> {
            if b == 0 {
                return Err(RecyclerError::DivisionByZero);
            }
            Ok(a / b)
        }
    };

    // Type conversion operations
    (cast_max, $fn_name:ident, $from_type:ty, $to_type:ty, $max_val:expr) => {
        /// Safe cast, failing when the value does not fit
        pub fn $fn_name(value: $from_type) -> RecyclerResult<$to_type> {
            if value > $max_val {
                return Err(RecyclerError::ConversionError);
            }
            Ok(value as $to_type)
        }
    };
}

safe_arith!(safe_add_u128, u128, checked_add, RecyclerError::ArithmeticOverflow);
safe_arith!(safe_sub_u128, u128, checked_sub, RecyclerError::ArithmeticUnderflow);
safe_arith!(safe_mul_u128, u128, checked_mul, RecyclerError::ArithmeticOverflow);
safe_arith!(div, safe_div_u128, u128);

safe_arith!(safe_add_i128, i128, checked_add, RecyclerError::ArithmeticOverflow);
safe_arith!(safe_sub_i128, i128, checked_sub, RecyclerError::ArithmeticUnderflow);

safe_arith!(cast_max, safe_cast_u128_to_i128, u128, i128, i128::MAX as u128);

/// Negate an unsigned amount into a signed delta
pub fn safe_neg_u128(value: u128) -> RecyclerResult<i128> {
    // i128::MIN has no positive counterpart, so the bound is i128::MAX
    let value = safe_cast_u128_to_i128(value)?;
    Ok(-value)
}

/// Apply a signed delta to an unsigned balance
pub fn safe_apply_delta(balance: u128, delta: i128) -> RecyclerResult<u128> {
    if delta >= 0 {
        safe_add_u128(balance, delta as u128)
    } else {
        safe_sub_u128(balance, delta.unsigned_abs())
    }
}
