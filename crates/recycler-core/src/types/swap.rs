//! # Swap Types
//!
//! Sign conventions:
//! - `SwapParams::amount_specified < 0` is an exact input, `>= 0` an exact output.
//! - `BalanceDelta` is from the caller's side: negative is owed to the curve
//!   engine, positive is owed by it.
//! - `BeforeSwapDelta` is from the hook's side: positive is taken out of the
//!   trade by the hook, negative is supplied to the trade by the hook.

use crate::errors::RecyclerResult;
use crate::math::safe_math::{safe_add_i128, safe_sub_i128};

/// One trade request
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapParams {
    /// Trader supplies currency0 and receives currency1
    pub zero_for_one: bool,
    /// Negative for exact input, non-negative for exact output
    pub amount_specified: i128,
    /// Price the swap may not cross (Q64.64)
    pub sqrt_price_limit_x64: u128,
}

impl SwapParams {
    pub fn exact_input(zero_for_one: bool, amount: u128, sqrt_price_limit_x64: u128) -> Self {
        Self {
            zero_for_one,
            amount_specified: -(amount.min(i128::MAX as u128) as i128),
            sqrt_price_limit_x64,
        }
    }

    pub fn exact_output(zero_for_one: bool, amount: u128, sqrt_price_limit_x64: u128) -> Self {
        Self {
            zero_for_one,
            amount_specified: amount.min(i128::MAX as u128) as i128,
            sqrt_price_limit_x64,
        }
    }

    pub fn is_exact_input(&self) -> bool {
        self.amount_specified < 0
    }

    /// Whether the amount fixed by the trader is denominated in currency0
    pub fn specified_is_currency0(&self) -> bool {
        self.is_exact_input() == self.zero_for_one
    }
}

/// Signed amounts of both currencies of a pool
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    pub amount0: i128,
    pub amount1: i128,
}

impl BalanceDelta {
    pub const ZERO: BalanceDelta = BalanceDelta {
        amount0: 0,
        amount1: 0,
    };

    pub const fn new(amount0: i128, amount1: i128) -> Self {
        Self { amount0, amount1 }
    }

    pub fn amount(&self, zero: bool) -> i128 {
        if zero {
            self.amount0
        } else {
            self.amount1
        }
    }

    pub fn checked_add(&self, other: &BalanceDelta) -> RecyclerResult<Self> {
        Ok(Self {
            amount0: safe_add_i128(self.amount0, other.amount0)?,
            amount1: safe_add_i128(self.amount1, other.amount1)?,
        })
    }

    pub fn checked_sub(&self, other: &BalanceDelta) -> RecyclerResult<Self> {
        Ok(Self {
            amount0: safe_sub_i128(self.amount0, other.amount0)?,
            amount1: safe_sub_i128(self.amount1, other.amount1)?,
        })
    }
}

/// Adjustment a pre-trade hook applies to a trade
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BeforeSwapDelta {
    /// Amount of the specified currency
    pub specified: i128,
    /// Amount of the unspecified currency
    pub unspecified: i128,
}

impl BeforeSwapDelta {
    pub const ZERO: BeforeSwapDelta = BeforeSwapDelta {
        specified: 0,
        unspecified: 0,
    };

    pub const fn new(specified: i128, unspecified: i128) -> Self {
        Self {
            specified,
            unspecified,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.specified == 0 && self.unspecified == 0
    }

    /// Map onto currency0/currency1 for the given trade
    pub fn to_balance_delta(&self, params: &SwapParams) -> BalanceDelta {
        if params.specified_is_currency0() {
            BalanceDelta::new(self.specified, self.unspecified)
        } else {
            BalanceDelta::new(self.unspecified, self.specified)
        }
    }
}

/// Result of pricing one swap step
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    /// Price reached by the step (Q64.64)
    pub sqrt_price_next_x64: u128,
    /// Input consumed, excluding the fee
    pub amount_in: u128,
    /// Output produced
    pub amount_out: u128,
    /// Fee charged on the input
    pub fee_amount: u128,
}
