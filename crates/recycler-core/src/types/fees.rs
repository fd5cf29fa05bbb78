//! # Fee Ledger Types

use crate::errors::RecyclerResult;
use crate::math::safe_math::{safe_add_u128, safe_sub_u128};

/// Accumulated, not yet distributed fee balances of one pool
///
/// `amount0` is the base currency, `amount1` the secondary currency. Every
/// transition is checked; a balance never wraps or saturates.
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
pub struct ClaimableFees {
    pub amount0: u128,
    pub amount1: u128,
}

impl ClaimableFees {
    pub const ZERO: ClaimableFees = ClaimableFees {
        amount0: 0,
        amount1: 0,
    };

    pub const fn new(amount0: u128, amount1: u128) -> Self {
        Self { amount0, amount1 }
    }

    pub fn is_empty(&self) -> bool {
        self.amount0 == 0 && self.amount1 == 0
    }

    /// Add to both balances; fails without partial effect on overflow
    pub fn deposit(&self, amount0: u128, amount1: u128) -> RecyclerResult<Self> {
        Ok(Self {
            amount0: safe_add_u128(self.amount0, amount0)?,
            amount1: safe_add_u128(self.amount1, amount1)?,
        })
    }

    /// Book an internal fill: base received, secondary paid out
    pub fn net(&self, base_received: u128, secondary_paid: u128) -> RecyclerResult<Self> {
        Ok(Self {
            amount0: safe_add_u128(self.amount0, base_received)?,
            amount1: safe_sub_u128(self.amount1, secondary_paid)?,
        })
    }

    /// Remove a donated base-currency amount
    pub fn distribute(&self, donated: u128) -> RecyclerResult<Self> {
        Ok(Self {
            amount0: safe_sub_u128(self.amount0, donated)?,
            amount1: self.amount1,
        })
    }

    /// Balance of one side
    pub fn amount(&self, zero: bool) -> u128 {
        if zero {
            self.amount0
        } else {
            self.amount1
        }
    }
}
