//! Post-trade skim: a flat 1% of the realized unspecified amount

use fee_recycler_core::math::{safe_cast_u128_to_i128, skim_fee};
use fee_recycler_core::{Address, BalanceDelta, ClaimableFees, PoolKey, RecyclerResult, SwapParams};

use crate::curve::{CurveEngine, CurveResultExt};

/// Fee taken from one trade
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Skim {
    /// Fee is in currency0
    pub zero: bool,
    pub fee: u128,
}

impl Skim {
    /// Skim of the currency the trader did not fix
    pub fn for_trade(params: &SwapParams, realized: &BalanceDelta) -> Self {
        let zero = !params.specified_is_currency0();
        Self {
            zero,
            fee: skim_fee(realized.amount(zero)),
        }
    }

    /// Ledger after depositing the fee under its currency
    pub fn apply(&self, fees: &ClaimableFees) -> RecyclerResult<ClaimableFees> {
        if self.zero {
            fees.deposit(self.fee, 0)
        } else {
            fees.deposit(0, self.fee)
        }
    }

    /// Unspecified delta returned to the curve engine
    pub fn hook_delta(&self) -> RecyclerResult<i128> {
        safe_cast_u128_to_i128(self.fee)
    }

    /// Withdraw the fee from the curve engine into the recycler's custody
    pub fn collect<C: CurveEngine + ?Sized>(
        &self,
        curve: &C,
        key: &PoolKey,
        recycler: Address,
    ) -> RecyclerResult<()> {
        if self.fee == 0 {
            return Ok(());
        }
        curve
            .take(key.currency(self.zero), recycler, self.fee)
            .during("take")
    }
}
