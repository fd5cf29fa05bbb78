//! Threshold-gated donation of base-currency fees to liquidity providers

use fee_recycler_core::constants::DISTRIBUTION_THRESHOLD;
use fee_recycler_core::{Address, ClaimableFees, PoolKey, RecyclerError, RecyclerResult};

use crate::curve::{CurveEngine, CurveResultExt};

/// Whether the ledger holds enough base currency to donate
pub fn should_distribute(fees: &ClaimableFees) -> bool {
    fees.amount0 >= DISTRIBUTION_THRESHOLD
}

/// Donate the whole base balance and settle what the donation costs
///
/// Returns the ledger after the donation; below the threshold it is returned
/// unchanged and the curve engine is not called.
pub fn distribute<C: CurveEngine + ?Sized>(
    curve: &C,
    key: &PoolKey,
    recycler: Address,
    fees: &ClaimableFees,
) -> RecyclerResult<ClaimableFees> {
    if !should_distribute(fees) {
        return Ok(*fees);
    }

    let donated = fees.amount0;
    let delta = curve.donate(key, donated, 0).during("donate")?;
    if delta.amount0 < 0 {
        let owed = delta.amount0.unsigned_abs();
        if owed > donated {
            return Err(RecyclerError::external_call(
                "donate",
                format!("donation of {} reported a debt of {}", donated, owed),
            ));
        }
        curve.sync(key.currency0).during("sync")?;
        curve.settle(key.currency0, recycler, owed).during("settle")?;
    }

    log::debug!("donated {} base to liquidity providers", donated);
    fees.distribute(donated)
}
