/// Internal netting. Before the curve engine prices a trade, the part of it
/// that the ledger's secondary-currency balance can fill is filled from that
/// balance at the curve's current marginal price and zero fee. The trader
/// gets the same price it would get from the first wei of the curve, the pool
/// sees no price impact for that part, and the ledger converts secondary fees
/// into base currency that can later be donated.
///
/// Netting runs only for trades that supply the base currency: that is the
/// only direction in which the ledger pays out secondary currency and
/// receives base currency.

use fee_recycler_core::constants::NETTING_FEE_PIPS;
use fee_recycler_core::math::{safe_cast_u128_to_i128, safe_neg_u128, scale_fill};
use fee_recycler_core::{
    Address, BeforeSwapDelta, ClaimableFees, PoolId, PoolKey, RecyclerError, RecyclerResult,
    SwapParams, SwapStep,
};

use crate::curve::{CurveEngine, CurveResultExt};

/// Portion of a trade filled from the ledger
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NettingFill {
    /// Base currency paid by the trader to the ledger
    pub base: u128,
    /// Secondary currency paid by the ledger to the trader
    pub secondary: u128,
}

impl NettingFill {
    pub const NONE: NettingFill = NettingFill {
        base: 0,
        secondary: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.base == 0 || self.secondary == 0
    }

    /// Hook delta removing the filled portion from the trade
    ///
    /// Exact input: the specified currency is base, which the hook takes; the
    /// unspecified currency is secondary, which the hook supplies.
    /// Exact output: the specified currency is secondary, supplied by the
    /// hook; the unspecified currency is base, taken by the hook.
    pub fn to_before_swap_delta(&self, params: &SwapParams) -> RecyclerResult<BeforeSwapDelta> {
        if self.is_empty() {
            return Ok(BeforeSwapDelta::ZERO);
        }
        let base = safe_cast_u128_to_i128(self.base)?;
        let secondary = safe_neg_u128(self.secondary)?;
        if params.is_exact_input() {
            Ok(BeforeSwapDelta::new(base, secondary))
        } else {
            Ok(BeforeSwapDelta::new(secondary, base))
        }
    }

    /// Ledger after booking the fill
    pub fn apply(&self, fees: &ClaimableFees) -> RecyclerResult<ClaimableFees> {
        if self.is_empty() {
            return Ok(*fees);
        }
        fees.net(self.base, self.secondary)
    }
}

/// Whether a trade can be netted against the ledger at all
pub fn netting_applies(params: &SwapParams, fees: &ClaimableFees) -> bool {
    params.zero_for_one && fees.amount1 > 0
}

/// Price the largest fill the ledger and the trade allow
///
/// Makes only read calls on the curve engine.
pub fn plan_fill<C: CurveEngine + ?Sized>(
    curve: &C,
    pool: &PoolId,
    params: &SwapParams,
    fees: &ClaimableFees,
) -> RecyclerResult<NettingFill> {
    if !netting_applies(params, fees) {
        return Ok(NettingFill::NONE);
    }

    let sqrt_price = curve.sqrt_price(pool).during("sqrt_price")?;
    let liquidity = curve.liquidity(pool).during("liquidity")?;
    let target = params.sqrt_price_limit_x64;
    if target >= sqrt_price || liquidity == 0 {
        // Limit already reached, nothing can trade at this price
        return Ok(NettingFill::NONE);
    }

    let fill = if params.is_exact_input() {
        let budget = params.amount_specified.unsigned_abs();
        let available = fees.amount1.min(i128::MAX as u128);
        let full = price_exact_output(curve, sqrt_price, target, liquidity, available)?;
        if budget < full.amount_in {
            NettingFill {
                base: budget,
                secondary: scale_fill(full.amount_out, budget, full.amount_in)?,
            }
        } else {
            NettingFill {
                base: full.amount_in,
                secondary: full.amount_out,
            }
        }
    } else {
        let capped = (params.amount_specified as u128).min(fees.amount1);
        if capped == 0 {
            return Ok(NettingFill::NONE);
        }
        let step = price_exact_output(curve, sqrt_price, target, liquidity, capped)?;
        NettingFill {
            base: step.amount_in,
            secondary: step.amount_out,
        }
    };

    if fill.is_empty() {
        return Ok(NettingFill::NONE);
    }
    Ok(fill)
}

/// Exchange custody for a fill: take the trader's base, pay in the secondary
pub fn settle_fill<C: CurveEngine + ?Sized>(
    curve: &C,
    key: &PoolKey,
    recycler: Address,
    fill: &NettingFill,
) -> RecyclerResult<()> {
    if fill.is_empty() {
        return Ok(());
    }
    curve.take(key.currency0, recycler, fill.base).during("take")?;
    curve.sync(key.currency1).during("sync")?;
    curve
        .settle(key.currency1, recycler, fill.secondary)
        .during("settle")?;
    Ok(())
}

fn price_exact_output<C: CurveEngine + ?Sized>(
    curve: &C,
    sqrt_price: u128,
    target: u128,
    liquidity: u128,
    amount_out: u128,
) -> RecyclerResult<SwapStep> {
    let requested = safe_cast_u128_to_i128(amount_out)?;
    let step = curve
        .compute_swap_step(sqrt_price, target, liquidity, requested, NETTING_FEE_PIPS)
        .during("compute_swap_step")?;
    if step.amount_out > amount_out {
        return Err(RecyclerError::external_call(
            "compute_swap_step",
            format!("step produced {} for a request of {}", step.amount_out, amount_out),
        ));
    }
    Ok(step)
}
