//! # Curve Engine Interface
//!
//! The recycler never owns pool liquidity. Everything it knows about a pool's
//! price and every movement of custody goes through the host curve engine,
//! which implements this trait. Calls are made while a trade is in flight, so
//! an implementation may re-enter the recycler; the recycler's reentrancy
//! guard handles that, not the engine.

use fee_recycler_core::{
    Address, BalanceDelta, Currency, PoolId, PoolKey, RecyclerError, RecyclerResult, SwapStep,
};
use thiserror::Error;

/// Failures reported by a curve engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error("Unknown pool {0}")]
    UnknownPool(PoolId),

    #[error("Insufficient {currency} balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        currency: Currency,
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("Settlement of {currency} without a preceding sync")]
    UnsyncedSettlement { currency: Currency },

    #[error("Pricing failed: {0}")]
    Pricing(RecyclerError),

    #[error("{0}")]
    Rejected(String),
}

/// Operations the recycler needs from the host curve engine
pub trait CurveEngine {
    /// Current sqrt price of the pool (Q64.64)
    fn sqrt_price(&self, pool: &PoolId) -> Result<u128, CurveError>;

    /// Active liquidity of the pool
    fn liquidity(&self, pool: &PoolId) -> Result<u128, CurveError>;

    /// Price one swap step over a single liquidity range
    ///
    /// `amount_remaining < 0` is an exact input, `>= 0` an exact output.
    fn compute_swap_step(
        &self,
        sqrt_price_current_x64: u128,
        sqrt_price_target_x64: u128,
        liquidity: u128,
        amount_remaining: i128,
        fee_pips: u32,
    ) -> Result<SwapStep, CurveError>;

    /// Transfer `amount` of `currency` out of the engine's custody to `to`
    fn take(&self, currency: Currency, to: Address, amount: u128) -> Result<(), CurveError>;

    /// Checkpoint the engine's balance of `currency` ahead of a settlement
    fn sync(&self, currency: Currency) -> Result<(), CurveError>;

    /// Pay `amount` of `currency` from `from` into the engine's custody
    fn settle(&self, currency: Currency, from: Address, amount: u128) -> Result<(), CurveError>;

    /// Credit the pool's liquidity providers
    ///
    /// The returned delta is from the donor's side: a negative amount is owed
    /// to the engine.
    fn donate(&self, key: &PoolKey, amount0: u128, amount1: u128) -> Result<BalanceDelta, CurveError>;
}

/// Tag curve failures with the operation that produced them
pub(crate) trait CurveResultExt<T> {
    fn during(self, operation: &str) -> RecyclerResult<T>;
}

impl<T> CurveResultExt<T> for Result<T, CurveError> {
    fn during(self, operation: &str) -> RecyclerResult<T> {
        self.map_err(|e| {
            log::warn!("curve engine call '{}' failed: {}", operation, e);
            RecyclerError::external_call(operation, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_failure_names_operation() {
        let result: Result<(), CurveError> = Err(CurveError::Rejected("paused".into()));
        let err = result.during("take").unwrap_err();
        assert_eq!(
            err,
            RecyclerError::ExternalCallFailure {
                operation: "take".into(),
                reason: "paused".into(),
            }
        );
        assert!(err.is_external());
    }
}
