//! Recycler configuration

use fee_recycler_core::{Address, Currency, PoolKey, RecyclerError, RecyclerResult};

/// Static configuration of one recycler instance
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecyclerConfig {
    /// Address the recycler is deployed at; pools must bind this hook
    pub hook_address: Address,
    /// Required currency0 of every supported pool
    pub base_currency: Currency,
    /// Keep a trade open after `after_swap` until the curve engine calls
    /// `complete_swap` or `abort_swap`
    #[cfg_attr(feature = "client", serde(default))]
    pub deferred_completion: bool,
}

impl RecyclerConfig {
    pub fn new(hook_address: Address, base_currency: Currency) -> Self {
        Self {
            hook_address,
            base_currency,
            deferred_completion: false,
        }
    }

    /// Let the curve engine roll back a trade after both hooks ran
    ///
    /// Every trade must then be closed with `complete_swap` or `abort_swap`;
    /// until it is, the pool accepts no other operation.
    pub fn with_deferred_completion(mut self) -> Self {
        self.deferred_completion = true;
        self
    }

    /// Check that a pool may be served by this recycler
    pub fn validate_pool(&self, key: &PoolKey) -> RecyclerResult<()> {
        if key.hooks != self.hook_address {
            return Err(RecyclerError::InvalidHookBinding);
        }
        if key.currency0 != self.base_currency {
            return Err(RecyclerError::InvalidBaseCurrency);
        }
        Ok(())
    }
}

impl Default for RecyclerConfig {
    fn default() -> Self {
        Self {
            hook_address: Address::ZERO,
            base_currency: Currency::NATIVE,
            deferred_completion: false,
        }
    }
}
