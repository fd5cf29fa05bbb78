//! # Fee Recycler
//!
//! Hook entry points invoked by the curve engine around every trade, and the
//! ledger operations exposed to everyone else.
//!
//! Per trade on a registered pool:
//!
//! 1. `before_swap` nets the trade against the ledger and returns the hook
//!    delta; the pool session moves to `Executing`.
//! 2. The curve engine executes the residual trade.
//! 3. `after_swap` skims the realized output, donates base fees past the
//!    threshold and closes the session.
//!
//! If the curve engine fails between the hooks it calls `abort_swap`, which
//! restores the ledger to its value before step 1. A failure inside
//! `after_swap` rolls back on its own.
//!
//! With [`RecyclerConfig::deferred_completion`] the session outlives step 3
//! in `Settled`: the curve engine closes it with `complete_swap` once its own
//! settlement with the trader succeeded, or rolls the whole trade back with
//! `abort_swap`.

use fee_recycler_core::constants::NO_FEE_OVERRIDE;
use fee_recycler_core::{
    Address, BalanceDelta, BeforeSwapDelta, ClaimableFees, PoolId, PoolKey, RecyclerError,
    RecyclerResult, SwapParams,
};

use crate::config::RecyclerConfig;
use crate::curve::CurveEngine;
use crate::logic::{distribute, plan_fill, settle_fill, Skim};
use crate::permissions::HookPermissions;
use crate::state::{FeeLedger, HookStage, PoolRegistry, ScopedHookGuard};

/// The fee recycling engine
#[derive(Debug, Default)]
pub struct FeeRecycler {
    config: RecyclerConfig,
    registry: PoolRegistry,
    ledger: FeeLedger,
}

impl FeeRecycler {
    pub fn new(config: RecyclerConfig) -> Self {
        Self {
            config,
            registry: PoolRegistry::new(),
            ledger: FeeLedger::new(),
        }
    }

    pub fn config(&self) -> &RecyclerConfig {
        &self.config
    }

    /// Address pools bind as their hook; also the recycler's custody account
    pub fn address(&self) -> Address {
        self.config.hook_address
    }

    pub fn hook_permissions(&self) -> HookPermissions {
        HookPermissions::fee_recycler()
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Mark a pool as supported
    pub fn register_pool(&self, key: &PoolKey) -> RecyclerResult<()> {
        if self.registry.register(key, &self.config)? {
            log::info!("registered pool {}", key.to_id());
        }
        Ok(())
    }

    pub fn is_supported(&self, key: &PoolKey) -> bool {
        self.registry.contains(&key.to_id())
    }

    pub fn supported_pools(&self) -> Vec<PoolId> {
        self.registry.pools()
    }

    // ========================================================================
    // Ledger
    // ========================================================================

    pub fn pool_fees(&self, key: &PoolKey) -> ClaimableFees {
        self.ledger.fees(&key.to_id())
    }

    /// Seed fees for a registered pool
    pub fn deposit_fees(&self, key: &PoolKey, amount0: u128, amount1: u128) -> RecyclerResult<()> {
        let pool = key.to_id();
        if !self.registry.contains(&pool) {
            return Err(RecyclerError::PoolNotRegistered);
        }
        let fees = self.ledger.deposit(&pool, amount0, amount1)?;
        log::debug!(
            "deposit ({}, {}) into pool {}; ledger now ({}, {})",
            amount0,
            amount1,
            pool,
            fees.amount0,
            fees.amount1
        );
        Ok(())
    }

    // ========================================================================
    // Hooks
    // ========================================================================

    /// Pre-trade hook: fill what the ledger can before the curve prices the trade
    ///
    /// Returns the hook delta and the fee override, always zero.
    pub fn before_swap<C: CurveEngine + ?Sized>(
        &self,
        curve: &C,
        sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        _hook_data: &[u8],
    ) -> RecyclerResult<(BeforeSwapDelta, u32)> {
        let pool = key.to_id();
        if !self.registry.contains(&pool) {
            return Ok((BeforeSwapDelta::ZERO, NO_FEE_OVERRIDE));
        }

        let slot = self.ledger.slot(&pool);
        let (guard, fees) = ScopedHookGuard::enter(&slot, HookStage::BeforeSwap)?;

        let fill = plan_fill(curve, &pool, params, &fees)?;
        settle_fill(curve, key, self.address(), &fill)?;
        let fees = fill.apply(&fees)?;
        let delta = fill.to_before_swap_delta(params)?;

        guard.commit(fees)?;
        if !fill.is_empty() {
            log::debug!(
                "netted {} secondary for {} base on pool {} (sender {})",
                fill.secondary,
                fill.base,
                pool,
                sender
            );
        }
        Ok((delta, NO_FEE_OVERRIDE))
    }

    /// Post-trade hook: skim the realized output and distribute base fees
    ///
    /// `delta` is the curve engine's own delta for the trade. Returns the
    /// unspecified hook delta.
    pub fn after_swap<C: CurveEngine + ?Sized>(
        &self,
        curve: &C,
        sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        delta: BalanceDelta,
        _hook_data: &[u8],
    ) -> RecyclerResult<i128> {
        let pool = key.to_id();
        if !self.registry.contains(&pool) {
            return Ok(0);
        }

        let slot = self.ledger.slot(&pool);
        let (guard, fees) = ScopedHookGuard::enter(&slot, HookStage::AfterSwap)?;
        let guard = if self.config.deferred_completion {
            guard.hold_session()
        } else {
            guard
        };

        let skim = Skim::for_trade(params, &delta);
        skim.collect(curve, key, self.address())?;
        let fees = skim.apply(&fees)?;
        let fees = distribute(curve, key, self.address(), &fees)?;
        let hook_delta = skim.hook_delta()?;

        guard.commit(fees)?;
        log::debug!(
            "skimmed {} of currency{} on pool {} (sender {}); ledger now ({}, {})",
            skim.fee,
            if skim.zero { 0 } else { 1 },
            pool,
            sender,
            fees.amount0,
            fees.amount1
        );
        Ok(hook_delta)
    }

    /// Close the trade in flight on a pool, keeping its ledger effects
    ///
    /// A no-op unless the recycler defers completion.
    pub fn complete_swap(&self, key: &PoolKey) -> RecyclerResult<()> {
        let pool = key.to_id();
        if !self.registry.contains(&pool) {
            return Ok(());
        }
        self.ledger.slot(&pool).complete(std::thread::current().id())?;
        Ok(())
    }

    /// Abandon the trade in flight on a pool
    ///
    /// Called by the curve engine when a trade fails after `before_swap`;
    /// with deferred completion also when it fails after `after_swap`.
    pub fn abort_swap(&self, key: &PoolKey) -> RecyclerResult<()> {
        let pool = key.to_id();
        if !self.registry.contains(&pool) {
            return Ok(());
        }
        if self.ledger.slot(&pool).abort(std::thread::current().id())? {
            log::warn!("trade on pool {} aborted; ledger restored", pool);
        }
        Ok(())
    }
}
