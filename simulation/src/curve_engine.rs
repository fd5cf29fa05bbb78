/// In-memory reference curve engine. One liquidity range per pool, no ticks
/// crossed and no positions; enough of a curve to drive the recycler's hooks
/// end to end with real custody.
///
/// Custody follows flash accounting: inside a swap every take, settle, donate
/// and hook or trader credit adjusts a per-account currency delta, and the
/// swap only completes when all deltas are back to zero. A completed swap
/// closes the hook's trade session; a failed one restores the engine's state
/// from a snapshot and tells the hook to abort.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use fee_recycler::{CurveEngine, CurveError, FeeRecycler};
use fee_recycler_core::constants::{MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};
use fee_recycler_core::math::{compute_swap_step, safe_add_i128, safe_apply_delta};
use fee_recycler_core::{
    Address, BalanceDelta, BeforeSwapDelta, Currency, PoolId, PoolKey, RecyclerError, SwapParams,
    SwapStep,
};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{SimulationError, SimulationResult};

// ============================================================================
// State
// ============================================================================

/// One pool of the reference curve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolState {
    pub key: PoolKey,
    pub sqrt_price_x64: u128,
    pub liquidity: u128,
    /// Custody owned by the pool's liquidity providers
    pub reserve0: u128,
    pub reserve1: u128,
    /// Cumulative donations received
    pub donated0: u128,
    pub donated1: u128,
    /// Cumulative swap fees earned
    pub swap_fees0: u128,
    pub swap_fees1: u128,
}

impl PoolState {
    fn reserve_mut(&mut self, zero: bool) -> &mut u128 {
        if zero {
            &mut self.reserve0
        } else {
            &mut self.reserve1
        }
    }
}

/// Result of one swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapOutcome {
    /// What the trader paid (negative) and received (positive)
    pub trader_delta: BalanceDelta,
    /// What the curve itself executed
    pub curve_delta: BalanceDelta,
    /// What the hook took (positive) or supplied (negative)
    pub hook_delta: BalanceDelta,
    pub sqrt_price_after_x64: u128,
}

#[derive(Debug, Clone, Default)]
struct CurveState {
    pools: HashMap<PoolId, PoolState>,
    balances: HashMap<(Address, Currency), u128>,
    custody: HashMap<Currency, u128>,
    deltas: HashMap<(Address, Currency), i128>,
    synced: Option<Currency>,
    minted: HashMap<Currency, u128>,
}

impl CurveState {
    fn pool(&self, pool: &PoolId) -> Result<&PoolState, CurveError> {
        self.pools.get(pool).ok_or(CurveError::UnknownPool(*pool))
    }

    fn pool_mut(&mut self, pool: &PoolId) -> Result<&mut PoolState, CurveError> {
        self.pools.get_mut(pool).ok_or(CurveError::UnknownPool(*pool))
    }

    fn balance(&self, account: Address, currency: Currency) -> u128 {
        self.balances.get(&(account, currency)).copied().unwrap_or(0)
    }

    fn credit(&mut self, account: Address, currency: Currency, amount: u128) -> Result<(), CurveError> {
        let balance = self.balances.entry((account, currency)).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(CurveError::Pricing(RecyclerError::ArithmeticOverflow))?;
        Ok(())
    }

    fn debit(&mut self, account: Address, currency: Currency, amount: u128) -> Result<(), CurveError> {
        let available = self.balance(account, currency);
        if available < amount {
            return Err(CurveError::InsufficientBalance {
                currency,
                account,
                needed: amount,
                available,
            });
        }
        self.balances.insert((account, currency), available - amount);
        Ok(())
    }

    fn custody_in(&mut self, currency: Currency, amount: u128) -> Result<(), CurveError> {
        let custody = self.custody.entry(currency).or_default();
        *custody = custody
            .checked_add(amount)
            .ok_or(CurveError::Pricing(RecyclerError::ArithmeticOverflow))?;
        Ok(())
    }

    fn custody_out(&mut self, currency: Currency, amount: u128) -> Result<(), CurveError> {
        let available = self.custody.get(&currency).copied().unwrap_or(0);
        if available < amount {
            return Err(CurveError::InsufficientBalance {
                currency,
                account: Address::ZERO,
                needed: amount,
                available,
            });
        }
        self.custody.insert(currency, available - amount);
        Ok(())
    }

    /// Adjust an account's open delta; positive is owed to the account
    fn account_delta(&mut self, account: Address, currency: Currency, change: i128) -> Result<(), CurveError> {
        if change == 0 {
            return Ok(());
        }
        let current = self.deltas.get(&(account, currency)).copied().unwrap_or(0);
        let next = safe_add_i128(current, change).map_err(CurveError::Pricing)?;
        if next == 0 {
            self.deltas.remove(&(account, currency));
        } else {
            self.deltas.insert((account, currency), next);
        }
        Ok(())
    }
}

fn signed(amount: u128) -> Result<i128, CurveError> {
    i128::try_from(amount).map_err(|_| CurveError::Pricing(RecyclerError::ConversionError))
}

// ============================================================================
// Engine
// ============================================================================

/// Reference curve engine holding pools, balances and custody in memory
#[derive(Debug, Default)]
pub struct InMemoryCurve {
    state: Mutex<CurveState>,
    hook: Option<Arc<FeeRecycler>>,
}

impl InMemoryCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that invokes `recycler` for pools bound to its address
    pub fn with_hook(recycler: Arc<FeeRecycler>) -> Self {
        Self {
            state: Mutex::new(CurveState::default()),
            hook: Some(recycler),
        }
    }

    /// Create a pool with reserves minted straight into custody
    pub fn initialize_pool(
        &mut self,
        key: PoolKey,
        sqrt_price_x64: u128,
        liquidity: u128,
        reserve0: u128,
        reserve1: u128,
    ) -> SimulationResult<PoolId> {
        if !(MIN_SQRT_PRICE_X64..MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
            return Err(RecyclerError::InvalidPrice.into());
        }
        if liquidity == 0 {
            return Err(RecyclerError::InvalidAmount.into());
        }
        let id = key.to_id();
        let state = self.state.get_mut();
        if state.pools.contains_key(&id) {
            return Err(SimulationError::PoolAlreadyInitialized(id.to_string()));
        }
        for (currency, amount) in [(key.currency0, reserve0), (key.currency1, reserve1)] {
            state.custody_in(currency, amount)?;
            let minted = state.minted.entry(currency).or_default();
            *minted = minted
                .checked_add(amount)
                .ok_or(RecyclerError::ArithmeticOverflow)?;
        }
        state.pools.insert(
            id,
            PoolState {
                key,
                sqrt_price_x64,
                liquidity,
                reserve0,
                reserve1,
                donated0: 0,
                donated1: 0,
                swap_fees0: 0,
                swap_fees1: 0,
            },
        );
        log::info!("initialized pool {} at sqrt price {}", id, sqrt_price_x64);
        Ok(id)
    }

    /// Create tokens in an account
    pub fn mint(&mut self, account: Address, currency: Currency, amount: u128) -> SimulationResult<()> {
        let state = self.state.get_mut();
        state.credit(account, currency, amount)?;
        let minted = state.minted.entry(currency).or_default();
        *minted = minted
            .checked_add(amount)
            .ok_or(RecyclerError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn balance_of(&self, account: Address, currency: Currency) -> u128 {
        self.state.lock().balance(account, currency)
    }

    pub fn custody_of(&self, currency: Currency) -> u128 {
        self.state.lock().custody.get(&currency).copied().unwrap_or(0)
    }

    pub fn pool(&self, pool: &PoolId) -> Option<PoolState> {
        self.state.lock().pools.get(pool).cloned()
    }

    /// Whether every minted token is held by an account or by the engine
    pub fn is_conserved(&self) -> bool {
        let state = self.state.lock();
        state.minted.iter().all(|(currency, minted)| {
            let held: u128 = state
                .balances
                .iter()
                .filter(|((_, c), _)| c == currency)
                .map(|(_, amount)| *amount)
                .sum();
            let custody = state.custody.get(currency).copied().unwrap_or(0);
            held.checked_add(custody) == Some(*minted)
        })
    }

    /// Execute a trade, invoking the hook around it
    ///
    /// On failure nothing the trade did is kept, on either side.
    pub fn swap(
        &mut self,
        sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        hook_data: &[u8],
    ) -> SimulationResult<SwapOutcome> {
        let snapshot = self.state.get_mut().clone();
        match self.execute_swap(sender, key, params, hook_data) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                *self.state.get_mut() = snapshot;
                if let Some(recycler) = self.hook_for(key) {
                    if let Err(abort_err) = recycler.abort_swap(key) {
                        log::error!("hook refused to abort swap: {}", abort_err);
                    }
                }
                log::warn!("swap on pool {} reverted: {}", key.to_id(), err);
                Err(err)
            }
        }
    }

    fn hook_for(&self, key: &PoolKey) -> Option<Arc<FeeRecycler>> {
        self.hook
            .as_ref()
            .filter(|recycler| recycler.address() == key.hooks)
            .cloned()
    }

    fn execute_swap(
        &mut self,
        sender: Address,
        key: &PoolKey,
        params: &SwapParams,
        hook_data: &[u8],
    ) -> SimulationResult<SwapOutcome> {
        let pool_id = key.to_id();
        let current = self.state.get_mut().pool(&pool_id)?.sqrt_price_x64;
        let limit = params.sqrt_price_limit_x64;
        let limit_ok = if params.zero_for_one {
            limit < current && limit >= MIN_SQRT_PRICE_X64
        } else {
            limit > current && limit <= MAX_SQRT_PRICE_X64
        };
        if !limit_ok {
            return Err(SimulationError::InvalidPriceLimit { limit, current });
        }
        if params.amount_specified == 0 {
            return Err(RecyclerError::InvalidAmount.into());
        }

        let hook = self.hook_for(key);
        let before = match &hook {
            Some(recycler) => recycler.before_swap(&*self, sender, key, params, hook_data)?.0,
            None => BeforeSwapDelta::ZERO,
        };

        let remaining = safe_add_i128(params.amount_specified, before.specified)?;
        if remaining != 0 && (remaining < 0) != params.is_exact_input() {
            return Err(SimulationError::HookFlippedTrade);
        }
        let curve_delta = self.execute_curve(&pool_id, key, params, remaining)?;

        let after_unspecified = match &hook {
            Some(recycler) => recycler.after_swap(&*self, sender, key, params, curve_delta, hook_data)?,
            None => 0,
        };

        let hook_delta = BeforeSwapDelta::new(
            before.specified,
            safe_add_i128(before.unspecified, after_unspecified)?,
        )
        .to_balance_delta(params);
        let trader_delta = curve_delta.checked_sub(&hook_delta)?;

        let state = self.state.get_mut();
        state.account_delta(key.hooks, key.currency0, hook_delta.amount0)?;
        state.account_delta(key.hooks, key.currency1, hook_delta.amount1)?;
        state.account_delta(sender, key.currency0, trader_delta.amount0)?;
        state.account_delta(sender, key.currency1, trader_delta.amount1)?;
        Self::settle_trader(state, sender, key.currency0, trader_delta.amount0)?;
        Self::settle_trader(state, sender, key.currency1, trader_delta.amount1)?;
        Self::check_settled(state)?;
        Self::check_custody(state, key)?;

        let sqrt_price_after_x64 = state.pool(&pool_id)?.sqrt_price_x64;
        if let Some(recycler) = &hook {
            recycler.complete_swap(key)?;
        }
        log::debug!(
            "swap on pool {}: trader ({}, {}), curve ({}, {}), hook ({}, {})",
            pool_id,
            trader_delta.amount0,
            trader_delta.amount1,
            curve_delta.amount0,
            curve_delta.amount1,
            hook_delta.amount0,
            hook_delta.amount1
        );
        Ok(SwapOutcome {
            trader_delta,
            curve_delta,
            hook_delta,
            sqrt_price_after_x64,
        })
    }

    /// Swap the residual amount against the pool's liquidity
    fn execute_curve(
        &mut self,
        pool_id: &PoolId,
        key: &PoolKey,
        params: &SwapParams,
        remaining: i128,
    ) -> SimulationResult<BalanceDelta> {
        if remaining == 0 {
            return Ok(BalanceDelta::ZERO);
        }
        let state = self.state.get_mut();
        let pool = state.pool_mut(pool_id)?;
        let step: SwapStep = compute_swap_step(
            pool.sqrt_price_x64,
            params.sqrt_price_limit_x64,
            pool.liquidity,
            remaining,
            key.fee,
        )?;

        let paid = step
            .amount_in
            .checked_add(step.fee_amount)
            .ok_or(RecyclerError::ArithmeticOverflow)?;
        let paid = signed(paid)?;
        let received = signed(step.amount_out)?;
        let zero_in = params.zero_for_one;

        // The pool gains what is paid in and loses what is paid out
        let reserve_in = pool.reserve_mut(zero_in);
        *reserve_in = safe_apply_delta(*reserve_in, paid)?;
        let reserve_out = pool.reserve_mut(!zero_in);
        *reserve_out = safe_apply_delta(*reserve_out, -received)?;
        let swap_fees = if zero_in {
            &mut pool.swap_fees0
        } else {
            &mut pool.swap_fees1
        };
        *swap_fees = swap_fees
            .checked_add(step.fee_amount)
            .ok_or(RecyclerError::ArithmeticOverflow)?;
        pool.sqrt_price_x64 = step.sqrt_price_next_x64;

        Ok(if zero_in {
            BalanceDelta::new(-paid, received)
        } else {
            BalanceDelta::new(received, -paid)
        })
    }

    /// Pay the trader what it is owed and collect what it owes
    fn settle_trader(state: &mut CurveState, trader: Address, currency: Currency, delta: i128) -> SimulationResult<()> {
        let amount = delta.unsigned_abs();
        if delta < 0 {
            state.debit(trader, currency, amount)?;
            state.custody_in(currency, amount)?;
            state.account_delta(trader, currency, -delta)?;
        } else if delta > 0 {
            state.custody_out(currency, amount)?;
            state.credit(trader, currency, amount)?;
            state.account_delta(trader, currency, -delta)?;
        }
        Ok(())
    }

    fn check_settled(state: &CurveState) -> SimulationResult<()> {
        if state.deltas.is_empty() {
            return Ok(());
        }
        let open: BTreeMap<String, i128> = state
            .deltas
            .iter()
            .map(|((account, currency), delta)| (format!("{}/{}", account, currency), *delta))
            .collect();
        Err(SimulationError::UnsettledDeltas(format!("{:?}", open)))
    }

    /// Custody of the pool's currencies must equal what its pools own
    fn check_custody(state: &CurveState, key: &PoolKey) -> SimulationResult<()> {
        for currency in [key.currency0, key.currency1] {
            let reserves: u128 = state
                .pools
                .values()
                .map(|pool| {
                    let mut held = 0;
                    if pool.key.currency0 == currency {
                        held += pool.reserve0;
                    }
                    if pool.key.currency1 == currency {
                        held += pool.reserve1;
                    }
                    held
                })
                .sum();
            let custody = state.custody.get(&currency).copied().unwrap_or(0);
            if custody != reserves {
                return Err(SimulationError::CustodyMismatch {
                    currency: currency.to_string(),
                    custody,
                    reserves,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Curve Engine Interface
// ============================================================================

impl CurveEngine for InMemoryCurve {
    fn sqrt_price(&self, pool: &PoolId) -> Result<u128, CurveError> {
        Ok(self.state.lock().pool(pool)?.sqrt_price_x64)
    }

    fn liquidity(&self, pool: &PoolId) -> Result<u128, CurveError> {
        Ok(self.state.lock().pool(pool)?.liquidity)
    }

    fn compute_swap_step(
        &self,
        sqrt_price_current_x64: u128,
        sqrt_price_target_x64: u128,
        liquidity: u128,
        amount_remaining: i128,
        fee_pips: u32,
    ) -> Result<SwapStep, CurveError> {
        compute_swap_step(
            sqrt_price_current_x64,
            sqrt_price_target_x64,
            liquidity,
            amount_remaining,
            fee_pips,
        )
        .map_err(CurveError::Pricing)
    }

    fn take(&self, currency: Currency, to: Address, amount: u128) -> Result<(), CurveError> {
        let mut state = self.state.lock();
        state.custody_out(currency, amount)?;
        state.credit(to, currency, amount)?;
        state.account_delta(to, currency, -signed(amount)?)
    }

    fn sync(&self, currency: Currency) -> Result<(), CurveError> {
        self.state.lock().synced = Some(currency);
        Ok(())
    }

    fn settle(&self, currency: Currency, from: Address, amount: u128) -> Result<(), CurveError> {
        let mut state = self.state.lock();
        if state.synced != Some(currency) {
            return Err(CurveError::UnsyncedSettlement { currency });
        }
        state.debit(from, currency, amount)?;
        state.custody_in(currency, amount)?;
        state.account_delta(from, currency, signed(amount)?)?;
        state.synced = None;
        Ok(())
    }

    fn donate(&self, key: &PoolKey, amount0: u128, amount1: u128) -> Result<BalanceDelta, CurveError> {
        let mut state = self.state.lock();
        let pool = state.pool_mut(&key.to_id())?;
        let overflow = || CurveError::Pricing(RecyclerError::ArithmeticOverflow);
        pool.reserve0 = pool.reserve0.checked_add(amount0).ok_or_else(overflow)?;
        pool.reserve1 = pool.reserve1.checked_add(amount1).ok_or_else(overflow)?;
        pool.donated0 = pool.donated0.checked_add(amount0).ok_or_else(overflow)?;
        pool.donated1 = pool.donated1.checked_add(amount1).ok_or_else(overflow)?;

        // Owed by the donor, which is the pool's hook
        let delta = BalanceDelta::new(-signed(amount0)?, -signed(amount1)?);
        state.account_delta(key.hooks, key.currency0, delta.amount0)?;
        state.account_delta(key.hooks, key.currency1, delta.amount1)?;
        Ok(delta)
    }
}
