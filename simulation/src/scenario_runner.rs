use std::sync::Arc;

use fee_recycler::FeeRecycler;
use fee_recycler_core::{Address, ClaimableFees, PoolId, PoolKey, SwapParams};
use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::curve_engine::{InMemoryCurve, PoolState, SwapOutcome};
use crate::error::SimulationResult;

/// Runs a scenario against a fresh recycler and reference curve
pub struct ScenarioRunner {
    config: ScenarioConfig,
    recycler: Arc<FeeRecycler>,
    curve: InMemoryCurve,
    key: PoolKey,
}

/// Record of one executed trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeReport {
    pub index: usize,
    pub trader: String,
    pub params: SwapParams,
    /// Absent when the trade reverted
    pub outcome: Option<SwapOutcome>,
    pub error: Option<String>,
    pub fees_after: ClaimableFees,
}

/// Result of a scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub pool_id: String,
    pub trades: Vec<TradeReport>,
    pub final_fees: ClaimableFees,
    pub final_pool: Option<PoolState>,
    /// Recycler custody of (base, secondary)
    pub recycler_balances: (u128, u128),
    /// Every minted token is accounted for
    pub conserved: bool,
}

impl ScenarioRunner {
    /// Build the environment: pool, registration, funded accounts, seeded fees
    pub fn new(config: ScenarioConfig) -> SimulationResult<Self> {
        config.validate()?;
        let recycler = Arc::new(FeeRecycler::new(config.recycler_config()));
        let mut curve = InMemoryCurve::with_hook(Arc::clone(&recycler));
        let key = config.pool_key();

        curve.initialize_pool(
            key,
            config.pool.sqrt_price_x64,
            config.pool.liquidity,
            config.pool.reserve0,
            config.pool.reserve1,
        )?;
        if config.pool.register {
            recycler.register_pool(&key)?;
        }

        for account in &config.accounts {
            curve.mint(account.address, key.currency0, account.amount0)?;
            curve.mint(account.address, key.currency1, account.amount1)?;
        }

        let seed = &config.seed_fees;
        if seed.amount0 > 0 || seed.amount1 > 0 {
            // Seeded fees are backed by tokens in the recycler's custody
            curve.mint(recycler.address(), key.currency0, seed.amount0)?;
            curve.mint(recycler.address(), key.currency1, seed.amount1)?;
            recycler.deposit_fees(&key, seed.amount0, seed.amount1)?;
        }

        log::info!(
            "scenario '{}' ready: pool {}, {} trades",
            config.name,
            key.to_id(),
            config.trades.len()
        );
        Ok(Self {
            config,
            recycler,
            curve,
            key,
        })
    }

    pub fn recycler(&self) -> &FeeRecycler {
        &self.recycler
    }

    pub fn curve(&self) -> &InMemoryCurve {
        &self.curve
    }

    pub fn key(&self) -> &PoolKey {
        &self.key
    }

    pub fn pool_id(&self) -> PoolId {
        self.key.to_id()
    }

    /// Execute one trade; a reverted trade is reported, not propagated
    pub fn execute_trade(&mut self, index: usize, trader: Address, params: SwapParams) -> TradeReport {
        let result = self.curve.swap(trader, &self.key, &params, &[]);
        let (outcome, error) = match result {
            Ok(outcome) => (Some(outcome), None),
            Err(err) => (None, Some(err.to_string())),
        };
        TradeReport {
            index,
            trader: trader.to_string(),
            params,
            outcome,
            error,
            fees_after: self.recycler.pool_fees(&self.key),
        }
    }

    /// Execute every configured trade in order
    pub fn run(&mut self) -> ScenarioReport {
        let trades: Vec<_> = self
            .config
            .trades
            .clone()
            .into_iter()
            .enumerate()
            .map(|(index, trade)| {
                let report = self.execute_trade(index, trade.trader, trade.to_params());
                match &report.error {
                    Some(err) => log::warn!("trade {} reverted: {}", index, err),
                    None => log::info!(
                        "trade {} done; ledger ({}, {})",
                        index,
                        report.fees_after.amount0,
                        report.fees_after.amount1
                    ),
                }
                report
            })
            .collect();
        self.report(trades)
    }

    fn report(&self, trades: Vec<TradeReport>) -> ScenarioReport {
        let hook = self.recycler.address();
        ScenarioReport {
            name: self.config.name.clone(),
            pool_id: self.pool_id().to_string(),
            trades,
            final_fees: self.recycler.pool_fees(&self.key),
            final_pool: self.curve.pool(&self.pool_id()),
            recycler_balances: (
                self.curve.balance_of(hook, self.key.currency0),
                self.curve.balance_of(hook, self.key.currency1),
            ),
            conserved: self.curve.is_conserved(),
        }
    }
}
