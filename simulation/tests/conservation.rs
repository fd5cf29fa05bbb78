//! Value conservation over random trade sequences

use fee_recycler_core::constants::{MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};
use fee_recycler_core::{Address, SwapParams};
use fee_recycler_simulation::config::SeedFees;
use fee_recycler_simulation::{example_config, ScenarioRunner};
use proptest::prelude::*;

const ONE: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone)]
struct Trade {
    zero_for_one: bool,
    exact_input: bool,
    amount: u128,
}

fn trade_strategy() -> impl Strategy<Value = Trade> {
    (any::<bool>(), any::<bool>(), 1u128..(200 * ONE)).prop_map(|(zero_for_one, exact_input, amount)| Trade {
        zero_for_one,
        exact_input,
        amount,
    })
}

fn params(trade: &Trade) -> SwapParams {
    let limit = if trade.zero_for_one {
        MIN_SQRT_PRICE_X64
    } else {
        MAX_SQRT_PRICE_X64
    };
    if trade.exact_input {
        SwapParams::exact_input(trade.zero_for_one, trade.amount, limit)
    } else {
        SwapParams::exact_output(trade.zero_for_one, trade.amount, limit)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_trades_conserve_value(
        seed0 in 0u128..(2 * ONE),
        seed1 in 0u128..(50 * ONE),
        trades in prop::collection::vec(trade_strategy(), 1..12),
    ) {
        let mut config = example_config();
        config.seed_fees = SeedFees { amount0: seed0, amount1: seed1 };
        let mut runner = ScenarioRunner::new(config).unwrap();
        let trader = Address::from_low_u8(0x77);
        let hook = runner.recycler().address();
        let key = *runner.key();

        for (index, trade) in trades.iter().enumerate() {
            let before = runner.recycler().pool_fees(&key);
            let report = runner.execute_trade(index, trader, params(trade));
            let after = report.fees_after;

            if let Some(outcome) = report.outcome {
                // The hook never pays out more secondary than the ledger held
                let supplied = (-outcome.hook_delta.amount1).max(0) as u128;
                prop_assert!(supplied <= before.amount1);
                if !trade.zero_for_one {
                    prop_assert!(after.amount1 >= before.amount1);
                }
                // The trader pays at most its budget on exact input
                if trade.exact_input {
                    let paid = outcome.trader_delta.amount(trade.zero_for_one);
                    prop_assert_eq!(paid, -(trade.amount as i128));
                }
            } else {
                prop_assert_eq!(after, before);
            }

            // The recycler's custody backs its ledger exactly
            prop_assert_eq!(runner.curve().balance_of(hook, key.currency0), after.amount0);
            prop_assert_eq!(runner.curve().balance_of(hook, key.currency1), after.amount1);
            prop_assert!(runner.curve().is_conserved());
        }
    }
}
