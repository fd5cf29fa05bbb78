//! Hook entry points against the recording curve

use fee_recycler_core::constants::{DISTRIBUTION_THRESHOLD, MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64, Q64};
use fee_recycler_core::{
    Address, BalanceDelta, BeforeSwapDelta, ClaimableFees, Currency, PoolKey, RecyclerError,
    SwapParams,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

use super::mock_curve::{CurveCall, RecordingCurve, HOOK, SECONDARY};
use crate::{FeeRecycler, HookPermissions, RecyclerConfig};

const ONE: u128 = 1_000_000_000_000_000_000;
const LIQUIDITY: u128 = 1_000_000 * ONE;

fn recycler() -> FeeRecycler {
    FeeRecycler::new(RecyclerConfig::new(HOOK, Currency::NATIVE))
}

fn registered() -> (FeeRecycler, PoolKey) {
    let recycler = recycler();
    let key = RecordingCurve::key();
    recycler.register_pool(&key).unwrap();
    (recycler, key)
}

fn registered_deferred() -> (FeeRecycler, PoolKey) {
    let recycler =
        FeeRecycler::new(RecyclerConfig::new(HOOK, Currency::NATIVE).with_deferred_completion());
    let key = RecordingCurve::key();
    recycler.register_pool(&key).unwrap();
    (recycler, key)
}

fn trader() -> Address {
    Address::from_low_u8(0x77)
}

#[test]
fn test_register_pool_validation() {
    let recycler = recycler();
    let unbound = PoolKey::new(Currency::NATIVE, SECONDARY, 3_000, 60, Address::ZERO);
    assert_eq!(
        recycler.register_pool(&unbound),
        Err(RecyclerError::InvalidHookBinding)
    );
    let wrong_base = PoolKey::new(SECONDARY, Currency::NATIVE, 3_000, 60, HOOK);
    assert_eq!(
        recycler.register_pool(&wrong_base),
        Err(RecyclerError::InvalidBaseCurrency)
    );
    assert!(recycler.supported_pools().is_empty());
}

#[test]
fn test_register_pool_is_idempotent() {
    let (recycler, key) = registered();
    recycler.deposit_fees(&key, 3, 4).unwrap();
    recycler.register_pool(&key).unwrap();
    assert_eq!(recycler.supported_pools(), vec![key.to_id()]);
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(3, 4));
    assert!(recycler.is_supported(&key));
}

#[test]
fn test_unregistered_pool_is_neutral() {
    let recycler = recycler();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    let key = RecordingCurve::key();
    let params = SwapParams::exact_input(true, ONE, MIN_SQRT_PRICE_X64);

    assert_eq!(
        recycler.deposit_fees(&key, ONE, ONE),
        Err(RecyclerError::PoolNotRegistered)
    );
    assert_eq!(
        recycler.before_swap(&curve, trader(), &key, &params, &[]).unwrap(),
        (BeforeSwapDelta::ZERO, 0)
    );
    let realized = BalanceDelta::new(-(ONE as i128), ONE as i128);
    assert_eq!(
        recycler
            .after_swap(&curve, trader(), &key, &params, realized, &[])
            .unwrap(),
        0
    );
    assert!(recycler.abort_swap(&key).is_ok());
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::ZERO);
    assert!(curve.calls().is_empty());
}

#[test]
fn test_base_supplying_trade_nets_against_secondary_fees() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_input(true, ONE, MIN_SQRT_PRICE_X64);
    let (delta, fee_override) = recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    assert_eq!(fee_override, 0);
    assert_eq!(delta.specified, ONE as i128);
    let secondary = delta.unspecified.unsigned_abs();
    assert!(secondary > 0 && secondary <= ONE);

    // Ledger is updated as soon as the pre-trade hook returns
    assert_eq!(
        recycler.pool_fees(&key),
        ClaimableFees::new(ONE, 5 * ONE - secondary)
    );
    assert_eq!(
        curve.calls(),
        vec![
            CurveCall::Take(Currency::NATIVE, HOOK, ONE),
            CurveCall::Sync(SECONDARY),
            CurveCall::Settle(SECONDARY, HOOK, secondary),
        ]
    );

    // Whole budget was netted, the curve swaps nothing
    let hook_delta = recycler
        .after_swap(&curve, trader(), &key, &params, BalanceDelta::ZERO, &[])
        .unwrap();
    assert_eq!(hook_delta, 0);

    // The netted base crossed the threshold and was donated
    assert_eq!(
        recycler.pool_fees(&key),
        ClaimableFees::new(0, 5 * ONE - secondary)
    );
    assert!(curve
        .calls()
        .contains(&CurveCall::Donate(key.to_id(), ONE, 0)));
}

#[test]
fn test_secondary_supplying_trade_leaves_secondary_fees() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_input(false, ONE, MAX_SQRT_PRICE_X64);
    let (delta, _) = recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    assert!(delta.is_zero());
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, 5 * ONE));
    assert!(curve.calls().is_empty());

    // Curve delivered 0.99 base for 1 secondary; 1% of the base is skimmed
    let realized = BalanceDelta::new((99 * ONE / 100) as i128, -(ONE as i128));
    let hook_delta = recycler
        .after_swap(&curve, trader(), &key, &params, realized, &[])
        .unwrap();
    let fee = 99 * ONE / 100 / 100;
    assert_eq!(hook_delta, fee as i128);
    assert_eq!(curve.calls()[0], CurveCall::Take(Currency::NATIVE, HOOK, fee));
    // Skimmed base exceeds the threshold and is donated straight away
    assert!(fee >= DISTRIBUTION_THRESHOLD);
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, 5 * ONE));
}

#[test]
fn test_fresh_pool_skims_secondary_output() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    let params = SwapParams::exact_input(true, ONE, MIN_SQRT_PRICE_X64);

    let (delta, _) = recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    assert!(delta.is_zero());

    let realized = BalanceDelta::new(-(ONE as i128), 997 * ONE as i128 / 1_000);
    let hook_delta = recycler
        .after_swap(&curve, trader(), &key, &params, realized, &[])
        .unwrap();
    let fee = 997 * ONE / 1_000 / 100;
    assert_eq!(hook_delta, fee as i128);
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, fee));
    assert_eq!(curve.calls(), vec![CurveCall::Take(SECONDARY, HOOK, fee)]);
}

#[test]
fn test_deposited_base_is_distributed_on_next_trade() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler.deposit_fees(&key, ONE, 0).unwrap();

    let params = SwapParams::exact_input(false, 50, MAX_SQRT_PRICE_X64);
    recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    // Too small to skim anything
    let realized = BalanceDelta::new(49, -50);
    recycler
        .after_swap(&curve, trader(), &key, &params, realized, &[])
        .unwrap();

    assert_eq!(recycler.pool_fees(&key), ClaimableFees::ZERO);
    assert_eq!(
        curve.calls(),
        vec![
            CurveCall::Donate(key.to_id(), ONE, 0),
            CurveCall::Sync(Currency::NATIVE),
            CurveCall::Settle(Currency::NATIVE, HOOK, ONE),
        ]
    );
}

#[test]
fn test_base_below_threshold_is_kept() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler
        .deposit_fees(&key, DISTRIBUTION_THRESHOLD - 1, 0)
        .unwrap();

    let params = SwapParams::exact_input(false, 50, MAX_SQRT_PRICE_X64);
    recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    recycler
        .after_swap(&curve, trader(), &key, &params, BalanceDelta::new(49, -50), &[])
        .unwrap();

    assert_eq!(
        recycler.pool_fees(&key),
        ClaimableFees::new(DISTRIBUTION_THRESHOLD - 1, 0)
    );
    assert!(curve.calls().is_empty());
}

#[test]
fn test_failed_distribution_rolls_back_whole_trade() {
    super::init_logging();
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY).failing_on("donate");
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_input(true, ONE, MIN_SQRT_PRICE_X64);
    recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    assert_ne!(recycler.pool_fees(&key), ClaimableFees::new(0, 5 * ONE));

    let err = recycler
        .after_swap(&curve, trader(), &key, &params, BalanceDelta::ZERO, &[])
        .unwrap_err();
    assert!(err.is_external());
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, 5 * ONE));

    // The pool is usable again
    recycler.deposit_fees(&key, 1, 0).unwrap();
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(1, 5 * ONE));
}

#[test]
fn test_failed_netting_custody_leaves_ledger() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY).failing_on("settle");
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_output(true, ONE, MIN_SQRT_PRICE_X64);
    let err = recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap_err();
    assert_eq!(err, RecyclerError::external_call("settle", "injected failure"));
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, 5 * ONE));
    // Nothing to undo, the session is already closed
    recycler.abort_swap(&key).unwrap();
    recycler.deposit_fees(&key, 0, 1).unwrap();
}

#[test]
fn test_abort_swap_restores_netting() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_output(true, 2 * ONE, MIN_SQRT_PRICE_X64);
    let (delta, _) = recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    assert_eq!(delta.specified, -2 * ONE as i128);

    recycler.abort_swap(&key).unwrap();
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, 5 * ONE));
}

#[test]
fn test_trades_run_back_to_back_through_hooks_alone() {
    let (recycler, key) = registered();
    let recycler = Arc::new(recycler);
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_input(true, 1_000, MIN_SQRT_PRICE_X64);
    for _ in 0..2 {
        recycler
            .before_swap(&curve, trader(), &key, &params, &[])
            .unwrap();
        recycler
            .after_swap(&curve, trader(), &key, &params, BalanceDelta::ZERO, &[])
            .unwrap();
    }
    recycler.deposit_fees(&key, 1, 0).unwrap();

    // Another thread is not left waiting on a finished trade
    let other = {
        let recycler = Arc::clone(&recycler);
        thread::spawn(move || recycler.deposit_fees(&key, 1, 0))
    };
    assert_eq!(other.join().unwrap(), Ok(()));

    let fees = recycler.pool_fees(&key);
    assert_eq!(fees.amount0, 2_000 + 2);
    assert!(fees.amount1 < 5 * ONE);
}

#[test]
fn test_post_trade_hook_on_another_thread() {
    let (recycler, key) = registered();
    let recycler = Arc::new(recycler);
    let curve = Arc::new(RecordingCurve::new(Q64, LIQUIDITY));
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_input(true, 1_000, MIN_SQRT_PRICE_X64);
    recycler
        .before_swap(curve.as_ref(), trader(), &key, &params, &[])
        .unwrap();
    let settled = {
        let recycler = Arc::clone(&recycler);
        let curve = Arc::clone(&curve);
        thread::spawn(move || {
            recycler.after_swap(curve.as_ref(), trader(), &key, &params, BalanceDelta::ZERO, &[])
        })
    };
    assert_eq!(settled.join().unwrap(), Ok(0));

    // Session closed; this thread may trade again
    recycler
        .before_swap(curve.as_ref(), trader(), &key, &params, &[])
        .unwrap();
    recycler.abort_swap(&key).unwrap();
    assert_eq!(recycler.pool_fees(&key).amount0, 1_000);
}

#[test]
fn test_trade_in_flight_is_invisible_to_other_threads() {
    let (recycler, key) = registered();
    let recycler = Arc::new(recycler);
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_input(true, ONE, MIN_SQRT_PRICE_X64);
    recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    assert_eq!(recycler.pool_fees(&key).amount0, ONE);

    let seen = {
        let recycler = Arc::clone(&recycler);
        thread::spawn(move || recycler.pool_fees(&key))
            .join()
            .unwrap()
    };
    assert_eq!(seen, ClaimableFees::new(0, 5 * ONE));

    recycler.abort_swap(&key).unwrap();
    assert_eq!(recycler.pool_fees(&key), seen);
}

#[test]
fn test_abort_after_settlement_restores_whole_trade() {
    let (recycler, key) = registered_deferred();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler.deposit_fees(&key, 0, 5 * ONE).unwrap();

    let params = SwapParams::exact_input(true, ONE, MIN_SQRT_PRICE_X64);
    recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    recycler
        .after_swap(&curve, trader(), &key, &params, BalanceDelta::ZERO, &[])
        .unwrap();
    // Deposits wait for the curve engine to close the trade
    assert_eq!(
        recycler.deposit_fees(&key, 1, 1),
        Err(RecyclerError::ReentrancyDetected)
    );

    // Trader settlement failed on the curve side
    recycler.abort_swap(&key).unwrap();
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, 5 * ONE));
    recycler.deposit_fees(&key, 1, 1).unwrap();
}

#[test]
fn test_complete_swap_keeps_trade_effects() {
    let (recycler, key) = registered_deferred();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    let params = SwapParams::exact_input(true, 1_000, MIN_SQRT_PRICE_X64);
    recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    recycler
        .after_swap(&curve, trader(), &key, &params, BalanceDelta::new(-1_000, 990), &[])
        .unwrap();
    recycler.complete_swap(&key).unwrap();

    // Nothing left to abort
    recycler.abort_swap(&key).unwrap();
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, 9));
    recycler.complete_swap(&key).unwrap();
}

#[test]
fn test_exact_output_of_zero_is_neutral() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    recycler.deposit_fees(&key, 0, ONE).unwrap();
    let params = SwapParams::exact_output(true, 0, MIN_SQRT_PRICE_X64);
    let (delta, _) = recycler
        .before_swap(&curve, trader(), &key, &params, &[])
        .unwrap();
    assert!(delta.is_zero());
    recycler.abort_swap(&key).unwrap();
}

#[test]
fn test_after_swap_without_before_swap() {
    let (recycler, key) = registered();
    let curve = RecordingCurve::new(Q64, LIQUIDITY);
    let params = SwapParams::exact_input(true, 1_000, MIN_SQRT_PRICE_X64);
    let hook_delta = recycler
        .after_swap(&curve, trader(), &key, &params, BalanceDelta::new(-1_000, 990), &[])
        .unwrap();
    assert_eq!(hook_delta, 9);
    assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, 9));
}

#[test]
fn test_hook_permissions() {
    assert_eq!(recycler().hook_permissions(), HookPermissions::fee_recycler());
}

proptest! {
    #[test]
    fn prop_deposits_are_additive(deposits in prop::collection::vec((0u128..u64::MAX as u128, 0u128..u64::MAX as u128), 1..20)) {
        let (recycler, key) = registered();
        let mut expected = ClaimableFees::ZERO;
        for (amount0, amount1) in deposits {
            recycler.deposit_fees(&key, amount0, amount1).unwrap();
            expected.amount0 += amount0;
            expected.amount1 += amount1;
        }
        prop_assert_eq!(recycler.pool_fees(&key), expected);
    }

    #[test]
    fn prop_netting_never_exceeds_ledger_or_request(
        ledger in 1u128..(1_000_000 * ONE),
        amount in 1u128..(10_000 * ONE),
        liquidity in (1_000 * ONE)..(1_000_000_000 * ONE),
        exact_input in any::<bool>(),
    ) {
        let (recycler, key) = registered();
        let curve = RecordingCurve::new(Q64, liquidity);
        recycler.deposit_fees(&key, 0, ledger).unwrap();

        let params = if exact_input {
            SwapParams::exact_input(true, amount, MIN_SQRT_PRICE_X64)
        } else {
            SwapParams::exact_output(true, amount, MIN_SQRT_PRICE_X64)
        };
        let (delta, _) = recycler.before_swap(&curve, trader(), &key, &params, &[]).unwrap();
        let after = recycler.pool_fees(&key);
        recycler.abort_swap(&key).unwrap();

        let secondary = ledger - after.amount1;
        let base = after.amount0;
        prop_assert!(secondary <= ledger);
        if exact_input {
            prop_assert!(base <= amount);
            prop_assert_eq!(delta.specified, base as i128);
            prop_assert_eq!(delta.unspecified, -(secondary as i128));
        } else {
            prop_assert!(secondary <= amount.min(ledger));
            prop_assert_eq!(delta.specified, -(secondary as i128));
            prop_assert_eq!(delta.unspecified, base as i128);
        }
        // Rolled back
        prop_assert_eq!(recycler.pool_fees(&key), ClaimableFees::new(0, ledger));
    }
}
