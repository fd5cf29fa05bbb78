//! # Protocol Constants
//!
//! Fixed-point scales, price bounds and the fee recycling parameters.
//! Fee parameters are fixed; there is no governance over them.

// ============================================================================
// Mathematical Constants
// ============================================================================

/// Q64 fixed-point scale factor: 2^64
pub const Q64: u128 = 1u128 << 64;

/// Bits of fractional precision in a Q64.64 sqrt price
pub const Q64_RESOLUTION: u32 = 64;

/// Swap fees are expressed in pips (hundredths of a basis point)
pub const PIPS_DENOMINATOR: u32 = 1_000_000;

/// Largest fee rate accepted by the swap step (just under 100%)
pub const MAX_FEE_PIPS: u32 = PIPS_DENOMINATOR - 1;

// ============================================================================
// Price Bounds
// ============================================================================

/// Minimum sqrt price in Q64.64 format
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;

/// Maximum sqrt price in Q64.64 format
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_992_447_579_055;

// ============================================================================
// Fee Recycling Parameters
// ============================================================================

/// Divisor of the post-trade skim: fee = floor(|realized| / 100), a flat 1%
pub const SKIM_DIVISOR: u128 = 100;

/// Minimum base-currency balance (smallest units) before a distribution fires
pub const DISTRIBUTION_THRESHOLD: u128 = 100_000_000_000_000; // 1e14

/// Fee override returned by the pre-trade hook; the recycler never changes the pool fee
pub const NO_FEE_OVERRIDE: u32 = 0;

/// Fee rate used when pricing internal fills
pub const NETTING_FEE_PIPS: u32 = 0;
