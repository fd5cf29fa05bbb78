//! # Mathematical Functions
//!
//! Pure fixed-point functions. Nothing here uses floating point; every
//! division states its rounding direction.

pub mod big_int;
pub mod fee_math;
pub mod safe_math;
pub mod sqrt_price_math;
pub mod swap_math;

// Re-export commonly used functions
pub use big_int::*;
pub use fee_math::*;
pub use safe_math::*;
pub use sqrt_price_math::*;
pub use swap_math::*;
