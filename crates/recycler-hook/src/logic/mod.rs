//! # Fee Recycling Logic
//!
//! The three per-trade steps. Each one plans against a copy of the pool
//! ledger, performs its custody calls on the curve engine and returns the new
//! ledger; the hook entry points decide when the result is committed.

pub mod distribution;
pub mod netting;
pub mod skim;

pub use distribution::*;
pub use netting::*;
pub use skim::*;
