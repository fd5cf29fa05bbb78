//! # Engine State
//!
//! The only persistent mutable state of a recycler: the supported pool set
//! and the per-pool fee ledger, plus the trade session each ledger carries
//! while a trade is in flight.

pub mod ledger;
pub mod reentrancy;
pub mod registry;

pub use ledger::*;
pub use reentrancy::*;
pub use registry::*;
