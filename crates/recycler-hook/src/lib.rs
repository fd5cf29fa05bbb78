//! # Fee Recycler
//!
//! A hook for an AMM curve engine that recycles trading fees:
//!
//! - **Netting**: before a trade reaches the curve, fill part of it from the
//!   accumulated secondary-currency fees at the current marginal price
//! - **Skim**: after the trade, keep 1% of the realized unspecified amount
//! - **Distribution**: once enough base currency has accumulated, donate it
//!   to the pool's liquidity providers
//!
//! The curve engine itself is a collaborator behind the [`CurveEngine`]
//! trait. A recycler can be shared across threads; trades on the same pool
//! are serialized, trades on different pools run in parallel.
//!
//! ## Feature Flags
//!
//! - `client`: Enables serde serialization of the configuration types

pub mod config;
pub mod curve;
pub mod logic;
pub mod permissions;
pub mod recycler;
pub mod state;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use config::RecyclerConfig;
pub use curve::{CurveEngine, CurveError};
pub use permissions::HookPermissions;
pub use recycler::FeeRecycler;
