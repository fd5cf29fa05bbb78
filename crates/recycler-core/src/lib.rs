//! # Fee Recycler Core - Shared Types and Math
//!
//! This crate contains the types and fixed-point logic shared between the
//! fee recycling engine and the simulation harness. It provides:
//!
//! - Pool identity, currency and address types
//! - Ledger and swap delta value types with their sign conventions
//! - Checked arithmetic and Q64.64 sqrt price math
//! - The single-range swap step used to price internal fills
//!
//! ## Feature Flags
//!
//! - `client`: Enables serde and borsh serialization of the value types

pub mod constants;
pub mod errors;
pub mod math;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use errors::{RecyclerError, RecyclerResult};
pub use types::*;
