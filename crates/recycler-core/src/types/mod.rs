//! # Core Types
//!
//! Value types shared by the engine and its collaborators.

pub mod address;
pub mod fees;
pub mod pool;
pub mod swap;

pub use address::*;
pub use fees::*;
pub use pool::*;
pub use swap::*;
