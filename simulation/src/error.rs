//! Error types for the simulation harness

use fee_recycler::CurveError;
use fee_recycler_core::RecyclerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Recycler error: {0}")]
    Recycler(#[from] RecyclerError),

    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pool {0} is already initialized")]
    PoolAlreadyInitialized(String),

    #[error("Price limit {limit} is on the wrong side of the current price {current}")]
    InvalidPriceLimit { limit: u128, current: u128 },

    #[error("Hook delta changed the direction of the trade")]
    HookFlippedTrade,

    #[error("Unsettled deltas after swap: {0}")]
    UnsettledDeltas(String),

    #[error("Engine custody of {currency} is {custody} but pools hold {reserves}")]
    CustodyMismatch {
        currency: String,
        custody: u128,
        reserves: u128,
    },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for simulation operations
pub type SimulationResult<T> = std::result::Result<T, SimulationError>;

impl From<std::io::Error> for SimulationError {
    fn from(err: std::io::Error) -> Self {
        SimulationError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(err: serde_json::Error) -> Self {
        SimulationError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SimulationError {
    fn from(err: toml::de::Error) -> Self {
        SimulationError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for SimulationError {
    fn from(err: toml::ser::Error) -> Self {
        SimulationError::Serialization(err.to_string())
    }
}
