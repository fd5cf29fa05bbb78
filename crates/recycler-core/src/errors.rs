//! # Core Error Types
//!
//! Errors shared by the engine and the simulation harness. Every variant is
//! fatal to the trade in flight: the operation aborts and nothing it attempted
//! is applied.

use thiserror::Error;

/// Errors that can abort a recycler operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum RecyclerError {
    // ========================================================================
    // Registration Errors
    // ========================================================================

    #[error("Pool hook binding does not match this engine")]
    InvalidHookBinding,

    #[error("Pool base currency does not match the configured base asset")]
    InvalidBaseCurrency,

    #[error("Pool is not registered with this engine")]
    PoolNotRegistered,

    // ========================================================================
    // Arithmetic Errors
    // ========================================================================

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Mul div overflow")]
    MulDivOverflow,

    #[error("Conversion error")]
    ConversionError,

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid price")]
    InvalidPrice,

    #[error("Invalid fee rate: {0} pips")]
    InvalidFee(u32),

    // ========================================================================
    // Execution Errors
    // ========================================================================

    #[error("Curve engine call '{operation}' failed: {reason}")]
    ExternalCallFailure { operation: String, reason: String },

    #[error("Reentrancy detected")]
    ReentrancyDetected,
}

/// Result type using recycler errors
pub type RecyclerResult<T> = Result<T, RecyclerError>;

impl RecyclerError {
    /// Create an external call failure for a named curve-engine operation
    pub fn external_call(operation: &str, reason: impl std::fmt::Display) -> Self {
        Self::ExternalCallFailure {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error originated in the collaborating curve engine
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalCallFailure { .. })
    }
}
