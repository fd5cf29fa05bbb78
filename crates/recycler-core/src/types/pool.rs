//! # Pool Identity
//!
//! A pool is configured by its key; the key hashes to the `PoolId` that
//! indexes all engine state.

use std::fmt;

use sha3::{Digest, Keccak256};

use crate::types::address::{Address, Currency};

/// Opaque 32-byte pool identity
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PoolId(pub [u8; 32]);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Full configuration of one trading pair
#[cfg_attr(
    feature = "client",
    derive(
        serde::Serialize,
        serde::Deserialize,
        borsh::BorshSerialize,
        borsh::BorshDeserialize
    )
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    /// Base currency of the pool
    pub currency0: Currency,
    /// Secondary currency of the pool
    pub currency1: Currency,
    /// Fee tier in pips
    pub fee: u32,
    pub tick_spacing: i32,
    /// Hook bound to the pool
    pub hooks: Address,
}

impl PoolKey {
    pub fn new(
        currency0: Currency,
        currency1: Currency,
        fee: u32,
        tick_spacing: i32,
        hooks: Address,
    ) -> Self {
        Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        }
    }

    /// Derive the pool identity
    ///
    /// Keccak-256 over currency0 | currency1 | fee (BE) | tick spacing (BE) | hooks.
    pub fn to_id(&self) -> PoolId {
        let mut hasher = Keccak256::new();
        hasher.update(self.currency0.address().as_bytes());
        hasher.update(self.currency1.address().as_bytes());
        hasher.update(self.fee.to_be_bytes());
        hasher.update(self.tick_spacing.to_be_bytes());
        hasher.update(self.hooks.as_bytes());

        let mut id = [0u8; 32];
        id.copy_from_slice(&hasher.finalize());
        PoolId(id)
    }

    /// Currency on the given side of the pool
    pub fn currency(&self, zero: bool) -> Currency {
        if zero {
            self.currency0
        } else {
            self.currency1
        }
    }
}
