//! Pool registry: the set of pools a recycler acts on

use std::collections::HashSet;

use fee_recycler_core::{PoolId, PoolKey, RecyclerResult};
use parking_lot::RwLock;

use crate::config::RecyclerConfig;

/// Supported pool set
#[derive(Debug, Default)]
pub struct PoolRegistry {
    supported: RwLock<HashSet<PoolId>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a pool against the configuration and mark it supported
    ///
    /// Returns `false` when the pool was already registered.
    pub fn register(&self, key: &PoolKey, config: &RecyclerConfig) -> RecyclerResult<bool> {
        config.validate_pool(key)?;
        Ok(self.supported.write().insert(key.to_id()))
    }

    pub fn contains(&self, pool: &PoolId) -> bool {
        self.supported.read().contains(pool)
    }

    /// Registered pools in identity order
    pub fn pools(&self) -> Vec<PoolId> {
        let mut pools: Vec<PoolId> = self.supported.read().iter().copied().collect();
        pools.sort();
        pools
    }

    pub fn len(&self) -> usize {
        self.supported.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.supported.read().is_empty()
    }
}
