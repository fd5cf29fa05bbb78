//! # Fee Ledger
//!
//! Owned keyed store of per-pool claimable fees. Each pool has its own slot,
//! so trades on different pools never contend; the outer map lock is only
//! taken to look a slot up or create it.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::ThreadId;

use fee_recycler_core::{ClaimableFees, PoolId, RecyclerResult};
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};

use crate::state::reentrancy::{ReentrancyGuard, ReentrancyStatus, TradeSession};

/// Ledger of one pool together with its trade session
#[derive(Debug, Default)]
pub struct PoolLedger {
    pub fees: ClaimableFees,
    pub session: TradeSession,
}

/// Synchronization cell of one pool
#[derive(Debug, Default)]
pub struct PoolSlot {
    ledger: Mutex<PoolLedger>,
    released: Condvar,
}

impl PoolSlot {
    pub fn lock(&self) -> MutexGuard<'_, PoolLedger> {
        self.ledger.lock()
    }

    /// Lock the ledger once no other thread has a trade in flight on it
    ///
    /// The owning thread is let through so the session transitions can
    /// reject its nested entries.
    pub fn wait_for_turn(&self, thread: ThreadId) -> MutexGuard<'_, PoolLedger> {
        let mut ledger = self.ledger.lock();
        while ledger.session.is_locked() && !ledger.session.is_owned_by(thread) {
            self.released.wait(&mut ledger);
        }
        ledger
    }

    /// Lock the ledger once the trade in flight, if any, is back with the
    /// curve engine
    ///
    /// The post-trade hook and the curve engine's completion calls may run on
    /// a thread other than the one that opened the session.
    pub fn wait_for_handover(&self, thread: ThreadId) -> MutexGuard<'_, PoolLedger> {
        let mut ledger = self.ledger.lock();
        while !Self::handed_over(&ledger.session, thread) {
            self.released.wait(&mut ledger);
        }
        ledger
    }

    fn handed_over(session: &TradeSession, thread: ThreadId) -> bool {
        match session.status {
            ReentrancyStatus::Unlocked | ReentrancyStatus::Executing | ReentrancyStatus::Settled => {
                true
            }
            ReentrancyStatus::Netting | ReentrancyStatus::Settling => session.is_owned_by(thread),
        }
    }

    /// Committed balances as seen by `thread`
    ///
    /// While another thread has a trade in flight this is the value the trade
    /// started from, so no intermediate state leaks out of the session.
    pub fn visible_fees(&self, thread: ThreadId) -> ClaimableFees {
        let ledger = self.ledger.lock();
        if ledger.session.is_locked() && !ledger.session.is_owned_by(thread) {
            ledger.session.checkpoint
        } else {
            ledger.fees
        }
    }

    pub fn wake_waiters(&self) {
        self.released.notify_all();
    }

    /// Abandon the trade in flight, restoring the ledger to its checkpoint
    ///
    /// Returns whether a session was rolled back.
    pub fn abort(&self, thread: ThreadId) -> RecyclerResult<bool> {
        {
            let mut ledger = self.wait_for_handover(thread);
            if !ReentrancyGuard::ensure_closable(&ledger.session)? {
                return Ok(false);
            }
            ledger.fees = ledger.session.checkpoint;
            ReentrancyGuard::release(&mut ledger.session);
        }
        self.wake_waiters();
        Ok(true)
    }

    /// Close the trade in flight, keeping its ledger effects
    ///
    /// Returns whether a session was closed.
    pub fn complete(&self, thread: ThreadId) -> RecyclerResult<bool> {
        {
            let mut ledger = self.wait_for_handover(thread);
            if !ReentrancyGuard::ensure_closable(&ledger.session)? {
                return Ok(false);
            }
            ReentrancyGuard::release(&mut ledger.session);
        }
        self.wake_waiters();
        Ok(true)
    }
}

/// Per-pool claimable fee balances
#[derive(Debug, Default)]
pub struct FeeLedger {
    slots: RwLock<HashMap<PoolId, Arc<PoolSlot>>>,
}

impl FeeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed balances; `(0, 0)` for a pool never touched
    ///
    /// Inside its own trade the calling thread sees the trade's effects;
    /// everyone else sees the ledger as it was before the trade.
    pub fn fees(&self, pool: &PoolId) -> ClaimableFees {
        match self.slots.read().get(pool) {
            Some(slot) => slot.visible_fees(std::thread::current().id()),
            None => ClaimableFees::ZERO,
        }
    }

    /// Slot of a pool, created empty on first use
    pub fn slot(&self, pool: &PoolId) -> Arc<PoolSlot> {
        if let Some(slot) = self.slots.read().get(pool) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(*pool).or_default())
    }

    /// Add to both balances of a pool
    ///
    /// Waits for a trade in flight on another thread to finish. Inside a
    /// trade on the calling thread the deposit is rejected.
    pub fn deposit(
        &self,
        pool: &PoolId,
        amount0: u128,
        amount1: u128,
    ) -> RecyclerResult<ClaimableFees> {
        let slot = self.slot(pool);
        let mut ledger = slot.wait_for_turn(std::thread::current().id());
        ReentrancyGuard::ensure_unlocked(&ledger.session)?;
        ledger.fees = ledger.fees.deposit(amount0, amount1)?;
        Ok(ledger.fees)
    }

    /// Number of pools with a ledger entry
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}
