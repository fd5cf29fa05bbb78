/// Reentrancy protection for trades in flight. A trade spans two hook calls
/// with the curve engine's own execution in between, so the lock is a session
/// carried in the pool ledger rather than a held mutex: it records which
/// thread owns the trade, which stage it is in, and the ledger value to restore
/// if the trade is abandoned. Nested entry from the owning thread is rejected;
/// other threads wait on the pool slot until the session is released. Once
/// the pre-trade hook hands the trade back to the curve engine, the post-trade
/// hook may arrive on any thread and takes the session over.

use std::thread::ThreadId;

use fee_recycler_core::{ClaimableFees, RecyclerError, RecyclerResult};

use crate::state::ledger::PoolSlot;

// ============================================================================
// Reentrancy Status Types
// ============================================================================

/// Stage of the trade in flight on a pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReentrancyStatus {
    /// No trade in flight
    #[default]
    Unlocked,
    /// Pre-trade hook is running
    Netting,
    /// Curve engine is executing the residual trade
    Executing,
    /// Post-trade hook is running
    Settling,
    /// Hooks are done and the recycler holds the session until the curve
    /// engine completes or aborts the trade
    Settled,
}

/// Per-pool trade session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TradeSession {
    pub status: ReentrancyStatus,
    /// Thread that opened the session
    pub owner: Option<ThreadId>,
    /// Ledger value at the start of the trade
    pub checkpoint: ClaimableFees,
}

impl TradeSession {
    pub fn is_locked(&self) -> bool {
        self.status != ReentrancyStatus::Unlocked
    }

    pub fn is_owned_by(&self, thread: ThreadId) -> bool {
        self.owner == Some(thread)
    }
}

// ============================================================================
// Reentrancy Guard Manager
// ============================================================================

/// Session state transitions
pub struct ReentrancyGuard;

impl ReentrancyGuard {
    /// Open a session for the pre-trade hook
    pub fn acquire_pre_trade(
        session: &mut TradeSession,
        fees: &ClaimableFees,
        thread: ThreadId,
    ) -> RecyclerResult<()> {
        match session.status {
            ReentrancyStatus::Unlocked => {
                *session = TradeSession {
                    status: ReentrancyStatus::Netting,
                    owner: Some(thread),
                    checkpoint: *fees,
                };
                Ok(())
            }
            _ => Err(RecyclerError::ReentrancyDetected),
        }
    }

    /// Enter the post-trade hook
    ///
    /// A trade whose pre-trade hook was not invoked opens its session here.
    /// The calling thread becomes the owner of the session.
    pub fn acquire_post_trade(
        session: &mut TradeSession,
        fees: &ClaimableFees,
        thread: ThreadId,
    ) -> RecyclerResult<()> {
        match session.status {
            ReentrancyStatus::Executing => {
                session.status = ReentrancyStatus::Settling;
                session.owner = Some(thread);
                Ok(())
            }
            ReentrancyStatus::Unlocked => {
                *session = TradeSession {
                    status: ReentrancyStatus::Settling,
                    owner: Some(thread),
                    checkpoint: *fees,
                };
                Ok(())
            }
            _ => Err(RecyclerError::ReentrancyDetected),
        }
    }

    /// Hand the trade over to the curve engine after netting
    pub fn enter_execution(session: &mut TradeSession) -> RecyclerResult<()> {
        match session.status {
            ReentrancyStatus::Netting => {
                session.status = ReentrancyStatus::Executing;
                Ok(())
            }
            _ => Err(RecyclerError::ReentrancyDetected),
        }
    }

    /// Post-trade hook finished; the trade awaits completion or abort
    pub fn finish_settlement(session: &mut TradeSession) -> RecyclerResult<()> {
        match session.status {
            ReentrancyStatus::Settling => {
                session.status = ReentrancyStatus::Settled;
                Ok(())
            }
            _ => Err(RecyclerError::ReentrancyDetected),
        }
    }

    /// Whether the curve engine may complete or abort the trade now
    ///
    /// Returns `false` when there is no trade to close.
    pub fn ensure_closable(session: &TradeSession) -> RecyclerResult<bool> {
        match session.status {
            ReentrancyStatus::Unlocked => Ok(false),
            ReentrancyStatus::Executing | ReentrancyStatus::Settled => Ok(true),
            // A hook of this very trade is still running
            ReentrancyStatus::Netting | ReentrancyStatus::Settling => {
                Err(RecyclerError::ReentrancyDetected)
            }
        }
    }

    /// Close the session
    pub fn release(session: &mut TradeSession) {
        if !session.is_locked() {
            log::warn!("releasing a pool session that is already unlocked");
        }
        *session = TradeSession::default();
    }

    /// Reject operations that must not run inside a trade
    pub fn ensure_unlocked(session: &TradeSession) -> RecyclerResult<()> {
        if session.is_locked() {
            return Err(RecyclerError::ReentrancyDetected);
        }
        Ok(())
    }
}

// ============================================================================
// Scoped Hook Guard
// ============================================================================

/// Hook stage a scoped guard protects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    BeforeSwap,
    AfterSwap,
}

/// RAII guard around one hook invocation
///
/// The pool mutex is not held while the guard lives, only the session. The
/// hook works on a copy of the ledger and hands it back through `commit`.
/// Committing the pre-trade stage hands the trade to the curve engine;
/// committing the post-trade stage closes the session unless the guard was
/// told to hold it. Dropping an uncommitted guard closes the session; in the
/// post-trade stage it also restores the checkpoint, discarding the netting of
/// the same trade.
pub struct ScopedHookGuard<'a> {
    slot: &'a PoolSlot,
    stage: HookStage,
    armed: bool,
    hold_session: bool,
}

impl<'a> ScopedHookGuard<'a> {
    /// Wait for the pool, enter `stage` and return the ledger to work on
    pub fn enter(slot: &'a PoolSlot, stage: HookStage) -> RecyclerResult<(Self, ClaimableFees)> {
        let thread = std::thread::current().id();
        let mut ledger = match stage {
            HookStage::BeforeSwap => slot.wait_for_turn(thread),
            HookStage::AfterSwap => slot.wait_for_handover(thread),
        };
        let ledger = &mut *ledger;
        match stage {
            HookStage::BeforeSwap => {
                ReentrancyGuard::acquire_pre_trade(&mut ledger.session, &ledger.fees, thread)?
            }
            HookStage::AfterSwap => {
                ReentrancyGuard::acquire_post_trade(&mut ledger.session, &ledger.fees, thread)?
            }
        }
        let fees = ledger.fees;
        Ok((
            Self {
                slot,
                stage,
                armed: true,
                hold_session: false,
            },
            fees,
        ))
    }

    /// Keep the session open past a post-trade commit, in `Settled`
    pub fn hold_session(mut self) -> Self {
        self.hold_session = true;
        self
    }

    /// Store the hook's ledger and advance the session
    pub fn commit(mut self, fees: ClaimableFees) -> RecyclerResult<()> {
        let released = {
            let mut ledger = self.slot.lock();
            let released = match self.stage {
                HookStage::BeforeSwap => {
                    ReentrancyGuard::enter_execution(&mut ledger.session)?;
                    false
                }
                HookStage::AfterSwap if self.hold_session => {
                    ReentrancyGuard::finish_settlement(&mut ledger.session)?;
                    false
                }
                HookStage::AfterSwap => {
                    ReentrancyGuard::release(&mut ledger.session);
                    true
                }
            };
            ledger.fees = fees;
            released
        };
        self.armed = false;
        if released {
            self.slot.wake_waiters();
        }
        Ok(())
    }
}

impl Drop for ScopedHookGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        {
            let mut ledger = self.slot.lock();
            if self.stage == HookStage::AfterSwap {
                ledger.fees = ledger.session.checkpoint;
            }
            ReentrancyGuard::release(&mut ledger.session);
        }
        log::debug!("{:?} hook aborted; pool session rolled back", self.stage);
        self.slot.wake_waiters();
    }
}

// ============================================================================
// Tests
// ============================================================================
