//! Per-budget readers/writer locks with an acquisition timeout
//!
//! `std::sync::RwLock` cannot time out, so each budget gets a small
//! mutex + condvar lock that can. Writers are exclusive; readers share.
//! A waiting writer blocks new readers so writes are not starved.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use tracing::warn;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::BudgetId;

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writer: bool,
    waiting_writers: usize,
}

#[derive(Debug, Default)]
pub struct BudgetLock {
    state: Mutex<LockState>,
    changed: Condvar,
}

impl BudgetLock {
    fn state(&self) -> EnvelopeResult<MutexGuard<'_, LockState>> {
        self.state
            .lock()
            .map_err(|_| EnvelopeError::StoreUnavailable("budget lock poisoned".into()))
    }

    pub fn read(&self, timeout: Duration) -> EnvelopeResult<ReadGuard<'_>> {
        let state = self.state()?;
        let (mut state, result) = self
            .changed
            .wait_timeout_while(state, timeout, |s| s.writer || s.waiting_writers > 0)
            .map_err(|_| EnvelopeError::StoreUnavailable("budget lock poisoned".into()))?;
        if result.timed_out() {
            return Err(timed_out("read", timeout));
        }
        state.readers += 1;
        Ok(ReadGuard { lock: self })
    }

    pub fn write(&self, timeout: Duration) -> EnvelopeResult<WriteGuard<'_>> {
        let mut state = self.state()?;
        state.waiting_writers += 1;
        let waited = self
            .changed
            .wait_timeout_while(state, timeout, |s| s.writer || s.readers > 0);
        let (mut state, result) = match waited {
            Ok(pair) => pair,
            Err(_) => {
                return Err(EnvelopeError::StoreUnavailable(
                    "budget lock poisoned".into(),
                ))
            }
        };
        state.waiting_writers -= 1;
        if result.timed_out() {
            drop(state);
            // Readers held back by this writer may proceed
            self.changed.notify_all();
            return Err(timed_out("write", timeout));
        }
        state.writer = true;
        Ok(WriteGuard { lock: self })
    }

    fn release(&self, release: impl FnOnce(&mut LockState)) {
        // A poisoned state can only come from a panic while holding the
        // mutex; recover the data so the lock keeps working.
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        release(&mut state);
        drop(state);
        self.changed.notify_all();
    }
}

fn timed_out(kind: &str, timeout: Duration) -> EnvelopeError {
    warn!(kind, timeout_ms = timeout.as_millis() as u64, "budget lock timed out");
    EnvelopeError::StoreUnavailable(format!(
        "timed out after {}ms waiting for budget {} lock",
        timeout.as_millis(),
        kind
    ))
}

pub struct ReadGuard<'a> {
    lock: &'a BudgetLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release(|s| s.readers = s.readers.saturating_sub(1));
    }
}

pub struct WriteGuard<'a> {
    lock: &'a BudgetLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release(|s| s.writer = false);
    }
}

/// Hands out one lock per budget
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<BudgetId, Arc<BudgetLock>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, budget_id: &BudgetId) -> EnvelopeResult<Arc<BudgetLock>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| EnvelopeError::StoreUnavailable("lock registry poisoned".into()))?;
        Ok(Arc::clone(locks.entry(*budget_id).or_default()))
    }
}
