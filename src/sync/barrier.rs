//! Task completion barrier
//!
//! Counts outstanding asynchronous units of work and blocks callers until
//! the count drains to zero. The counter moves through RAII tickets:
//! creating a [`CompletionTicket`] increments on the submitting thread,
//! before the task ever reaches a worker, and dropping it decrements no
//! matter how the task ends - success, early return, panic unwind, or a
//! submission that failed and never ran.
//!
//! The barrier is reusable: after a drain to zero, new tickets make
//! [`CompletionBarrier::wait_until_finished`] block again.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Counting barrier over in-flight tasks
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    pending: Mutex<u64>,
    drained: Condvar,
}

impl CompletionBarrier {
    /// Create a barrier with nothing outstanding
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tickets currently outstanding
    pub fn pending(&self) -> u64 {
        *self.pending.lock()
    }

    /// Block until every outstanding ticket has been dropped
    ///
    /// Returns immediately when nothing is outstanding. Any number of
    /// threads may wait; all are woken on the final decrement. The
    /// predicate is re-checked in a loop, so a stale wakeup never lets a
    /// waiter through early.
    pub fn wait_until_finished(&self) {
        let mut pending = self.pending.lock();
        while *pending > 0 {
            self.drained.wait(&mut pending);
        }
    }

    fn increment(&self) {
        *self.pending.lock() += 1;
    }

    fn decrement(&self) {
        let mut pending = self.pending.lock();
        match pending.checked_sub(1) {
            Some(next) => *pending = next,
            None => panic!("completion barrier underflow: decrement without a matching increment"),
        }
        if *pending == 0 {
            self.drained.notify_all();
        }
    }
}

/// One outstanding unit of work
///
/// Created on the submitting thread before the task is handed to the
/// worker pool, moved into the task closure, and dropped when the task
/// body finishes.
#[must_use = "dropping the ticket is what marks the task finished"]
#[derive(Debug)]
pub struct CompletionTicket {
    barrier: Arc<CompletionBarrier>,
}

impl CompletionTicket {
    /// Register one unit of work with the barrier
    pub fn new(barrier: Arc<CompletionBarrier>) -> Self {
        barrier.increment();
        Self { barrier }
    }
}

impl Drop for CompletionTicket {
    fn drop(&mut self) {
        self.barrier.decrement();
    }
}
