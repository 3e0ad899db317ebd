//! Concurrency primitives: reentrant reader-writer lock, fixed-size
//! worker pool, and task completion barrier
//!
//! These three pieces carry all of the crate's concurrency: the lock
//! guards the shared store, the pool runs parse/fetch tasks, and the
//! barrier lets the controlling thread block until every outstanding
//! task has merged.

pub mod barrier;
pub mod queue;
pub mod rwlock;

pub use barrier::{CompletionBarrier, CompletionTicket};
pub use queue::{QueueStats, WorkQueue};
pub use rwlock::{ReadGuard, ReentrantRwLock, WriteGuard};
