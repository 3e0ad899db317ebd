//! Reentrant reader-writer lock
//!
//! A permission-only lock: it guards no data of its own, it hands out RAII
//! guards that grant shared (read) or exclusive (write) access to whatever
//! the caller pairs it with. The state machine is explicit:
//! - per-thread reader hold counts, so a thread may nest read acquisitions
//! - a writer slot with owner and hold count, so a writer may nest writes
//! - a waiting-writer counter, giving writers preference over new readers
//!
//! Policy:
//! - Any number of threads may hold read access at once while no writer
//!   holds or waits.
//! - A waiting writer blocks new readers, but never a thread that already
//!   holds read access (nested reads must not self-deadlock).
//! - The writer excludes all other threads; it may deepen its own write
//!   hold and may take nested read access.
//! - Read-to-write upgrade is not supported and panics immediately.
//!
//! No timeouts; acquisition blocks indefinitely.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

/// Exclusive hold on the lock
#[derive(Debug)]
struct WriterHold {
    owner: ThreadId,
    count: usize,
}

/// Internal lock state, always accessed under the state mutex
#[derive(Debug, Default)]
struct LockState {
    /// Hold count per reader thread
    readers: HashMap<ThreadId, usize>,

    /// Current writer, if any
    writer: Option<WriterHold>,

    /// Writers blocked in acquisition
    waiting_writers: usize,
}

impl LockState {
    /// Whether `thread` may take read access right now
    fn can_grant_read(&self, thread: ThreadId) -> bool {
        if let Some(writer) = &self.writer {
            // Only the writer itself may read while a write hold exists
            return writer.owner == thread;
        }
        if self.readers.contains_key(&thread) {
            // Deepening an existing read hold never blocks
            return true;
        }
        self.waiting_writers == 0
    }

    /// Whether `thread` may take the writer slot right now
    fn can_grant_write(&self, thread: ThreadId) -> bool {
        match &self.writer {
            Some(writer) => writer.owner == thread,
            None => self.readers.is_empty(),
        }
    }
}

/// Reentrant reader-writer lock with writer preference
///
/// Guards are `!Send`: a hold belongs to the thread that acquired it and
/// must be released there.
#[derive(Debug, Default)]
pub struct ReentrantRwLock {
    state: Mutex<LockState>,
    cond: Condvar,
}

impl ReentrantRwLock {
    /// Create an unlocked lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire read access, blocking while a writer holds or waits
    ///
    /// Reentrant: a thread already holding read (or write) access is
    /// granted immediately, even when writers are queued.
    pub fn read(&self) -> ReadGuard<'_> {
        let me = thread::current().id();
        let mut state = self.state.lock();

        while !state.can_grant_read(me) {
            self.cond.wait(&mut state);
        }
        *state.readers.entry(me).or_insert(0) += 1;

        ReadGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Acquire write access, blocking until all readers and any other
    /// writer have released
    ///
    /// Reentrant for a thread that already holds write access.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread holds read access without write
    /// access: upgrading is not supported and waiting would deadlock on
    /// the caller's own read hold.
    pub fn write(&self) -> WriteGuard<'_> {
        let me = thread::current().id();
        let mut state = self.state.lock();

        if let Some(writer) = state.writer.as_mut() {
            if writer.owner == me {
                writer.count += 1;
                return WriteGuard {
                    lock: self,
                    _not_send: PhantomData,
                };
            }
        }

        if state.readers.contains_key(&me) {
            panic!(
                "read-to-write upgrade is not supported: \
                 release read access before requesting write access"
            );
        }

        state.waiting_writers += 1;
        while !state.can_grant_write(me) {
            self.cond.wait(&mut state);
        }
        state.waiting_writers -= 1;
        state.writer = Some(WriterHold {
            owner: me,
            count: 1,
        });

        WriteGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    /// Number of distinct threads currently holding read access
    pub fn reader_count(&self) -> usize {
        self.state.lock().readers.len()
    }

    /// Whether any thread currently holds write access
    pub fn is_write_locked(&self) -> bool {
        self.state.lock().writer.is_some()
    }

    /// Number of writers blocked in acquisition
    pub fn waiting_writers(&self) -> usize {
        self.state.lock().waiting_writers
    }

    fn release_read(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();

        let count = match state.readers.get_mut(&me) {
            Some(count) => count,
            None => panic!("read access released by a thread that does not hold it"),
        };
        *count -= 1;
        if *count == 0 {
            state.readers.remove(&me);
            if state.readers.is_empty() {
                self.cond.notify_all();
            }
        }
    }

    fn release_write(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();

        match state.writer.as_mut() {
            Some(writer) if writer.owner == me => {
                writer.count -= 1;
                if writer.count == 0 {
                    state.writer = None;
                    self.cond.notify_all();
                }
            }
            _ => panic!("write access released by a thread that does not hold it"),
        }
    }
}

/// RAII read hold; dropping releases one read acquisition
#[must_use = "read access is held only while the guard is alive"]
pub struct ReadGuard<'a> {
    lock: &'a ReentrantRwLock,
    // Holds are per-thread; the guard must drop on its acquiring thread
    _not_send: PhantomData<*const ()>,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// RAII write hold; dropping releases one write acquisition
#[must_use = "write access is held only while the guard is alive"]
pub struct WriteGuard<'a> {
    lock: &'a ReentrantRwLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
