//! Fixed-size worker pool over an unbounded FIFO task queue
//!
//! Tasks are boxed closures pushed onto an unbounded channel and consumed
//! by a fixed set of named worker threads. Submission order is FIFO, but
//! with more than one worker that says nothing about completion order.
//!
//! Shutdown is a graceful drain: the queue stops accepting submissions,
//! every queued and running task finishes, then the workers are joined.
//! A panicking task is caught, counted, and logged; the worker carries on
//! with the next task.

use crate::error::QueueError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// A unit of work for the pool
type Job = Box<dyn FnOnce() + Send + 'static>;

/// Counters maintained by the pool
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Tasks accepted by execute()
    pub submitted: AtomicU64,

    /// Tasks that ran to completion
    pub completed: AtomicU64,

    /// Tasks that panicked inside a worker
    pub panicked: AtomicU64,
}

impl QueueStats {
    /// Tasks accepted so far
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Tasks finished without panicking
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Tasks that panicked
    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }
}

/// Fixed-size worker pool
///
/// `shutdown` must not be called from inside a task: the drain joins the
/// worker threads, and a worker cannot join itself.
pub struct WorkQueue {
    /// Present while the queue accepts submissions; taken on shutdown so
    /// the channel closes once drained
    sender: Mutex<Option<Sender<Job>>>,

    /// Worker threads, taken on shutdown for joining
    workers: Mutex<Vec<Worker>>,

    /// Pool size fixed at construction
    pool_size: usize,

    /// Shared counters
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// Spawn a pool with `pool_size` worker threads
    pub fn new(pool_size: usize) -> Result<Self, QueueError> {
        let (sender, receiver) = unbounded::<Job>();
        let stats = Arc::new(QueueStats::default());

        let mut workers = Vec::with_capacity(pool_size);
        for id in 0..pool_size {
            workers.push(Worker::spawn(id, receiver.clone(), Arc::clone(&stats))?);
        }

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            pool_size,
            stats,
        })
    }

    /// Enqueue a task for execution on some worker thread
    ///
    /// The queue is unbounded, so this never blocks. Fails with
    /// [`QueueError::ShutDown`] once `shutdown` has been requested.
    pub fn execute<F>(&self, task: F) -> Result<(), QueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(tx) => {
                tx.send(Box::new(task))
                    .map_err(|_| QueueError::Disconnected)?;
                self.stats.submitted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            None => Err(QueueError::ShutDown),
        }
    }

    /// Stop accepting tasks, drain every queued and running task, then
    /// join the workers
    ///
    /// Idempotent: later calls return immediately.
    pub fn shutdown(&self) {
        let sender = self.sender.lock().take();
        if sender.is_none() {
            return;
        }
        // Dropping the sender closes the channel; workers exit after the
        // backlog drains
        drop(sender);

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(e) = worker.join() {
                warn!(error = %e, "Worker exited abnormally");
            }
        }
    }

    /// Pool size fixed at construction
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Shared counters
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One worker thread of the pool
struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a named worker thread consuming from `receiver`
    fn spawn(
        id: usize,
        receiver: Receiver<Job>,
        stats: Arc<QueueStats>,
    ) -> Result<Self, QueueError> {
        let handle = thread::Builder::new()
            .name(format!("agg-worker-{}", id))
            .spawn(move || worker_loop(id, receiver, stats))
            .map_err(|e| QueueError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Wait for the worker to finish
    fn join(mut self) -> Result<(), QueueError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| QueueError::WorkerPanicked { id: self.id }),
            None => Ok(()),
        }
    }
}

/// Main worker loop: run tasks until the channel closes and drains
fn worker_loop(id: usize, receiver: Receiver<Job>, stats: Arc<QueueStats>) {
    debug!(worker = id, "Worker starting");

    while let Ok(job) = receiver.recv() {
        match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(()) => {
                stats.completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                stats.panicked.fetch_add(1, Ordering::Relaxed);
                warn!(worker = id, "Task panicked; worker continues");
            }
        }
    }

    debug!(worker = id, "Worker exiting");
}
