//! Build orchestration: fan work out, merge results, wait for the drain
//!
//! The builder owns the fan-out pattern the whole pipeline runs on. Hotels
//! load synchronously up front. Review files and attraction fetches become
//! queue tasks, one per file or hotel; each task parses into a private
//! [`PartialStore`] and merges it into the shared store in one atomic step.
//! A completion ticket is taken out before every hand-off, so
//! [`IndexBuilder::wait_until_finished`] observes submitted-but-unstarted
//! tasks too.
//!
//! Task failures stay inside the task: a file that does not parse or a
//! fetch that comes back broken is logged and its task merges nothing.

use crate::error::Result;
use crate::ingest::fetch::AttractionSource;
use crate::ingest::parse;
use crate::store::types::{Attraction, HotelLocation};
use crate::store::{AggregateStore, PartialStore};
use crate::sync::{CompletionBarrier, CompletionTicket, WorkQueue};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Coordinates the load phases against one store and one queue
pub struct IndexBuilder {
    store: Arc<AggregateStore>,
    queue: Arc<WorkQueue>,
    barrier: Arc<CompletionBarrier>,
    source: Arc<dyn AttractionSource>,
}

impl IndexBuilder {
    pub fn new(
        store: Arc<AggregateStore>,
        queue: Arc<WorkQueue>,
        source: Arc<dyn AttractionSource>,
    ) -> Self {
        Self {
            store,
            queue,
            barrier: Arc::new(CompletionBarrier::new()),
            source,
        }
    }

    /// Load the bulk hotel file on the calling thread
    ///
    /// Hotels are the reference set every later merge reconciles against,
    /// so a file that does not load fails the build rather than one task.
    pub fn load_hotels(&self, path: &Path) -> Result<usize> {
        let records = parse::hotel_file(path)?;
        let count = records.len();
        for record in records {
            self.store.add_hotel(record);
        }
        info!(hotels = count, path = %path.display(), "loaded hotel file");
        Ok(count)
    }

    /// Walk the review directory recursively, submitting one task per file
    ///
    /// Returns the number of tasks submitted. Every regular file is
    /// submitted; files that turn out not to hold reviews fail their own
    /// task and nothing else.
    pub fn load_reviews(&self, dir: &Path) -> Result<usize> {
        let mut submitted = 0;
        self.walk_directory(dir, &mut submitted)?;
        info!(files = submitted, dir = %dir.display(), "submitted review files");
        Ok(submitted)
    }

    /// Submit one attraction fetch per hotel currently in the store
    ///
    /// Returns the number of fetch tasks submitted.
    pub fn fetch_attractions(&self, radius_miles: u32) -> Result<usize> {
        let locations = self.store.locations();
        let count = locations.len();
        for location in locations {
            let store = Arc::clone(&self.store);
            let source = Arc::clone(&self.source);
            self.submit(move || run_fetch_task(&store, source.as_ref(), &location, radius_miles))?;
        }
        info!(fetches = count, radius_miles, "submitted attraction fetches");
        Ok(count)
    }

    /// Block until every submitted task has finished
    pub fn wait_until_finished(&self) {
        self.barrier.wait_until_finished();
    }

    /// Tasks submitted but not yet finished
    pub fn pending_tasks(&self) -> u64 {
        self.barrier.pending()
    }

    /// Wait for outstanding tasks, then stop the queue's workers
    ///
    /// Must not be called from a worker thread.
    pub fn shutdown(&self) {
        self.wait_until_finished();
        self.queue.shutdown();
    }

    fn walk_directory(&self, dir: &Path, submitted: &mut usize) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.walk_directory(&path, submitted)?;
            } else {
                let store = Arc::clone(&self.store);
                self.submit(move || run_review_task(&store, &path))?;
                *submitted += 1;
            }
        }
        Ok(())
    }

    /// Hand one task to the queue under a completion ticket
    ///
    /// The ticket is taken before the hand-off; if the hand-off fails the
    /// dropped closure releases it, keeping the barrier balanced.
    fn submit<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let ticket = CompletionTicket::new(Arc::clone(&self.barrier));
        self.queue.execute(move || {
            let _ticket = ticket;
            task();
        })?;
        Ok(())
    }
}

/// Parse one review file and merge its records
///
/// Runs on a worker. A file that does not parse is logged and skipped;
/// individual records that fail validation are logged and the rest of the
/// file still merges.
fn run_review_task(store: &AggregateStore, path: &Path) {
    let records = match parse::review_file(path) {
        Ok(records) => records,
        Err(error) => {
            warn!(path = %path.display(), error = %error, "skipping review file");
            return;
        }
    };

    let mut partial = PartialStore::new();
    for record in records {
        if let Err(error) = partial.add_review(record) {
            warn!(path = %path.display(), error = %error, "rejecting review record");
        }
    }

    if partial.is_empty() {
        return;
    }
    let stats = store.merge(partial);
    debug!(
        path = %path.display(),
        review_buckets = stats.review_buckets,
        dropped_buckets = stats.dropped_buckets,
        "merged review file"
    );
}

/// Fetch attractions for one hotel and merge them
///
/// Runs on a worker. A failed fetch is logged and merges nothing.
fn run_fetch_task(
    store: &AggregateStore,
    source: &dyn AttractionSource,
    location: &HotelLocation,
    radius_miles: u32,
) {
    let records = match source.fetch(location, radius_miles) {
        Ok(records) => records,
        Err(error) => {
            warn!(hotel_id = %location.hotel_id, error = %error, "attraction fetch failed");
            return;
        }
    };

    let mut partial = PartialStore::new();
    for record in records {
        partial.add_attraction(&location.hotel_id, Attraction::from(record));
    }

    if partial.is_empty() {
        return;
    }
    let stats = store.merge(partial);
    debug!(
        hotel_id = %location.hotel_id,
        attraction_buckets = stats.attraction_buckets,
        "merged attraction fetch"
    );
}
