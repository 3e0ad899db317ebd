//! hotel-indexer - Concurrent Hotel Data Aggregation
//!
//! Loads a bulk hotel file, parses per-hotel review files across a worker
//! pool, optionally fetches nearby attractions over HTTPS, and renders the
//! result as two text reports.
//!
//! # Features
//!
//! - **Reentrant Read/Write Locking**: The shared store sits behind a
//!   reader-writer lock that a thread may re-acquire while already holding
//!   access, with writer preference under contention.
//!
//! - **Two-Phase Merges**: Worker tasks parse into private partial stores
//!   with no locking, then publish each batch under one write acquisition,
//!   so readers never see a half-applied file.
//!
//! - **Deterministic Completion**: A completion barrier counts every task
//!   from submission to finish; waiting on it is the only synchronization
//!   the reporting phase needs.
//!
//! - **Isolated Failures**: A malformed file, a rejected record, or a
//!   failed fetch costs exactly its own task.
//!
//! # Architecture
//!
//! ```text
//!  hotels.json ──────────────► AggregateStore (bulk load, synchronous)
//!                                   ▲
//!  reviews/**  ──► WorkQueue ──► PartialStore ──merge──┘
//!  places API ──►  (N workers)    (per task)
//!                      │
//!                      ▼
//!              CompletionBarrier ──wait──► report::{hotel,attraction}
//! ```
//!
//! # Example
//!
//! ```bash
//! # Reviews only
//! hotel-indexer hotels.json reviews/
//!
//! # With attraction lookup, eight workers
//! hotel-indexer hotels.json reviews/ -w 8 --api-key $PLACES_KEY --radius 3
//! ```

pub mod config;
pub mod error;
pub mod ingest;
pub mod report;
pub mod store;
pub mod sync;

pub use config::{BuildConfig, CliArgs};
pub use error::{IndexerError, Result};
pub use ingest::{AttractionSource, IndexBuilder, PlacesClient};
pub use store::{AggregateStore, PartialStore};
pub use sync::{CompletionBarrier, CompletionTicket, ReentrantRwLock, WorkQueue};
