//! Error types for hotel-indexer
//!
//! This module defines the error hierarchy that covers:
//! - Record validation errors (bad ratings, malformed dates)
//! - File parse errors (hotel bulk load, review files)
//! - Attraction fetch errors (transport, status, decode)
//! - Work queue and configuration errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include the offending value or path
//! - Per-task failures stay inside their task; nothing here terminates
//!   a worker thread

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the hotel-indexer application
#[derive(Error, Debug)]
pub enum IndexerError {
    /// Record validation errors
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// File parse errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Attraction fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Work queue errors
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors (directory traversal, report output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors for individual records
///
/// A record error rejects one review and leaves every store untouched;
/// the enclosing batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Review rating outside the accepted range
    #[error("Invalid rating {rating}: must be between 1 and 5")]
    RatingOutOfRange { rating: i64 },

    /// Review date does not match the fixed calendar format
    #[error("Invalid date '{date}': expected yyyy-mm-dd")]
    InvalidDate { date: String },
}

/// File-level parse errors
///
/// A parse error aborts the task for that one file; no partial data from
/// the file is merged.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Failed to read the file from disk
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON or does not match the expected shape
    #[error("Failed to decode '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Attraction fetch errors
///
/// Isolated to the one hotel whose fetch failed; there is no retry.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("Attraction request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Attraction endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// Response body could not be decoded
    #[error("Failed to decode attraction response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Work queue errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Task submitted after shutdown was requested
    #[error("Work queue is shut down: no new tasks accepted")]
    ShutDown,

    /// Worker channel closed while the queue was still accepting work
    #[error("Worker channel closed unexpectedly")]
    Disconnected,

    /// Worker thread failed to start
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker loop itself panicked (task panics are contained and counted)
    #[error("Worker {id} panicked")]
    WorkerPanicked { id: usize },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid search radius
    #[error("Invalid radius {miles}: must be between 1 and {max} miles")]
    InvalidRadius { miles: u32, max: u32 },

    /// Hotel bulk-load file is missing
    #[error("Hotels file '{path}' does not exist")]
    HotelsFileNotFound { path: PathBuf },

    /// Review root directory is missing or not a directory
    #[error("Reviews directory '{path}' does not exist or is not a directory")]
    ReviewsDirNotFound { path: PathBuf },

    /// Report output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// Result type alias for IndexerError
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Result type alias for RecordError
pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Result type alias for ParseError
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type alias for FetchError
pub type FetchResult<T> = std::result::Result<T, FetchError>;
