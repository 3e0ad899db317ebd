//! Data model and the two stores built on it
//!
//! - `types`: hotels, reviews, attractions, and raw interchange records
//! - `partial`: per-task staging, no locking
//! - `aggregate`: the shared store behind the reentrant reader-writer lock

pub mod aggregate;
pub mod partial;
pub mod types;

pub use aggregate::{AggregateStore, MergeStats, StoreReader};
pub use partial::PartialStore;
pub use types::{
    Address, Attraction, AttractionRecord, Hotel, HotelLocation, HotelRecord, Review,
    ReviewRecord, ANONYMOUS_USERNAME, DATE_FORMAT,
};
