//! Input side of the pipeline
//!
//! - `parse`: JSON decoding for the hotel file and review files
//! - `fetch`: the places client and the [`fetch::AttractionSource`] seam
//! - `builder`: fan-out orchestration over the queue and barrier

pub mod builder;
pub mod fetch;
pub mod parse;

pub use builder::IndexBuilder;
pub use fetch::{AttractionSource, PlacesClient};
