//! Core data types: hotels, reviews, attractions, and the interchange
//! records produced by the parsers and the attraction fetcher
//!
//! Reviews carry the only validation in the model: the rating must land
//! in [1,5] and the date must match the fixed calendar format. Both are
//! checked when a record is turned into a [`Review`].

use crate::error::{RecordError, RecordResult};
use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Ordering;

/// Username stored when the source omits or blanks the reviewer name
pub const ANONYMOUS_USERNAME: &str = "anonymous";

/// The one accepted review date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Street-level hotel address with coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A hotel, keyed by id, created once during the bulk load
#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub address: Address,
}

impl From<HotelRecord> for Hotel {
    fn from(record: HotelRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            address: Address {
                street: record.street,
                city: record.city,
                state: record.state,
                latitude: record.latitude,
                longitude: record.longitude,
            },
        }
    }
}

/// One guest review of a hotel
///
/// Reviews order by (date, username); two reviews with the same date and
/// username are the same element in a review set, and the first insertion
/// wins.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: String,
    pub hotel_id: String,
    pub rating: u8,
    pub title: String,
    pub text: String,
    pub username: String,
    pub recommended: bool,
    pub date: NaiveDate,
}

impl Review {
    /// Validate a raw record into a review
    ///
    /// The rating is checked first, then the date; either failure leaves
    /// nothing behind for the caller to store.
    pub fn from_record(record: ReviewRecord) -> RecordResult<Self> {
        if !(1..=5).contains(&record.rating) {
            return Err(RecordError::RatingOutOfRange {
                rating: record.rating,
            });
        }

        let date = NaiveDate::parse_from_str(&record.date, DATE_FORMAT).map_err(|_| {
            RecordError::InvalidDate {
                date: record.date.clone(),
            }
        })?;

        Ok(Self {
            id: record.review_id,
            hotel_id: record.hotel_id,
            rating: record.rating as u8,
            title: record.title,
            text: record.text,
            username: record.username,
            recommended: record.recommended,
            date,
        })
    }
}

impl Ord for Review {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.username.cmp(&other.username))
    }
}

impl PartialOrd for Review {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Review {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Review {}

/// A point of interest near a hotel
#[derive(Debug, Clone, PartialEq)]
pub struct Attraction {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rating: f64,
}

impl From<AttractionRecord> for Attraction {
    fn from(record: AttractionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            address: record.address,
            rating: record.rating,
        }
    }
}

/// Raw hotel record from the bulk-load file
#[derive(Debug, Clone, PartialEq)]
pub struct HotelRecord {
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub street: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Raw review record from a review file, not yet validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub hotel_id: String,
    pub review_id: String,
    pub rating: i64,
    pub title: String,
    pub text: String,
    pub recommended: bool,
    pub date: String,
    pub username: String,
}

/// Raw attraction record, decoded straight off the places response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttractionRecord {
    pub id: String,

    pub name: String,

    /// The endpoint calls this `formatted_address`; absent means empty
    #[serde(rename = "formatted_address", default)]
    pub address: String,

    /// Defaults to 0 when the source omits it
    #[serde(default)]
    pub rating: f64,
}

/// The slice of a hotel the attraction fetch needs for query derivation
#[derive(Debug, Clone, PartialEq)]
pub struct HotelLocation {
    pub hotel_id: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}
