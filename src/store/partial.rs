//! Task-local staging store
//!
//! Each worker task accumulates its parse output here without touching a
//! lock, then hands the whole thing to the aggregate store in one merge.

use crate::error::RecordResult;
use crate::store::types::{Attraction, Hotel, HotelRecord, Review, ReviewRecord};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Unshared accumulation of one task's output
///
/// Buckets are keyed by hotel id. Nothing here validates hotel ids against
/// the aggregate store; that reconciliation happens at merge time.
#[derive(Debug, Default)]
pub struct PartialStore {
    hotels: HashMap<String, Hotel>,
    reviews: HashMap<String, BTreeSet<Review>>,
    attractions: HashMap<String, BTreeMap<String, Attraction>>,
}

impl PartialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a hotel keyed by its id
    pub fn add_hotel(&mut self, record: HotelRecord) {
        let hotel = Hotel::from(record);
        self.hotels.insert(hotel.id.clone(), hotel);
    }

    /// Validate and stage one review under its hotel's bucket
    ///
    /// A record failing validation is rejected whole; the store is left
    /// unchanged. Duplicate (date, username) pairs keep the first insertion.
    pub fn add_review(&mut self, record: ReviewRecord) -> RecordResult<()> {
        let review = Review::from_record(record)?;
        self.reviews
            .entry(review.hotel_id.clone())
            .or_default()
            .insert(review);
        Ok(())
    }

    /// Stage one attraction under the given hotel's bucket, keyed by
    /// attraction id
    ///
    /// Ids are unique per hotel; a repeated id replaces the earlier entry.
    pub fn add_attraction(&mut self, hotel_id: &str, attraction: Attraction) {
        self.attractions
            .entry(hotel_id.to_string())
            .or_default()
            .insert(attraction.id.clone(), attraction);
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty() && self.reviews.is_empty() && self.attractions.is_empty()
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn into_parts(
        self,
    ) -> (
        HashMap<String, Hotel>,
        HashMap<String, BTreeSet<Review>>,
        HashMap<String, BTreeMap<String, Attraction>>,
    ) {
        (self.hotels, self.reviews, self.attractions)
    }
}
