//! Shared aggregate store
//!
//! One instance holds the canonical hotel, review, and attraction maps for
//! the whole run. All access goes through a reentrant reader-writer lock:
//! any number of concurrent readers, one writer at a time, and a thread
//! already holding access may re-acquire it.
//!
//! Merges are atomic. A task's whole [`PartialStore`] lands under a single
//! write acquisition, so readers never observe a half-applied batch. A
//! merged review or attraction bucket replaces whatever bucket the hotel
//! had before.

use crate::store::partial::PartialStore;
use crate::store::types::{Attraction, Hotel, HotelLocation, HotelRecord, Review};
use crate::sync::{ReadGuard, ReentrantRwLock};
use std::cell::UnsafeCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::debug;

#[derive(Debug, Default)]
struct StoreInner {
    hotels: HashMap<String, Hotel>,
    reviews: HashMap<String, BTreeSet<Review>>,
    attractions: HashMap<String, BTreeMap<String, Attraction>>,
}

/// Counts reported by one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Review buckets installed
    pub review_buckets: usize,
    /// Attraction buckets installed
    pub attraction_buckets: usize,
    /// Buckets discarded because their hotel id is unknown
    pub dropped_buckets: usize,
}

/// Thread-safe store of hotels, their reviews, and nearby attractions
///
/// The lock grants permission; the data lives in the cell. Write methods
/// are self-contained: none of them calls another store method while the
/// exclusive borrow is live, which is what keeps the reentrant lock's
/// nested-acquisition allowance sound. Requesting write access on a thread
/// that holds only read access panics rather than deadlocking.
pub struct AggregateStore {
    lock: ReentrantRwLock,
    inner: UnsafeCell<StoreInner>,
}

// Safety: every access to `inner` happens under `lock`, which grants either
// shared or exclusive permission and never both across threads.
unsafe impl Sync for AggregateStore {}

impl Default for AggregateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateStore {
    pub fn new() -> Self {
        Self {
            lock: ReentrantRwLock::new(),
            inner: UnsafeCell::new(StoreInner::default()),
        }
    }

    /// Insert one hotel, replacing any previous hotel with the same id
    pub fn add_hotel(&self, record: HotelRecord) {
        let _guard = self.lock.write();
        // Exclusive access: the write guard is held for the lifetime of this borrow.
        let inner = unsafe { &mut *self.inner.get() };
        let hotel = Hotel::from(record);
        inner.hotels.insert(hotel.id.clone(), hotel);
    }

    /// Merge one task's staged output under a single write acquisition
    ///
    /// Review and attraction buckets for known hotels replace the existing
    /// bucket wholesale. Buckets keyed by a hotel id the store has never
    /// seen are discarded. Hotels staged in the partial are ignored; the
    /// bulk load is the only source of hotels.
    pub fn merge(&self, partial: PartialStore) -> MergeStats {
        let mut stats = MergeStats::default();
        let (_, reviews, attractions) = partial.into_parts();

        let _guard = self.lock.write();
        // Exclusive access: the write guard is held for the lifetime of this borrow.
        let inner = unsafe { &mut *self.inner.get() };

        for (hotel_id, bucket) in reviews {
            if inner.hotels.contains_key(&hotel_id) {
                inner.reviews.insert(hotel_id, bucket);
                stats.review_buckets += 1;
            } else {
                debug!(hotel_id = %hotel_id, "dropping review bucket for unknown hotel");
                stats.dropped_buckets += 1;
            }
        }

        for (hotel_id, bucket) in attractions {
            if inner.hotels.contains_key(&hotel_id) {
                inner.attractions.insert(hotel_id, bucket);
                stats.attraction_buckets += 1;
            } else {
                debug!(hotel_id = %hotel_id, "dropping attraction bucket for unknown hotel");
                stats.dropped_buckets += 1;
            }
        }

        stats
    }

    /// Open a read session
    ///
    /// The returned reader holds shared access until dropped; references it
    /// hands out stay valid for exactly that long. Calling a write method
    /// on this thread while a session is open panics.
    pub fn read(&self) -> StoreReader<'_> {
        let guard = self.lock.read();
        // Shared access: the read guard is held for the lifetime of this borrow.
        let inner = unsafe { &*self.inner.get() };
        StoreReader {
            _guard: guard,
            inner,
        }
    }

    /// Sorted ids of every hotel in the store
    pub fn hotel_ids(&self) -> Vec<String> {
        self.read().hotel_ids()
    }

    /// City and coordinates for every hotel, in hotel-id order
    pub fn locations(&self) -> Vec<HotelLocation> {
        let reader = self.read();
        // Re-acquires read access on this thread; reads are reentrant.
        let ids = self.hotel_ids();
        ids.into_iter()
            .filter_map(|id| {
                reader.hotel(&id).map(|hotel| HotelLocation {
                    hotel_id: hotel.id.clone(),
                    city: hotel.address.city.clone(),
                    latitude: hotel.address.latitude,
                    longitude: hotel.address.longitude,
                })
            })
            .collect()
    }
}

impl fmt::Debug for AggregateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reader = self.read();
        f.debug_struct("AggregateStore")
            .field("hotels", &reader.hotel_count())
            .field("reviews", &reader.review_count())
            .field("attractions", &reader.attraction_count())
            .finish()
    }
}

/// Shared read session over the store
///
/// Holds read access for its whole lifetime. Not sendable across threads;
/// the borrow it wraps is tied to the acquiring thread's lock hold.
#[must_use = "a read session holds shared access until dropped"]
pub struct StoreReader<'a> {
    _guard: ReadGuard<'a>,
    inner: &'a StoreInner,
}

impl StoreReader<'_> {
    pub fn hotel(&self, id: &str) -> Option<&Hotel> {
        self.inner.hotels.get(id)
    }

    /// Sorted ids of every hotel in the store
    pub fn hotel_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.hotels.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Reviews for one hotel, ordered by (date, username)
    pub fn reviews(&self, hotel_id: &str) -> Option<&BTreeSet<Review>> {
        self.inner.reviews.get(hotel_id)
    }

    /// Attractions for one hotel, keyed and ordered by attraction id
    pub fn attractions(&self, hotel_id: &str) -> Option<&BTreeMap<String, Attraction>> {
        self.inner.attractions.get(hotel_id)
    }

    pub fn hotel_count(&self) -> usize {
        self.inner.hotels.len()
    }

    pub fn review_count(&self) -> usize {
        self.inner.reviews.values().map(BTreeSet::len).sum()
    }

    pub fn attraction_count(&self) -> usize {
        self.inner.attractions.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::ReviewRecord;
    use std::sync::Arc;
    use std::thread;

    fn hotel_record(id: &str, city: &str) -> HotelRecord {
        HotelRecord {
            id: id.into(),
            name: format!("Hotel {id}"),
            city: city.into(),
            state: "CA".into(),
            street: "1 Main St".into(),
            latitude: 37.77,
            longitude: -122.42,
        }
    }

    fn review_record(hotel_id: &str, date: &str, username: &str) -> ReviewRecord {
        ReviewRecord {
            hotel_id: hotel_id.into(),
            review_id: "r1".into(),
            rating: 4,
            title: "Title".into(),
            text: "Text".into(),
            recommended: true,
            date: date.into(),
            username: username.into(),
        }
    }

    #[test]
    fn test_add_hotel_and_read_back() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Oakland"));

        let reader = store.read();
        assert_eq!(reader.hotel_count(), 1);
        assert_eq!(reader.hotel("h1").unwrap().address.city, "Oakland");
        assert!(reader.hotel("h2").is_none());
    }

    #[test]
    fn test_add_hotel_replaces_same_id() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Oakland"));
        store.add_hotel(hotel_record("h1", "Berkeley"));

        let reader = store.read();
        assert_eq!(reader.hotel_count(), 1);
        assert_eq!(reader.hotel("h1").unwrap().address.city, "Berkeley");
    }

    #[test]
    fn test_merge_replaces_existing_bucket() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Oakland"));

        let mut first = PartialStore::new();
        first
            .add_review(review_record("h1", "2016-06-01", "alice"))
            .unwrap();
        first
            .add_review(review_record("h1", "2016-06-02", "bob"))
            .unwrap();
        store.merge(first);

        let mut second = PartialStore::new();
        second
            .add_review(review_record("h1", "2016-07-01", "carol"))
            .unwrap();
        store.merge(second);

        let reader = store.read();
        let bucket = reader.reviews("h1").unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket.iter().next().unwrap().username, "carol");
    }

    #[test]
    fn test_merge_drops_unknown_hotel_buckets() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Oakland"));

        // The partial stages a hotel of its own; staged hotels never merge,
        // so its buckets are still dropped as unknown.
        let mut partial = PartialStore::new();
        partial.add_hotel(hotel_record("ghost", "Nowhere"));
        partial
            .add_review(review_record("ghost", "2016-06-01", "alice"))
            .unwrap();
        partial
            .add_review(review_record("h1", "2016-06-02", "bob"))
            .unwrap();

        let stats = store.merge(partial);
        assert_eq!(stats.review_buckets, 1);
        assert_eq!(stats.dropped_buckets, 1);

        let reader = store.read();
        assert_eq!(reader.hotel_count(), 1);
        assert!(reader.hotel("ghost").is_none());
        assert!(reader.reviews("ghost").is_none());
        assert_eq!(reader.reviews("h1").unwrap().len(), 1);
    }

    #[test]
    fn test_merge_stats_count_both_kinds() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Oakland"));

        let mut partial = PartialStore::new();
        partial
            .add_review(review_record("h1", "2016-06-01", "alice"))
            .unwrap();
        partial.add_attraction(
            "h1",
            Attraction {
                id: "a1".into(),
                name: "Museum".into(),
                address: "2 Side St".into(),
                rating: 4.5,
            },
        );
        partial.add_attraction(
            "h9",
            Attraction {
                id: "a2".into(),
                name: "Pier".into(),
                address: "3 Bay St".into(),
                rating: 4.0,
            },
        );

        let stats = store.merge(partial);
        assert_eq!(
            stats,
            MergeStats {
                review_buckets: 1,
                attraction_buckets: 1,
                dropped_buckets: 1,
            }
        );
        assert_eq!(store.read().attractions("h1").unwrap().len(), 1);
    }

    #[test]
    fn test_locations_in_id_order() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h2", "Berkeley"));
        store.add_hotel(hotel_record("h1", "Oakland"));

        let locations = store.locations();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].hotel_id, "h1");
        assert_eq!(locations[0].city, "Oakland");
        assert_eq!(locations[1].hotel_id, "h2");
    }

    #[test]
    fn test_concurrent_merges_keep_buckets_atomic() {
        let store = Arc::new(AggregateStore::new());
        store.add_hotel(hotel_record("h1", "Oakland"));

        let mut handles = Vec::new();
        for batch in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for round in 0..25 {
                    let mut partial = PartialStore::new();
                    for i in 0..5 {
                        let date = format!("2016-06-{:02}", i + 1);
                        let user = format!("b{batch}-r{round}-u{i}");
                        partial.add_review(review_record("h1", &date, &user)).unwrap();
                    }
                    store.merge(partial);
                }
            }));
        }

        // Readers interleave with the merges and must only ever observe a
        // whole batch: five reviews, all tagged by the same merge.
        let observer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let reader = store.read();
                    if let Some(bucket) = reader.reviews("h1") {
                        assert_eq!(bucket.len(), 5);
                        let tags: Vec<String> = bucket
                            .iter()
                            .map(|r| {
                                let (tag, _) = r.username.rsplit_once("-u").unwrap();
                                tag.to_string()
                            })
                            .collect();
                        assert!(
                            tags.windows(2).all(|w| w[0] == w[1]),
                            "observed a torn merge: {tags:?}"
                        );
                    }
                }
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        observer.join().unwrap();

        assert_eq!(store.read().reviews("h1").unwrap().len(), 5);
    }

    #[test]
    #[should_panic(expected = "upgrade")]
    fn test_write_during_read_session_panics() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Oakland"));

        let _reader = store.read();
        store.add_hotel(hotel_record("h2", "Berkeley"));
    }
}
