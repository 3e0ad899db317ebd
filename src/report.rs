//! Text report rendering
//!
//! Two reports, both iterating hotels in id order under a single read
//! session: the hotel report (every hotel with its reviews in date order)
//! and the attraction report. Formats are fixed; the tests pin them byte
//! for byte.

use crate::error::Result;
use crate::store::AggregateStore;
use std::fs;
use std::path::Path;
use tracing::info;

const HOTEL_SEPARATOR: &str = "********************";
const REVIEW_SEPARATOR: &str = "--------------------";
const ATTRACTION_SEPARATOR: &str = "++++++++++++++++++++";

/// Render every hotel with its reviews, hotels in id order
pub fn hotel_report(store: &AggregateStore) -> String {
    let reader = store.read();
    let mut out = String::new();

    for id in reader.hotel_ids() {
        let Some(hotel) = reader.hotel(&id) else {
            continue;
        };
        out.push_str(&format!("\n{HOTEL_SEPARATOR}\n"));
        out.push_str(&format!("{}: {}\n", hotel.name, hotel.id));
        out.push_str(&format!("{}\n", hotel.address.street));
        out.push_str(&format!("{}, {}\n", hotel.address.city, hotel.address.state));

        if let Some(reviews) = reader.reviews(&id) {
            for review in reviews {
                out.push_str(&format!("{REVIEW_SEPARATOR}\n"));
                out.push_str(&format!("Review by {}: {}\n", review.username, review.rating));
                out.push_str(&format!("{}\n", review.title));
                out.push_str(&format!("{}\n", review.text));
            }
        }
    }

    out
}

/// Render the attractions near every hotel, hotels in id order
///
/// Hotels with no attraction bucket still get their header and separator.
pub fn attraction_report(store: &AggregateStore) -> String {
    let reader = store.read();
    let mut out = String::new();

    for id in reader.hotel_ids() {
        let Some(hotel) = reader.hotel(&id) else {
            continue;
        };
        out.push_str(&format!("Attractions near {}, {}\n", hotel.name, hotel.id));

        if let Some(attractions) = reader.attractions(&id) {
            for attraction in attractions.values() {
                out.push_str(&format!("{}; {}\n", attraction.name, attraction.address));
            }
        }

        out.push_str(&format!("{ATTRACTION_SEPARATOR}\n"));
    }

    out
}

/// Render the hotel report and write it to `path`
pub fn write_hotel_report(store: &AggregateStore, path: &Path) -> Result<()> {
    fs::write(path, hotel_report(store))?;
    info!(path = %path.display(), "wrote hotel report");
    Ok(())
}

/// Render the attraction report and write it to `path`
pub fn write_attraction_report(store: &AggregateStore, path: &Path) -> Result<()> {
    fs::write(path, attraction_report(store))?;
    info!(path = %path.display(), "wrote attraction report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::{Attraction, HotelRecord, ReviewRecord};
    use crate::store::PartialStore;
    use tempfile::tempdir;

    fn hotel_record(id: &str, name: &str) -> HotelRecord {
        HotelRecord {
            id: id.into(),
            name: name.into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            street: "333 O'Farrell St.".into(),
            latitude: 37.786,
            longitude: -122.410,
        }
    }

    fn review_record(hotel_id: &str, date: &str, username: &str) -> ReviewRecord {
        ReviewRecord {
            hotel_id: hotel_id.into(),
            review_id: "r1".into(),
            rating: 5,
            title: "Great deal".into(),
            text: "Would stay again.".into(),
            recommended: true,
            date: date.into(),
            username: username.into(),
        }
    }

    #[test]
    fn test_hotel_report_format() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Hilton"));

        let mut partial = PartialStore::new();
        partial
            .add_review(review_record("h1", "2016-06-29", "alice"))
            .unwrap();
        store.merge(partial);

        let expected = "\n\
            ********************\n\
            Hilton: h1\n\
            333 O'Farrell St.\n\
            San Francisco, CA\n\
            --------------------\n\
            Review by alice: 5\n\
            Great deal\n\
            Would stay again.\n";
        assert_eq!(hotel_report(&store), expected);
    }

    #[test]
    fn test_hotel_report_orders_hotels_and_reviews() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h2", "Westin"));
        store.add_hotel(hotel_record("h1", "Hilton"));

        let mut partial = PartialStore::new();
        partial
            .add_review(review_record("h1", "2016-07-01", "bob"))
            .unwrap();
        partial
            .add_review(review_record("h1", "2016-06-29", "alice"))
            .unwrap();
        store.merge(partial);

        let report = hotel_report(&store);
        let hilton = report.find("Hilton: h1").unwrap();
        let westin = report.find("Westin: h2").unwrap();
        assert!(hilton < westin);

        let alice = report.find("Review by alice").unwrap();
        let bob = report.find("Review by bob").unwrap();
        assert!(alice < bob);
    }

    #[test]
    fn test_hotel_without_reviews_renders_header_only() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Hilton"));

        let report = hotel_report(&store);
        assert!(report.contains("Hilton: h1"));
        assert!(!report.contains(REVIEW_SEPARATOR));
    }

    #[test]
    fn test_attraction_report_format() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Hilton"));

        let mut partial = PartialStore::new();
        partial.add_attraction(
            "h1",
            Attraction {
                id: "a1".into(),
                name: "Golden Gate Park".into(),
                address: "501 Stanyan St".into(),
                rating: 4.7,
            },
        );
        store.merge(partial);

        let expected = "Attractions near Hilton, h1\n\
            Golden Gate Park; 501 Stanyan St\n\
            ++++++++++++++++++++\n";
        assert_eq!(attraction_report(&store), expected);
    }

    #[test]
    fn test_attraction_report_orders_by_attraction_id() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Hilton"));

        let mut partial = PartialStore::new();
        partial.add_attraction(
            "h1",
            Attraction {
                id: "b2".into(),
                name: "Museum".into(),
                address: "2 Side St".into(),
                rating: 4.1,
            },
        );
        partial.add_attraction(
            "h1",
            Attraction {
                id: "a1".into(),
                name: "Aquarium".into(),
                address: "1 Bay St".into(),
                rating: 4.6,
            },
        );
        store.merge(partial);

        let report = attraction_report(&store);
        let aquarium = report.find("Aquarium").unwrap();
        let museum = report.find("Museum").unwrap();
        assert!(aquarium < museum);
    }

    #[test]
    fn test_attraction_report_covers_hotels_without_attractions() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Hilton"));

        let expected = "Attractions near Hilton, h1\n\
            ++++++++++++++++++++\n";
        assert_eq!(attraction_report(&store), expected);
    }

    #[test]
    fn test_reports_write_to_disk() {
        let store = AggregateStore::new();
        store.add_hotel(hotel_record("h1", "Hilton"));

        let dir = tempdir().unwrap();
        let hotel_path = dir.path().join("hotels.txt");
        let attraction_path = dir.path().join("attractions.txt");

        write_hotel_report(&store, &hotel_path).unwrap();
        write_attraction_report(&store, &attraction_path).unwrap();

        assert_eq!(fs::read_to_string(&hotel_path).unwrap(), hotel_report(&store));
        assert_eq!(
            fs::read_to_string(&attraction_path).unwrap(),
            attraction_report(&store)
        );
    }
}
