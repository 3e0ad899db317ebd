//! JSON decoding for the two disk inputs
//!
//! - The bulk hotel file: one document, hotels under an `"sr"` array with
//!   abbreviated keys and string-typed coordinates
//! - Review files: one document each, reviews nested under
//!   `reviewDetails.reviewCollection.review`
//!
//! Failures here are file-scoped. A document that does not decode is a
//! single [`ParseError`]; the caller decides whether that sinks the run
//! (the bulk load) or just one task (a review file). Within a decodable
//! hotel file, a record whose coordinates fail to parse is skipped with a
//! warning rather than failing the file.

use crate::error::{ParseError, ParseResult};
use crate::store::types::{HotelRecord, ReviewRecord, ANONYMOUS_USERNAME};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Marker the source uses for a recommending review
const RECOMMENDED: &str = "YES";

#[derive(Debug, Deserialize)]
struct HotelFile {
    sr: Vec<RawHotel>,
}

#[derive(Debug, Deserialize)]
struct RawHotel {
    id: String,
    #[serde(rename = "f")]
    name: String,
    #[serde(rename = "ci")]
    city: String,
    #[serde(rename = "pr")]
    state: String,
    #[serde(rename = "ad")]
    street: String,
    #[serde(rename = "ll")]
    coordinates: RawCoordinates,
}

#[derive(Debug, Deserialize)]
struct RawCoordinates {
    lat: String,
    lng: String,
}

#[derive(Debug, Deserialize)]
struct ReviewFile {
    #[serde(rename = "reviewDetails")]
    review_details: ReviewDetails,
}

#[derive(Debug, Deserialize)]
struct ReviewDetails {
    #[serde(rename = "reviewCollection")]
    review_collection: ReviewCollection,
}

#[derive(Debug, Deserialize)]
struct ReviewCollection {
    #[serde(default)]
    review: Vec<RawReview>,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(rename = "hotelId")]
    hotel_id: String,
    #[serde(rename = "reviewId")]
    review_id: String,
    #[serde(rename = "ratingOverall")]
    rating: i64,
    #[serde(default)]
    title: String,
    #[serde(rename = "reviewText", default)]
    text: String,
    #[serde(rename = "isRecommended", default)]
    recommended: String,
    #[serde(rename = "reviewSubmissionTime")]
    date: String,
    #[serde(rename = "userNickname", default)]
    username: String,
}

/// Parse the bulk hotel file
///
/// Hotels whose coordinates do not parse as floats are skipped with a
/// warning; everything else in the file still loads.
pub fn hotel_file(path: &Path) -> ParseResult<Vec<HotelRecord>> {
    let text = read_file(path)?;
    let file: HotelFile = decode(path, &text)?;

    let mut records = Vec::with_capacity(file.sr.len());
    for raw in file.sr {
        let (latitude, longitude) = match parse_coordinates(&raw.coordinates) {
            Some(pair) => pair,
            None => {
                warn!(
                    hotel_id = %raw.id,
                    lat = %raw.coordinates.lat,
                    lng = %raw.coordinates.lng,
                    "skipping hotel with unparseable coordinates"
                );
                continue;
            }
        };
        records.push(HotelRecord {
            id: raw.id,
            name: raw.name,
            city: raw.city,
            state: raw.state,
            street: raw.street,
            latitude,
            longitude,
        });
    }

    Ok(records)
}

/// Parse one review file into raw records
///
/// An absent or empty review array yields zero records, which is not an
/// error. Ratings and dates are carried through unvalidated; the store
/// checks them record by record.
pub fn review_file(path: &Path) -> ParseResult<Vec<ReviewRecord>> {
    let text = read_file(path)?;
    let file: ReviewFile = decode(path, &text)?;

    let records = file
        .review_details
        .review_collection
        .review
        .into_iter()
        .map(|raw| ReviewRecord {
            hotel_id: raw.hotel_id,
            review_id: raw.review_id,
            rating: raw.rating,
            title: raw.title,
            text: raw.text,
            recommended: raw.recommended == RECOMMENDED,
            date: raw.date,
            username: if raw.username.is_empty() {
                ANONYMOUS_USERNAME.to_string()
            } else {
                raw.username
            },
        })
        .collect();

    Ok(records)
}

fn read_file(path: &Path) -> ParseResult<String> {
    fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn decode<'a, T: Deserialize<'a>>(path: &Path, text: &'a str) -> ParseResult<T> {
    serde_json::from_str(text).map_err(|source| ParseError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_coordinates(raw: &RawCoordinates) -> Option<(f64, f64)> {
    let lat = raw.lat.trim().parse().ok()?;
    let lng = raw.lng.trim().parse().ok()?;
    Some((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_json(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_hotel_file() {
        let file = temp_json(
            r#"{
                "sr": [
                    {
                        "id": "10323",
                        "f": "Hilton Union Square",
                        "ci": "San Francisco",
                        "pr": "CA",
                        "ad": "333 O'Farrell St.",
                        "ll": { "lat": "37.786", "lng": "-122.410" }
                    },
                    {
                        "id": "12539",
                        "f": "Grand Hyatt",
                        "ci": "San Francisco",
                        "pr": "CA",
                        "ad": "345 Stockton St.",
                        "ll": { "lat": "37.789", "lng": "-122.407" }
                    }
                ]
            }"#,
        );

        let records = hotel_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "10323");
        assert_eq!(records[0].name, "Hilton Union Square");
        assert_eq!(records[0].state, "CA");
        assert_eq!(records[0].latitude, 37.786);
        assert_eq!(records[0].longitude, -122.410);
    }

    #[test]
    fn test_hotel_with_bad_coordinates_is_skipped() {
        let file = temp_json(
            r#"{
                "sr": [
                    {
                        "id": "bad",
                        "f": "Nowhere Inn",
                        "ci": "Nowhere",
                        "pr": "XX",
                        "ad": "1 Void St.",
                        "ll": { "lat": "not-a-number", "lng": "-122.410" }
                    },
                    {
                        "id": "good",
                        "f": "Somewhere Inn",
                        "ci": "Somewhere",
                        "pr": "CA",
                        "ad": "2 Real St.",
                        "ll": { "lat": "37.786", "lng": "-122.410" }
                    }
                ]
            }"#,
        );

        let records = hotel_file(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "good");
    }

    #[test]
    fn test_missing_hotel_file_is_read_error() {
        let err = hotel_file(Path::new("/no/such/file.json")).unwrap_err();
        assert!(matches!(err, ParseError::Read { .. }));
    }

    #[test]
    fn test_malformed_hotel_file_is_json_error() {
        let file = temp_json("{ not json");
        let err = hotel_file(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::Json { .. }));
    }

    #[test]
    fn test_parse_review_file() {
        let file = temp_json(
            r#"{
                "reviewDetails": {
                    "reviewCollection": {
                        "review": [
                            {
                                "hotelId": "10323",
                                "reviewId": "r100",
                                "ratingOverall": 5,
                                "title": "Great deal",
                                "reviewText": "Would stay again.",
                                "isRecommended": "YES",
                                "reviewSubmissionTime": "2016-06-29",
                                "userNickname": "Abc"
                            },
                            {
                                "hotelId": "10323",
                                "reviewId": "r101",
                                "ratingOverall": 2,
                                "isRecommended": "NO",
                                "reviewSubmissionTime": "2016-07-02",
                                "userNickname": ""
                            }
                        ]
                    }
                }
            }"#,
        );

        let records = review_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].hotel_id, "10323");
        assert_eq!(records[0].review_id, "r100");
        assert_eq!(records[0].rating, 5);
        assert!(records[0].recommended);
        assert_eq!(records[0].username, "Abc");

        assert!(!records[1].recommended);
        assert_eq!(records[1].title, "");
        assert_eq!(records[1].text, "");
        assert_eq!(records[1].username, ANONYMOUS_USERNAME);
        assert_eq!(records[1].date, "2016-07-02");
    }

    #[test]
    fn test_empty_review_array_yields_no_records() {
        let file = temp_json(
            r#"{ "reviewDetails": { "reviewCollection": { "review": [] } } }"#,
        );
        assert!(review_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_absent_review_array_yields_no_records() {
        let file = temp_json(r#"{ "reviewDetails": { "reviewCollection": {} } }"#);
        assert!(review_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_recommended_requires_exact_marker() {
        for (value, expected) in [("YES", true), ("yes", false), ("Yes", false), ("NO", false)] {
            let contents = format!(
                r#"{{
                    "reviewDetails": {{
                        "reviewCollection": {{
                            "review": [{{
                                "hotelId": "h1",
                                "reviewId": "r1",
                                "ratingOverall": 3,
                                "isRecommended": "{value}",
                                "reviewSubmissionTime": "2016-06-29",
                                "userNickname": "abc"
                            }}]
                        }}
                    }}
                }}"#
            );
            let file = temp_json(&contents);
            let records = review_file(file.path()).unwrap();
            assert_eq!(records[0].recommended, expected, "marker {value:?}");
        }
    }

    #[test]
    fn test_malformed_review_file_is_json_error() {
        let file = temp_json(r#"{ "reviewDetails": [] }"#);
        let err = review_file(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::Json { .. }));
    }
}
