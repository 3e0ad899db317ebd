//! Attraction lookup against the places text-search endpoint
//!
//! One blocking HTTPS request per hotel. The query is derived from the
//! hotel's city, the search is centered on its coordinates, and the radius
//! arrives in miles and goes out in meters. The endpoint root is
//! swappable so tests can point the client at a local server.

use crate::error::{FetchError, FetchResult};
use crate::store::types::{AttractionRecord, HotelLocation};
use serde::Deserialize;
use std::time::Duration;

/// The endpoint takes its radius in meters
pub const METERS_PER_MILE: u32 = 1609;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of attraction records for a hotel's surroundings
///
/// [`PlacesClient`] is the real one; tests substitute canned sources.
pub trait AttractionSource: Send + Sync {
    fn fetch(
        &self,
        location: &HotelLocation,
        radius_miles: u32,
    ) -> FetchResult<Vec<AttractionRecord>>;
}

/// Blocking client for the places text-search endpoint
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    /// Client against the production endpoint
    pub fn new(api_key: impl Into<String>) -> FetchResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Client against an alternate endpoint root
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> FetchResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

impl AttractionSource for PlacesClient {
    fn fetch(
        &self,
        location: &HotelLocation,
        radius_miles: u32,
    ) -> FetchResult<Vec<AttractionRecord>> {
        let url = format!("{}{}", self.base_url, TEXT_SEARCH_PATH);
        let query = attraction_query(&location.city);
        let center = format!("{},{}", location.latitude, location.longitude);
        let radius_meters = (radius_miles * METERS_PER_MILE).to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query.as_str()),
                ("location", center.as_str()),
                ("radius", radius_meters.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        parse_places_response(&body)
    }
}

/// Textual search query for a hotel's city
pub fn attraction_query(city: &str) -> String {
    format!("tourist attractions in {city}")
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    results: Vec<AttractionRecord>,
}

/// Decode the JSON body of a text-search response
pub fn parse_places_response(body: &str) -> FetchResult<Vec<AttractionRecord>> {
    let response: PlacesResponse = serde_json::from_str(body)?;
    Ok(response.results)
}
