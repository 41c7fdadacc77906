use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use location_services::{Location, distance_km};
use serde::{Deserialize, Serialize};

use crate::client::CabinCatalog;

/// Errors raised while talking to the SEPAQ reservation API
#[derive(thiserror::Error, Debug)]
pub enum SepaqError {
    /// Network failure while sending a request or reading its body
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with an unexpected status code
    #[error("HTTP {status} returned by {url}")]
    HttpStatus {
        /// Status code returned by the server
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// Rate limited by the reservation API
    #[error("Rate limited by the reservation API")]
    RateLimited,

    /// The requested page does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The body is not JSON or lacks a required field
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Settings of the reservation API client
#[derive(Debug, Clone)]
pub struct SepaqConfig {
    /// Base URL every relative park and cabin path is resolved against
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Timeout applied to each individual request (default: 30 seconds)
    pub timeout: Duration,
}

impl Default for SepaqConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.sepaq.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Coordinates of a park as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParkCoordinates {
    /// Latitude in decimal degrees
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,

    /// Longitude in decimal degrees
    #[serde(rename = "lng", alias = "lon", alias = "longitude")]
    pub longitude: f64,
}

/// Park record returned by the map results endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkRecord {
    /// Display name of the park
    #[serde(rename = "nom")]
    pub name: String,

    /// Path of the park page, relative to the site for SEPAQ parks
    pub url: String,

    /// Position of the park
    #[serde(rename = "coordonnees")]
    pub coordinates: ParkCoordinates,
}

/// Cabin record returned by the map results endpoint once a park page set the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinRecord {
    /// Display name of the cabin
    #[serde(rename = "nom")]
    pub name: String,

    /// Path of the cabin page
    pub url: String,

    /// Number of guests the cabin sleeps, missing on some records
    #[serde(default, rename = "capacite", alias = "capacity")]
    pub capacity: Option<u32>,
}

/// One day of a cabin availability calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinDateRecord {
    /// ISO date, possibly followed by a time part
    #[serde(rename = "dateAsStandardString")]
    pub date: String,

    /// Whether the cabin can be booked for the night starting on that date
    pub availability: bool,
}

/// A SEPAQ park
#[derive(Debug, Clone, PartialEq)]
pub struct Park {
    name: String,
    url: String,
    coordinates: ParkCoordinates,
}

impl Park {
    /// Build a park from its record, resolving its page against `base_url`
    pub fn from_record(record: ParkRecord, base_url: &str) -> Self {
        Self {
            url: resolve_url(base_url, &record.url),
            name: record.name,
            coordinates: record.coordinates,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute URL of the park page
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw coordinates
    pub fn coordinates(&self) -> ParkCoordinates {
        self.coordinates
    }

    /// Position of the park as a resolved point
    pub fn location(&self) -> Location {
        Location::new(self.coordinates.latitude, self.coordinates.longitude)
    }

    /// Flying distance in kilometers between this park and `location`
    pub fn distance_km_from(&self, location: &Location) -> f64 {
        distance_km(location, &self.location())
    }

    /// Fetch the cabins of this park
    pub async fn cabins(
        self: &Arc<Self>,
        catalog: &dyn CabinCatalog,
    ) -> Result<Vec<Cabin>, SepaqError> {
        catalog.cabins(self).await
    }
}

/// A SEPAQ cabin
#[derive(Debug, Clone, PartialEq)]
pub struct Cabin {
    name: String,
    url: String,
    capacity: Option<u32>,
    park: Arc<Park>,
}

impl Cabin {
    /// Build a cabin from its record, resolving its page against `base_url`
    pub fn from_record(record: CabinRecord, park: Arc<Park>, base_url: &str) -> Self {
        Self {
            url: resolve_url(base_url, &record.url),
            name: record.name,
            capacity: record.capacity,
            park,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute URL of the cabin page
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of guests, when the API reports it
    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Park the cabin belongs to
    pub fn park(&self) -> &Park {
        &self.park
    }

    /// Fetch the current availability calendar of this cabin
    pub async fn dates(&self, catalog: &dyn CabinCatalog) -> Result<Vec<CabinDate>, SepaqError> {
        catalog.dates(self).await
    }
}

/// A cabin on a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinDate {
    /// Calendar date
    pub date: NaiveDate,
    /// Whether the cabin is free that night
    pub is_available: bool,
}

impl CabinDate {
    /// Create a new cabin date
    pub fn new(date: NaiveDate, is_available: bool) -> Self {
        Self { date, is_available }
    }

    /// Parse the date of a raw record
    pub fn from_record(record: &CabinDateRecord) -> Result<Self, SepaqError> {
        let day = record.date.get(..10).unwrap_or(&record.date);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
            SepaqError::MalformedResponse(format!("Invalid date '{}': {}", record.date, e))
        })?;

        Ok(Self::new(date, record.availability))
    }
}

/// Resolve a page path against the site base URL, leaving absolute URLs untouched
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
