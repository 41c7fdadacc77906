use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Errors raised while resolving a location.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// Network failure while querying the IP lookup or geocoding service.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with something that is not a location.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The geocoder knows no place for the query.
    #[error("Location not found: {0}")]
    NotFound(String),

    /// Invalid resolver settings.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Settings of the location resolver.
#[derive(Debug, Clone)]
pub struct LocationConfig {
    /// Endpoint answering the caller's approximate position as `lat,long` plain text.
    pub ip_lookup_url: String,
    /// Base URL of a Nominatim compatible geocoder.
    pub geocoder_url: String,
    /// Client identifier the geocoder requires.
    pub user_agent: String,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            ip_lookup_url: "https://ipinfo.io/loc".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "Sepaq-Crawler".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// A resolved point on Earth, optionally named by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Place name, when the point went through the geocoder.
    pub name: Option<String>,
}

impl Location {
    /// Create an unnamed location.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
        }
    }

    /// Create a named location.
    pub fn named(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: Some(name.into()),
        }
    }

    /// Coordinates rounded to about a meter, used as memoization key.
    pub(crate) fn cache_key(latitude: f64, longitude: f64) -> (i64, i64) {
        (
            (latitude * 100_000.0).round() as i64,
            (longitude * 100_000.0).round() as i64,
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(ref name) => write!(f, "{} ({:.4}, {:.4})", name, self.latitude, self.longitude),
            None => write!(f, "{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

/// Flying distance in kilometers between two locations.
pub fn distance_km(a: &Location, b: &Location) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: a.latitude,
            longitude: a.longitude,
        },
        haversine::Location {
            latitude: b.latitude,
            longitude: b.longitude,
        },
        haversine::Units::Kilometers,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_between_cities() {
        let montreal = Location::new(45.5019, -73.5674);
        let quebec_city = Location::new(46.8139, -71.2080);

        let distance = distance_km(&montreal, &quebec_city);
        assert!(distance > 225.0 && distance < 240.0, "got {}", distance);
        assert_eq!(distance, distance_km(&quebec_city, &montreal));
    }

    #[test]
    fn test_display() {
        assert_eq!(Location::new(46.81391, -71.20802).to_string(), "46.8139, -71.2080");
        assert_eq!(
            Location::named(46.8139, -71.208, "Québec").to_string(),
            "Québec (46.8139, -71.2080)"
        );
    }

    #[test]
    fn test_cache_key_ignores_float_noise() {
        assert_eq!(
            Location::cache_key(46.813_910_000_1, -71.208_02),
            Location::cache_key(46.813_91, -71.208_020_000_1)
        );
    }
}
