use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::types::*;

/// Turns coordinates, place names and the caller's IP into locations.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Reverse geocode coordinates into a named location.
    async fn geocode(&self, latitude: f64, longitude: f64) -> Result<Location, LocationError>;

    /// Forward geocode a place name.
    async fn search(&self, query: &str) -> Result<Location, LocationError>;

    /// The location of the caller according to its public IP.
    async fn current_location(&self) -> Result<Location, LocationError>;
}

/// Resolver backed by an IP lookup endpoint and a Nominatim geocoder.
///
/// Every answer is kept for the lifetime of the resolver; the current location
/// in particular is looked up at most once.
pub struct NominatimResolver {
    client: Client,
    config: LocationConfig,
    current: OnceCell<Location>,
    reverse_cache: Mutex<HashMap<(i64, i64), Location>>,
    search_cache: Mutex<HashMap<String, Location>>,
}

/// Place returned by the Nominatim `reverse` and `search` endpoints.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl NominatimPlace {
    fn into_location(self) -> Result<Location, LocationError> {
        let latitude = parse_coordinate(&self.lat)?;
        let longitude = parse_coordinate(&self.lon)?;

        Ok(match self.display_name {
            Some(name) => Location::named(latitude, longitude, name),
            None => Location::new(latitude, longitude),
        })
    }
}

/// Nominatim answers `{"error": "..."}` when reverse geocoding finds nothing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Place(NominatimPlace),
    Error { error: String },
}

impl NominatimResolver {
    /// Create a new resolver.
    pub fn new(config: Option<LocationConfig>) -> Result<Self, LocationError> {
        let config = config.unwrap_or_default();

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| LocationError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            current: OnceCell::new(),
            reverse_cache: Mutex::new(HashMap::new()),
            search_cache: Mutex::new(HashMap::new()),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, LocationError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LocationError::Transport(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(LocationError::Transport(format!(
                "GET {} returned status {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| LocationError::Transport(format!("Failed to read {}: {}", url, e)))
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Location, LocationError> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.config.geocoder_url.trim_end_matches('/'),
            latitude,
            longitude
        );

        let body = self.get_text(&url).await?;
        let response: ReverseResponse = serde_json::from_str(&body)
            .map_err(|e| LocationError::MalformedResponse(format!("Reverse geocoding: {}", e)))?;

        match response {
            ReverseResponse::Place(place) => place.into_location(),
            ReverseResponse::Error { error } => Err(LocationError::NotFound(format!(
                "{} at {:.4}, {:.4}",
                error, latitude, longitude
            ))),
        }
    }

    /// Approximate coordinates of the caller's public IP.
    async fn lookup_ip_coordinates(&self) -> Result<(f64, f64), LocationError> {
        let body = self.get_text(&self.config.ip_lookup_url).await?;
        parse_lat_long(&body)
    }
}

#[async_trait]
impl LocationResolver for NominatimResolver {
    async fn geocode(&self, latitude: f64, longitude: f64) -> Result<Location, LocationError> {
        let key = Location::cache_key(latitude, longitude);

        if let Some(location) = self.reverse_cache.lock().await.get(&key) {
            return Ok(location.clone());
        }

        debug!("Reverse geocoding {:.4}, {:.4}", latitude, longitude);
        let location = self.reverse(latitude, longitude).await?;

        self.reverse_cache.lock().await.insert(key, location.clone());
        Ok(location)
    }

    async fn search(&self, query: &str) -> Result<Location, LocationError> {
        if let Some(location) = self.search_cache.lock().await.get(query) {
            return Ok(location.clone());
        }

        debug!("Geocoding '{}'", query);

        let url = format!(
            "{}/search?format=jsonv2&limit=1&q={}",
            self.config.geocoder_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        let body = self.get_text(&url).await?;
        let places: Vec<NominatimPlace> = serde_json::from_str(&body)
            .map_err(|e| LocationError::MalformedResponse(format!("Geocoding: {}", e)))?;

        let location = places
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NotFound(query.to_string()))?
            .into_location()?;

        self.search_cache
            .lock()
            .await
            .insert(query.to_string(), location.clone());
        Ok(location)
    }

    async fn current_location(&self) -> Result<Location, LocationError> {
        self.current
            .get_or_try_init(|| async {
                let (latitude, longitude) = self.lookup_ip_coordinates().await?;
                let location = self.geocode(latitude, longitude).await?;
                info!("Current location resolved to {}", location);
                Ok::<Location, LocationError>(location)
            })
            .await
            .cloned()
    }
}

fn parse_coordinate(value: &str) -> Result<f64, LocationError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| {
            LocationError::MalformedResponse(format!("Invalid coordinate '{}': {}", value, e))
        })
}

/// Parse a `lat,long` pair such as `46.8139,-71.2080`.
pub fn parse_lat_long(text: &str) -> Result<(f64, f64), LocationError> {
    let mut parts = text.trim().split(',');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(lat), Some(long), None) => Ok((parse_coordinate(lat)?, parse_coordinate(long)?)),
        _ => Err(LocationError::MalformedResponse(format!(
            "Expected 'lat,long', got '{}'",
            text.trim()
        ))),
    }
}
