use std::sync::Arc;

use async_trait::async_trait;
use location_services::{Location, LocationResolver};
use sepaq::{Cabin, Park};
use tracing::debug;

use crate::scan_types::ScanError;

/// Selects the parks a search looks into
#[async_trait]
pub trait ParkFilter: Send + Sync {
    /// Whether the park should be searched
    async fn accepts(&self, park: &Park) -> Result<bool, ScanError>;
}

/// Selects the cabins a search keeps polling
#[async_trait]
pub trait CabinFilter: Send + Sync {
    /// Whether the cabin should be polled
    async fn accepts(&self, cabin: &Cabin) -> Result<bool, ScanError>;
}

/// Accepts every park and every cabin
pub struct AcceptAll;

#[async_trait]
impl ParkFilter for AcceptAll {
    async fn accepts(&self, _park: &Park) -> Result<bool, ScanError> {
        Ok(true)
    }
}

#[async_trait]
impl CabinFilter for AcceptAll {
    async fn accepts(&self, _cabin: &Cabin) -> Result<bool, ScanError> {
        Ok(true)
    }
}

/// Accepts parks whose name is in an allowlist, ignoring case
pub struct ParkNameFilter {
    names: Vec<String>,
}

impl ParkNameFilter {
    /// Create a filter from park names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Create a filter from a comma separated list such as `Jacques-Cartier,Mont-Tremblant`
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Names in the allowlist
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[async_trait]
impl ParkFilter for ParkNameFilter {
    async fn accepts(&self, park: &Park) -> Result<bool, ScanError> {
        let name = park.name().to_lowercase();
        Ok(self.names.iter().any(|n| *n == name))
    }
}

/// Where distances are measured from
pub enum Origin {
    /// A location known up front
    Fixed(Location),
    /// The caller's location according to its public IP
    CurrentIp(Arc<dyn LocationResolver>),
}

/// Accepts parks strictly closer than a maximum flying distance
pub struct DistanceFilter {
    origin: Origin,
    max_km: f64,
}

impl DistanceFilter {
    /// Create a filter measuring from `origin`
    pub fn new(origin: Origin, max_km: f64) -> Self {
        Self { origin, max_km }
    }

    async fn origin(&self) -> Result<Location, ScanError> {
        match self.origin {
            Origin::Fixed(ref location) => Ok(location.clone()),
            Origin::CurrentIp(ref resolver) => Ok(resolver.current_location().await?),
        }
    }
}

#[async_trait]
impl ParkFilter for DistanceFilter {
    async fn accepts(&self, park: &Park) -> Result<bool, ScanError> {
        let origin = self.origin().await?;
        let distance = park.distance_km_from(&origin);

        debug!("{} is {:.1} km away", park.name(), distance);
        Ok(distance < self.max_km)
    }
}

/// Accepts cabins sleeping at least a number of guests
///
/// Cabins whose capacity is not reported are rejected.
pub struct CapacityFilter {
    minimum: u32,
}

impl CapacityFilter {
    /// Create a filter requiring room for `minimum` guests
    pub fn new(minimum: u32) -> Self {
        Self { minimum }
    }
}

#[async_trait]
impl CabinFilter for CapacityFilter {
    async fn accepts(&self, cabin: &Cabin) -> Result<bool, ScanError> {
        Ok(cabin
            .capacity()
            .is_some_and(|capacity| capacity >= self.minimum))
    }
}
