//! # Location Services
//!
//! This crate resolves geographic positions for the cabin search.
//! It includes the public IP lookup, forward and reverse geocoding, and flying distances.

/// Resolver implementations backed by an IP lookup endpoint and a Nominatim geocoder.
pub mod service;
/// Locations, settings and errors used by the resolvers.
pub mod types;

pub use service::{LocationResolver, NominatimResolver, parse_lat_long};
pub use types::{Location, LocationConfig, LocationError, distance_km};
