//! # Cabin Scan
//!
//! This crate searches SEPAQ parks for cabins that are free for a whole stay.
//! It enumerates parks and cabins once, then polls their availability calendars
//! on a fixed interval and raises an alert for every match.

/// Errors, settings and results of a search
mod scan_types;
pub use scan_types::*;

/// Date range matching against a cabin availability calendar
mod availability;
pub use availability::*;

/// Park and cabin selection strategies
mod filters;
pub use filters::*;

/// The search and poll loop
mod executor;
pub use executor::*;

/// Console and desktop alerts
mod notification_service;
pub use notification_service::*;

/// Desktop notifications through the platform notification daemon
#[cfg(feature = "desktop")]
mod desktop_service;
#[cfg(feature = "desktop")]
pub use desktop_service::*;

#[cfg(test)]
mod test_support;
