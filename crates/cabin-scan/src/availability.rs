use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sepaq::{Cabin, CabinCatalog, CabinDate, SepaqError};
use tracing::debug;

use crate::scan_types::ScanError;

/// Decides whether a cabin currently matches what the user is looking for
#[async_trait]
pub trait AvailabilityCheck: Send + Sync {
    /// Check the cabin against fresh availability data
    async fn is_available(&self, cabin: &Cabin) -> Result<bool, ScanError>;
}

/// Every night from `start` (inclusive) to `stop` (exclusive), empty when `stop <= start`
pub fn date_time_range(start: NaiveDate, stop: NaiveDate) -> Vec<NaiveDate> {
    let nights = stop.signed_duration_since(start).num_days().max(0) as usize;
    start.iter_days().take(nights).collect()
}

/// Whether every night of `[start, stop)` is reported available in `dates`
///
/// Nights missing from the calendar count as unavailable.
pub fn dates_available(dates: &[CabinDate], start: NaiveDate, stop: NaiveDate) -> bool {
    let free: HashSet<NaiveDate> = dates
        .iter()
        .filter(|d| d.is_available)
        .map(|d| d.date)
        .collect();

    date_time_range(start, stop)
        .iter()
        .all(|night| free.contains(night))
}

/// Fetch the current calendar of `cabin` and match it against `[start, stop)`
pub async fn is_available(
    catalog: &dyn CabinCatalog,
    cabin: &Cabin,
    start: NaiveDate,
    stop: NaiveDate,
) -> Result<bool, SepaqError> {
    let dates = cabin.dates(catalog).await?;
    let available = dates_available(&dates, start, stop);

    debug!(
        "{} ({}): {} calendar days, available from {} to {}: {}",
        cabin.name(),
        cabin.park().name(),
        dates.len(),
        start,
        stop,
        available
    );

    Ok(available)
}

/// Matches cabins free for every night of a fixed stay
pub struct StayAvailability {
    catalog: Arc<dyn CabinCatalog>,
    arriving: NaiveDate,
    leaving: NaiveDate,
}

impl StayAvailability {
    /// Create a check for a stay from `arriving` to `leaving`
    pub fn new(catalog: Arc<dyn CabinCatalog>, arriving: NaiveDate, leaving: NaiveDate) -> Self {
        Self {
            catalog,
            arriving,
            leaving,
        }
    }

    /// Number of nights of the stay
    pub fn nights(&self) -> usize {
        date_time_range(self.arriving, self.leaving).len()
    }
}

#[async_trait]
impl AvailabilityCheck for StayAvailability {
    async fn is_available(&self, cabin: &Cabin) -> Result<bool, ScanError> {
        Ok(is_available(self.catalog.as_ref(), cabin, self.arriving, self.leaving).await?)
    }
}
