use std::sync::Arc;

use sepaq::{Cabin, CabinCatalog, Park};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::availability::AvailabilityCheck;
use crate::filters::{CabinFilter, ParkFilter};
use crate::scan_types::*;

/// Trait for alert services (console, desktop)
#[async_trait::async_trait]
pub trait Alerter: Send + Sync {
    /// Report a cabin that matches the search
    async fn alert(&self, cabin: &Cabin) -> Result<(), NotificationError>;
}

/// Errors raised while delivering an alert
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Standard output could not be written
    #[error("Console error: {0}")]
    Console(String),
    /// The desktop notification could not be shown
    #[error("Desktop notification error: {0}")]
    Desktop(String),
}

/// Main search engine
///
/// Parks and cabins are enumerated once; only availability is polled afterwards.
/// Every request is awaited in turn, so an iteration over N cabins issues N
/// sequential availability queries.
pub struct CabinSearch {
    catalog: Arc<dyn CabinCatalog>,
    park_filter: Arc<dyn ParkFilter>,
    cabin_filter: Arc<dyn CabinFilter>,
    availability: Arc<dyn AvailabilityCheck>,
    alerter: Arc<dyn Alerter>,

    /// Configuration
    config: SearchConfig,
}

impl CabinSearch {
    /// Create a search over `catalog`
    pub fn new(
        catalog: Arc<dyn CabinCatalog>,
        park_filter: Arc<dyn ParkFilter>,
        cabin_filter: Arc<dyn CabinFilter>,
        availability: Arc<dyn AvailabilityCheck>,
        alerter: Arc<dyn Alerter>,
        config: Option<SearchConfig>,
    ) -> Self {
        Self {
            catalog,
            park_filter,
            cabin_filter,
            availability,
            alerter,
            config: config.unwrap_or_default(),
        }
    }

    /// Run the search until the iteration budget is spent
    ///
    /// Any failure while enumerating parks or cabins aborts the search before
    /// polling starts. During polling, a failed availability check is logged and
    /// the cabin is skipped for that iteration only.
    pub async fn search(&self) -> Result<SearchSummary, ScanError> {
        let (parks, cabins) = self.enumerate().await?;

        let mut summary = SearchSummary {
            parks: parks.len(),
            cabins: cabins.len(),
            ..SearchSummary::default()
        };

        info!(
            "Polling {} cabins in {} parks ({:?}, every {:?})",
            summary.cabins, summary.parks, self.config.budget, self.config.sleep
        );

        while self.config.budget.allows(summary.iterations) {
            self.poll(&cabins, &mut summary).await;
            summary.iterations = summary.iterations.saturating_add(1);

            debug!("Iteration {} done, sleeping {:?}", summary.iterations, self.config.sleep);
            sleep(self.config.sleep).await;
        }

        if summary.alerts == 0 {
            info!("Found nothing");
        } else {
            info!(
                "Raised {} alerts over {} iterations",
                summary.alerts, summary.iterations
            );
        }

        Ok(summary)
    }

    /// Select parks, then the cabins of every kept park
    async fn enumerate(&self) -> Result<(Vec<Arc<Park>>, Vec<Cabin>), ScanError> {
        let mut parks = Vec::new();
        for park in self.catalog.parks().await? {
            if self.park_filter.accepts(&park).await? {
                parks.push(Arc::new(park));
            }
        }

        info!("Searching following parks:");
        for park in &parks {
            info!("  - {}", park.name());
        }

        let mut cabins = Vec::new();
        for park in &parks {
            let mut kept = 0;
            for cabin in park.cabins(self.catalog.as_ref()).await? {
                if self.cabin_filter.accepts(&cabin).await? {
                    cabins.push(cabin);
                    kept += 1;
                }
            }
            debug!("Keeping {} cabins in {}", kept, park.name());
        }

        Ok((parks, cabins))
    }

    /// Check every cabin once and alert on each match
    async fn poll(&self, cabins: &[Cabin], summary: &mut SearchSummary) {
        for cabin in cabins {
            match self.availability.is_available(cabin).await {
                Ok(true) => match self.alerter.alert(cabin).await {
                    Ok(()) => summary.alerts += 1,
                    Err(e) => error!("Failed to send alert for {}: {}", cabin.name(), e),
                },
                Ok(false) => {
                    debug!("{} ({}) is not available", cabin.name(), cabin.park().name());
                }
                Err(e) => {
                    summary.failed_checks += 1;
                    warn!(
                        "Skipping {} ({}) this iteration: {}",
                        cabin.name(),
                        cabin.park().name(),
                        e
                    );
                }
            }
        }
    }
}
