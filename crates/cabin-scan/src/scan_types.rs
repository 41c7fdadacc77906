use std::time::Duration;

use location_services::LocationError;
use sepaq::SepaqError;

use crate::executor::NotificationError;

/// Custom error type for search operations
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Reservation API error
    #[error("API error: {0}")]
    Api(#[from] SepaqError),

    /// Location could not be resolved
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Alert could not be delivered
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}

/// How many polling iterations a search may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationBudget {
    /// Stop after this many iterations
    Limited(u64),
    /// Poll until the process is stopped
    Unlimited,
}

impl IterationBudget {
    /// Budget for an optional retry count, where `None` means forever
    pub fn from_retries(retries: Option<u64>) -> Self {
        match retries {
            Some(count) => Self::Limited(count),
            None => Self::Unlimited,
        }
    }

    /// Whether another iteration may start once `completed` have run
    pub fn allows(&self, completed: u64) -> bool {
        match self {
            Self::Limited(count) => completed < *count,
            Self::Unlimited => true,
        }
    }
}

/// Settings of the search loop
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of polling iterations (default: unlimited)
    pub budget: IterationBudget,

    /// Pause after each iteration (default: 60 seconds)
    pub sleep: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            budget: IterationBudget::Unlimited,
            sleep: Duration::from_secs(60),
        }
    }
}

/// What a finished search did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Parks kept by the park filter
    pub parks: usize,
    /// Cabins kept by the cabin filter
    pub cabins: usize,
    /// Polling iterations completed
    pub iterations: u64,
    /// Alerts delivered over all iterations
    pub alerts: u64,
    /// Availability checks that failed and were skipped
    pub failed_checks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limited_budget() {
        let budget = IterationBudget::from_retries(Some(3));

        assert!(budget.allows(0));
        assert!(budget.allows(2));
        assert!(!budget.allows(3));
    }

    #[test]
    fn test_zero_budget_allows_nothing() {
        assert!(!IterationBudget::from_retries(Some(0)).allows(0));
    }

    #[test]
    fn test_unlimited_budget() {
        let budget = IterationBudget::from_retries(None);

        assert_eq!(budget, IterationBudget::Unlimited);
        assert!(budget.allows(0));
        assert!(budget.allows(u64::MAX));
    }

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.budget, IterationBudget::Unlimited);
        assert_eq!(config.sleep, Duration::from_secs(60));
    }
}
