use std::env;
use std::time::Duration;

use cabin_scan::{IterationBudget, SearchConfig};
use location_services::LocationConfig;
use sepaq::SepaqConfig;

use crate::cli::Cli;

/// Reservation API settings, with `SEPAQ_BASE_URL` overriding the site
pub fn sepaq_config() -> SepaqConfig {
    let mut config = SepaqConfig::default();

    if let Ok(base_url) = env::var("SEPAQ_BASE_URL") {
        log::info!("🔧 Using reservation site {}", base_url);
        config.base_url = base_url;
    }

    config
}

/// Location settings, with `IP_LOOKUP_URL` and `GEOCODER_URL` overriding the services
pub fn location_config() -> LocationConfig {
    let mut config = LocationConfig::default();

    if let Ok(url) = env::var("IP_LOOKUP_URL") {
        config.ip_lookup_url = url;
    }
    if let Ok(url) = env::var("GEOCODER_URL") {
        config.geocoder_url = url;
    }

    config
}

/// Search loop settings from the command line
pub fn search_config(cli: &Cli) -> SearchConfig {
    SearchConfig {
        budget: IterationBudget::from_retries(cli.retries),
        sleep: Duration::from_secs(cli.sleep),
    }
}
