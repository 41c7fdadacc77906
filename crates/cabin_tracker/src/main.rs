//! Main entry point of the SEPAQ cabin crawler.
//! Watches the parks selected on the command line and reports every cabin free for the whole stay.

mod cli;
mod config;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use cabin_scan::*;
use clap::Parser;
use location_services::{Location, LocationResolver, NominatimResolver, parse_lat_long};
use sepaq::{CabinCatalog, SepaqClient};

use crate::cli::{Cli, ParkSelection};

/// Resolve the `--origin` argument, either coordinates or a place name
async fn resolve_origin(resolver: &dyn LocationResolver, origin: &str) -> Result<Location> {
    let location = match parse_lat_long(origin) {
        Ok((latitude, longitude)) => resolver.geocode(latitude, longitude).await,
        Err(_) => resolver.search(origin).await,
    }
    .with_context(|| format!("Could not resolve origin '{}'", origin))?;

    log::info!("📍 Measuring distances from {}", location);
    Ok(location)
}

/// Build the park filter from the name list or, failing that, the distance options
async fn park_filter(cli: &Cli) -> Result<Arc<dyn ParkFilter>> {
    match cli.park_selection() {
        ParkSelection::Names(parks) => {
            if cli.distance.is_some() {
                log::warn!("⚠️ Park list given, ignoring --distance");
            }
            Ok(Arc::new(ParkNameFilter::from_list(&parks)))
        }
        ParkSelection::Distance { max_km, origin } => {
            let resolver = Arc::new(NominatimResolver::new(Some(config::location_config()))?);

            let origin = match origin {
                Some(origin) => Origin::Fixed(resolve_origin(resolver.as_ref(), &origin).await?),
                None => Origin::CurrentIp(resolver),
            };

            Ok(Arc::new(DistanceFilter::new(origin, max_km)))
        }
        ParkSelection::All => Ok(Arc::new(AcceptAll)),
    }
}

fn cabin_filter(cli: &Cli) -> Arc<dyn CabinFilter> {
    match cli.capacity {
        Some(minimum) => Arc::new(CapacityFilter::new(minimum)),
        None => Arc::new(AcceptAll),
    }
}

fn alert_service(cli: &Cli) -> Arc<dyn Alerter> {
    let desktop_service: Option<Arc<dyn DesktopService>> = if cli.notify {
        log::info!("🔔 Desktop notifications enabled");
        Some(Arc::new(NotifyRustService::new(APP_NAME)))
    } else {
        None
    };

    Arc::new(CabinAlertService::new(desktop_service))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    if let Err(e) = cli.validate() {
        bail!(e);
    }

    log::info!(
        "🚀 Looking for {} night(s) from {} to {}",
        cli.nights(),
        cli.arriving,
        cli.leaving
    );

    let catalog: Arc<dyn CabinCatalog> = Arc::new(
        SepaqClient::new(Some(config::sepaq_config()))
            .context("Failed to create reservation API client")?,
    );

    let park_filter = park_filter(&cli).await?;
    let availability = Arc::new(StayAvailability::new(
        catalog.clone(),
        cli.arriving,
        cli.leaving,
    ));

    let search = CabinSearch::new(
        catalog,
        park_filter,
        cabin_filter(&cli),
        availability,
        alert_service(&cli),
        Some(config::search_config(&cli)),
    );

    let summary = search.search().await.context("Search failed")?;

    log::info!(
        "✅ Search finished: {} iterations over {} cabins, {} alerts, {} failed checks",
        summary.iterations,
        summary.cabins,
        summary.alerts,
        summary.failed_checks
    );

    Ok(())
}
