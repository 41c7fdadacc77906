use chrono::NaiveDate;
use clap::Parser;

/// Watch SEPAQ parks for cabins that become available for a stay
#[derive(Parser, Debug)]
#[command(
    name = "sepaq-crawler",
    version,
    about = "Watch SEPAQ parks for cabins that become available for a stay",
    long_about = "Lists the parks and cabins matching the filters once, then checks on a fixed
interval whether every night of the stay is available, printing each match and optionally
showing a desktop notification."
)]
pub struct Cli {
    /// Arriving date (YYYY-MM-DD)
    #[arg(long)]
    pub arriving: NaiveDate,

    /// Departure date (YYYY-MM-DD)
    #[arg(long)]
    pub leaving: NaiveDate,

    /// Comma separated list of parks in which to search
    #[arg(short, long)]
    pub parks: Option<String>,

    /// Maximum flying distance in km between a park and the origin
    #[arg(short, long)]
    pub distance: Option<f64>,

    /// Origin of the distance filter, as `LAT,LON` or a place name (default: location of your IP)
    #[arg(long, requires = "distance")]
    pub origin: Option<String>,

    /// Minimum number of guests a cabin must sleep
    #[arg(short, long)]
    pub capacity: Option<u32>,

    /// Number of times availability is checked (default: forever)
    #[arg(short, long)]
    pub retries: Option<u64>,

    /// Seconds to wait after each check
    #[arg(short, long, default_value = "60")]
    pub sleep: u64,

    /// Show a desktop notification for every match
    #[arg(short, long)]
    pub notify: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// How the parks to search are chosen
#[derive(Debug, Clone, PartialEq)]
pub enum ParkSelection {
    /// Every park offering cabins
    All,
    /// Parks named in a comma separated list
    Names(String),
    /// Parks closer than `max_km` to `origin`, or to the IP location when absent
    Distance {
        /// Maximum flying distance in km
        max_km: f64,
        /// Explicit origin, as given on the command line
        origin: Option<String>,
    },
}

impl Cli {
    /// Park selection, where a name list takes precedence over the distance
    pub fn park_selection(&self) -> ParkSelection {
        match (&self.parks, self.distance) {
            (Some(parks), _) => ParkSelection::Names(parks.clone()),
            (None, Some(max_km)) => ParkSelection::Distance {
                max_km,
                origin: self.origin.clone(),
            },
            (None, None) => ParkSelection::All,
        }
    }

    /// Reject argument combinations that would make the search meaningless
    pub fn validate(&self) -> Result<(), String> {
        if self.leaving <= self.arriving {
            return Err(format!(
                "Departure date {} must be after arriving date {}",
                self.leaving, self.arriving
            ));
        }

        if let Some(distance) = self.distance {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(format!(
                    "Distance must be a positive number of km, got {}",
                    distance
                ));
            }
        }

        if let Some(ref parks) = self.parks {
            if parks.split(',').all(|name| name.trim().is_empty()) {
                return Err("Park list is empty".to_string());
            }
        }

        Ok(())
    }

    /// Number of nights of the stay
    pub fn nights(&self) -> i64 {
        self.leaving.signed_duration_since(self.arriving).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sepaq-crawler").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--arriving", "2024-07-01", "--leaving", "2024-07-03"]).unwrap();

        assert_eq!(cli.arriving, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(cli.nights(), 2);
        assert_eq!(cli.sleep, 60);
        assert_eq!(cli.retries, None);
        assert!(cli.parks.is_none());
        assert!(!cli.notify);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_all_options() {
        let cli = parse(&[
            "--arriving",
            "2024-07-01",
            "--leaving",
            "2024-07-04",
            "-p",
            "Jacques-Cartier,Mont-Tremblant",
            "-d",
            "150",
            "--origin",
            "46.81,-71.21",
            "-c",
            "4",
            "-r",
            "10",
            "-s",
            "300",
            "-n",
        ])
        .unwrap();

        assert_eq!(cli.parks.as_deref(), Some("Jacques-Cartier,Mont-Tremblant"));
        assert_eq!(cli.distance, Some(150.0));
        assert_eq!(cli.origin.as_deref(), Some("46.81,-71.21"));
        assert_eq!(cli.capacity, Some(4));
        assert_eq!(cli.retries, Some(10));
        assert_eq!(cli.sleep, 300);
        assert!(cli.notify);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_dates_are_required() {
        assert!(parse(&["--arriving", "2024-07-01"]).is_err());
        assert!(parse(&["--arriving", "July 1st", "--leaving", "2024-07-03"]).is_err());
    }

    #[test]
    fn test_origin_requires_distance() {
        let args = ["--arriving", "2024-07-01", "--leaving", "2024-07-03", "--origin", "Québec"];
        assert!(parse(&args).is_err());
    }

    #[test]
    fn test_park_list_wins_over_distance() {
        let cli = parse(&[
            "--arriving",
            "2024-07-01",
            "--leaving",
            "2024-07-03",
            "-p",
            "Jacques-Cartier",
            "-d",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.park_selection(), ParkSelection::Names("Jacques-Cartier".to_string()));
    }

    #[rstest]
    #[case(&[], ParkSelection::All)]
    #[case(&["-d", "80"], ParkSelection::Distance { max_km: 80.0, origin: None })]
    #[case(
        &["-d", "80", "--origin", "Québec"],
        ParkSelection::Distance { max_km: 80.0, origin: Some("Québec".to_string()) }
    )]
    fn test_park_selection(#[case] extra: &[&str], #[case] expected: ParkSelection) {
        let mut args = vec!["--arriving", "2024-07-01", "--leaving", "2024-07-03"];
        args.extend_from_slice(extra);

        assert_eq!(parse(&args).unwrap().park_selection(), expected);
    }

    #[rstest]
    #[case(&["--arriving", "2024-07-03", "--leaving", "2024-07-03"])]
    #[case(&["--arriving", "2024-07-03", "--leaving", "2024-07-01"])]
    #[case(&["--arriving", "2024-07-01", "--leaving", "2024-07-03", "-d", "0"])]
    #[case(&["--arriving", "2024-07-01", "--leaving", "2024-07-03", "-p", " , "])]
    fn test_invalid_combinations(#[case] args: &[&str]) {
        let cli = parse(args).unwrap();
        assert!(cli.validate().is_err());
    }
}
