//! In-memory doubles shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sepaq::*;

pub const BASE_URL: &str = "https://www.sepaq.com";

pub fn park_at(name: &str, latitude: f64, longitude: f64) -> Park {
    Park::from_record(
        ParkRecord {
            name: name.to_string(),
            url: format!("/en/parks/{}", name.to_lowercase()),
            coordinates: ParkCoordinates {
                latitude,
                longitude,
            },
        },
        BASE_URL,
    )
}

pub fn park(name: &str) -> Park {
    park_at(name, 47.0, -71.0)
}

pub fn cabin_with_capacity(name: &str, park_name: &str, capacity: Option<u32>) -> Cabin {
    Cabin::from_record(
        CabinRecord {
            name: name.to_string(),
            url: format!("/en/cabins/{}", name.to_lowercase().replace(' ', "-")),
            capacity,
        },
        Arc::new(park(park_name)),
        BASE_URL,
    )
}

pub fn cabin(name: &str, park_name: &str) -> Cabin {
    cabin_with_capacity(name, park_name, None)
}

/// Catalog serving canned parks, cabins and calendars while counting requests
#[derive(Default)]
pub struct InMemoryCatalog {
    parks: Vec<Park>,
    cabins: Mutex<HashMap<String, Vec<CabinRecord>>>,
    dates: Mutex<HashMap<String, Vec<CabinDate>>>,
    failing: Mutex<HashSet<String>>,
    park_calls: AtomicUsize,
    cabin_calls: Mutex<Vec<String>>,
    date_calls: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(parks: Vec<Park>) -> Self {
        Self {
            parks,
            ..Self::default()
        }
    }

    pub fn add_cabin(&self, park_name: &str, cabin_name: &str, capacity: Option<u32>) {
        self.cabins
            .lock()
            .unwrap()
            .entry(park_name.to_string())
            .or_default()
            .push(CabinRecord {
                name: cabin_name.to_string(),
                url: format!("/en/cabins/{}", cabin_name.to_lowercase().replace(' ', "-")),
                capacity,
            });
    }

    pub fn set_dates(&self, cabin_name: &str, dates: Vec<CabinDate>) {
        self.dates
            .lock()
            .unwrap()
            .insert(cabin_name.to_string(), dates);
    }

    pub fn fail_dates(&self, cabin_name: &str) {
        self.failing.lock().unwrap().insert(cabin_name.to_string());
    }

    pub fn park_calls(&self) -> usize {
        self.park_calls.load(Ordering::SeqCst)
    }

    pub fn cabin_calls(&self) -> Vec<String> {
        self.cabin_calls.lock().unwrap().clone()
    }

    pub fn date_calls(&self) -> usize {
        self.date_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CabinCatalog for InMemoryCatalog {
    async fn parks(&self) -> Result<Vec<Park>, SepaqError> {
        self.park_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.parks.clone())
    }

    async fn cabins(&self, park: &Arc<Park>) -> Result<Vec<Cabin>, SepaqError> {
        self.cabin_calls
            .lock()
            .unwrap()
            .push(park.name().to_string());

        let records = self
            .cabins
            .lock()
            .unwrap()
            .get(park.name())
            .cloned()
            .unwrap_or_default();

        Ok(records
            .into_iter()
            .map(|record| Cabin::from_record(record, park.clone(), BASE_URL))
            .collect())
    }

    async fn dates(&self, cabin: &Cabin) -> Result<Vec<CabinDate>, SepaqError> {
        self.date_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(cabin.name()) {
            return Err(SepaqError::Transport(format!("{} timed out", cabin.url())));
        }

        Ok(self
            .dates
            .lock()
            .unwrap()
            .get(cabin.name())
            .cloned()
            .unwrap_or_default())
    }
}
