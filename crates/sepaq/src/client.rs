use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, REFERER};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::*;

/// Landing page that opens a session scoped to every park offering cabins
pub const CABIN_LANDING_PATH: &str = "/en/reservation/chalet";

/// Endpoint listing parks or cabins, depending on the page that opened the session
pub const MAP_RESULTS_PATH: &str = "/en/reservation/carte/resultats";

/// Endpoint listing the availability calendar of the cabin whose page opened the session
pub const AVAILABILITIES_PATH: &str = "/en/reservation/availabilities/";

/// Source of parks, cabins and availability calendars
#[async_trait]
pub trait CabinCatalog: Send + Sync {
    /// List every park that offers cabins
    async fn parks(&self) -> Result<Vec<Park>, SepaqError>;

    /// List the cabins of a park
    async fn cabins(&self, park: &Arc<Park>) -> Result<Vec<Cabin>, SepaqError>;

    /// Fetch the current availability calendar of a cabin
    async fn dates(&self, cabin: &Cabin) -> Result<Vec<CabinDate>, SepaqError>;
}

/// Client for interacting with the SEPAQ reservation API
///
/// The API scopes its answers to the session opened by the page the user came
/// from, so every query is a pair of requests: the referring page first, then
/// the JSON endpoint with the cookies that page set.
pub struct SepaqClient {
    client: Client,
    config: SepaqConfig,
}

impl SepaqClient {
    /// Create a new reservation API client
    pub fn new(config: Option<SepaqConfig>) -> Result<Self, SepaqError> {
        let config = config.unwrap_or_default();

        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(SepaqError::Config(format!(
                "Base URL must be absolute: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SepaqError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Absolute URL of a site path
    pub fn url(&self, path: &str) -> String {
        resolve_url(&self.config.base_url, path)
    }

    /// Open a session on `page_url` and query `api_url` within it
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        page_url: &str,
        api_url: &str,
    ) -> Result<T, SepaqError> {
        debug!("Opening session on {}", page_url);

        let page_response = self.send(self.client.get(page_url), page_url).await?;
        let cookies = session_cookies(&page_response);

        debug!("Querying {} (session cookies: {})", api_url, cookies.is_some());

        let mut request = self
            .client
            .get(api_url)
            .header(REFERER, page_url)
            .header(ACCEPT, "application/json");

        if let Some(ref cookies) = cookies {
            request = request.header(COOKIE, cookies);
        }

        let api_response = self.send(request, api_url).await?;

        let body = api_response
            .text()
            .await
            .map_err(|e| SepaqError::Transport(format!("Failed to read {}: {}", api_url, e)))?;

        serde_json::from_str(&body).map_err(|e| {
            let excerpt: String = body.chars().take(120).collect();
            SepaqError::MalformedResponse(format!(
                "Unexpected body from {}: {} (body starts with {:?})",
                api_url, e, excerpt
            ))
        })
    }

    /// Send a request and map failing status codes to errors
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, SepaqError> {
        let response = request
            .send()
            .await
            .map_err(|e| SepaqError::Transport(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("GET {} returned status {}", url, status);

            match status.as_u16() {
                429 => return Err(SepaqError::RateLimited),
                404 => return Err(SepaqError::NotFound(url.to_string())),
                code => {
                    return Err(SepaqError::HttpStatus {
                        status: code,
                        url: url.to_string(),
                    });
                }
            }
        }

        Ok(response)
    }

    /// List every park offering cabins
    ///
    /// Parks whose page lives on another website are dropped.
    pub async fn get_parks(&self) -> Result<Vec<Park>, SepaqError> {
        let records: Vec<ParkRecord> = self
            .fetch(&self.url(CABIN_LANDING_PATH), &self.url(MAP_RESULTS_PATH))
            .await?;

        let total = records.len();
        let parks: Vec<Park> = records
            .into_iter()
            .filter(|record| record.url.starts_with('/'))
            .map(|record| Park::from_record(record, &self.config.base_url))
            .collect();

        debug!("Received {} parks, {} hosted on the site", total, parks.len());
        Ok(parks)
    }

    /// List the cabins of a park
    pub async fn get_cabins(&self, park: &Arc<Park>) -> Result<Vec<Cabin>, SepaqError> {
        let records: Vec<CabinRecord> = self
            .fetch(park.url(), &self.url(MAP_RESULTS_PATH))
            .await?;

        debug!("Received {} cabins for {}", records.len(), park.name());

        Ok(records
            .into_iter()
            .map(|record| Cabin::from_record(record, park.clone(), &self.config.base_url))
            .collect())
    }

    /// Fetch the availability calendar of a cabin
    pub async fn get_dates(&self, cabin: &Cabin) -> Result<Vec<CabinDate>, SepaqError> {
        let records: Vec<CabinDateRecord> = self
            .fetch(cabin.url(), &self.url(AVAILABILITIES_PATH))
            .await?;

        records.iter().map(CabinDate::from_record).collect()
    }
}

#[async_trait]
impl CabinCatalog for SepaqClient {
    async fn parks(&self) -> Result<Vec<Park>, SepaqError> {
        self.get_parks().await
    }

    async fn cabins(&self, park: &Arc<Park>) -> Result<Vec<Cabin>, SepaqError> {
        self.get_cabins(park).await
    }

    async fn dates(&self, cabin: &Cabin) -> Result<Vec<CabinDate>, SepaqError> {
        self.get_dates(cabin).await
    }
}

/// Render the cookies set by a response as a `Cookie` header value
fn session_cookies(response: &Response) -> Option<String> {
    let pairs: Vec<String> = response
        .cookies()
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}
