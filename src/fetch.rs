//! HTTP boundary: the record-list and overview resources served by the
//! dashboard backend. Failures here never enter the derivation pipeline;
//! the app converts them into section-local error state.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::records::Record;

/// Cache key for the record-list resource.
pub const RECORDS_RESOURCE: &str = "top-games";
/// Cache key for the overview resource.
pub const OVERVIEW_RESOURCE: &str = "overview";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid API base URL: {0}")]
    BadBaseUrl(String),
}

/// Dataset-wide statistics, consumed for display only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Overview {
    pub rows: u64,
    pub columns: u64,
    pub total_global_sales: f64,
}

/// Blocking client for the dashboard backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(FetchError::BadBaseUrl("empty URL".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("vgdash/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| FetchError::BadBaseUrl(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| FetchError::Transport {
                url: base_url.to_string(),
                message: err.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full record list. Missing numeric fields in the payload
    /// are legal and decode to `None`; they never fail the fetch.
    pub fn fetch_records(&self) -> Result<Vec<Record>, FetchError> {
        let url = format!("{}/api/top-games", self.base_url);
        let records: Vec<Record> = self.get_json(&url)?;
        debug!(count = records.len(), "fetched record list");
        Ok(records)
    }

    pub fn fetch_overview(&self) -> Result<Overview, FetchError> {
        let url = format!("{}/api/overview", self.base_url);
        self.get_json(&url)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().map_err(|err| FetchError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}
