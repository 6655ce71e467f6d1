//! Exchange rate API client
//!
//! Fetches the full rate table from the provider in a single request. The
//! client has no side effects beyond the network call; persisting a result is
//! the scheduler's job.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::RateTable;

/// Default endpoint for the rate provider
pub const DEFAULT_RATES_URL: &str = "https://api.coingecko.com/api/v3/exchange_rates";

/// Errors that can occur when fetching rates
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failed or the body could not be read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Rate provider returned {0}")]
    Status(StatusCode),

    /// The response body was not a valid rate payload
    #[error("Malformed rates response: {0}")]
    Parse(String),
}

impl FetchError {
    /// True for failures of the request itself, as opposed to its payload
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Status(_))
    }
}

/// Something that can produce a fresh rate table
///
/// Implementations must be cancel-safe: dropping the returned future before it
/// resolves must leave no trace.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateTable, FetchError>;
}

/// Expected response shape from the provider
#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: RateTable,
}

/// HTTP client for the rate provider
#[derive(Debug, Clone)]
pub struct RatesClient {
    client: Client,
    url: String,
}

impl Default for RatesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RatesClient {
    /// Creates a client for the default endpoint
    pub fn new() -> Self {
        Self::with_url(DEFAULT_RATES_URL)
    }

    /// Creates a client for a custom endpoint
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Replaces the underlying HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches and validates the full rate table
    pub async fn fetch_rates(&self) -> Result<RateTable, FetchError> {
        debug!(url = %self.url, "Requesting rates");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let text = response.text().await?;
        parse_rates(&text)
    }
}

#[async_trait]
impl RateSource for RatesClient {
    async fn fetch(&self) -> Result<RateTable, FetchError> {
        self.fetch_rates().await
    }
}

/// Parses a provider payload into a validated table
pub fn parse_rates(body: &str) -> Result<RateTable, FetchError> {
    serde_json::from_str::<RatesResponse>(body)
        .map(|response| response.rates)
        .map_err(|e| FetchError::Parse(e.to_string()))
}
