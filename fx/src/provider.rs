//! Rate table clients.

use async_trait::async_trait;
use fxconv_common::RateTable;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::config::ConverterConfig;
use crate::error::{FxError, FxResult};

/// Source of the session rate table.
#[async_trait]
pub trait RateTableClient: Send + Sync {
    /// Get the client name.
    fn name(&self) -> &str;

    /// Fetch the full rate table. Implementations do not retry.
    async fn fetch(&self) -> FxResult<RateTable>;
}

/// Body of the remote rate endpoint. Only `rates` is read.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: Map<String, Value>,
}

/// Fetches the table with a single HTTP GET.
pub struct HttpRateTableClient {
    http: reqwest::Client,
    url: String,
}

impl HttpRateTableClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &ConverterConfig) -> FxResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            url: config.rates_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn decode(body: RatesResponse) -> FxResult<RateTable> {
        let entries = body
            .rates
            .into_iter()
            .map(|(code, value)| match value.as_f64() {
                Some(rate) => Ok((code, rate)),
                None => Err(FxError::Network(format!(
                    "malformed rate table: rate for {} is not a number",
                    code
                ))),
            })
            .collect::<FxResult<Vec<_>>>()?;

        Ok(RateTable::from_rates(entries)?)
    }
}

#[async_trait]
impl RateTableClient for HttpRateTableClient {
    fn name(&self) -> &str {
        "HTTP"
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> FxResult<RateTable> {
        let response = self.http.get(&self.url).send().await?.error_for_status()?;
        debug!(status = %response.status(), "Rate endpoint responded");

        let body: RatesResponse = response.json().await?;
        let table = Self::decode(body)?;

        info!(units = table.len(), "Fetched rate table");

        Ok(table)
    }
}

/// Mock rate table client for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateTableClient {
    outcome: parking_lot::Mutex<FxResult<RateTable>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateTableClient {
    /// Client that returns `table`.
    pub fn with_table(table: RateTable) -> Self {
        Self {
            outcome: parking_lot::Mutex::new(Ok(table)),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Client whose fetches fail with a network error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: parking_lot::Mutex::new(Err(FxError::Network(message.into()))),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Replace what the next fetch returns.
    pub fn set_table(&self, table: RateTable) {
        *self.outcome.lock() = Ok(table);
    }

    /// Make the next fetch fail.
    pub fn set_failure(&self, message: impl Into<String>) {
        *self.outcome.lock() = Err(FxError::Network(message.into()));
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateTableClient for MockRateTableClient {
    fn name(&self) -> &str {
        "MOCK"
    }

    async fn fetch(&self) -> FxResult<RateTable> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.outcome.lock().clone()
    }
}
