//! HTTP client for the kline history API.

use async_trait::async_trait;
use candlefold_types::{CandlefoldError, Interval, Tick};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::decode::{DecodeError, decode_payload};
use crate::source::HistoricalSource;
use crate::url::klines_url;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Configuration for the kline client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without the endpoint path.
    pub base_url: String,
    /// Trading pair to request.
    pub pair_id: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
    /// Bearer token sent with every request.
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pair_id: 1,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            user_agent: format!("candlefold/{}", env!("CARGO_PKG_VERSION")),
            auth_token: None,
        }
    }
}

impl ClientConfig {
    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the trading pair.
    #[must_use]
    pub const fn with_pair_id(mut self, pair_id: u32) -> Self {
        self.pair_id = pair_id;
        self
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Errors that can occur while fetching history.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status.
    #[error("Server error: {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// A record in the batch could not be decoded.
    #[error("Decode error at record {index} of {batch_size}: {source}")]
    Decode {
        /// Number of records in the batch.
        batch_size: usize,
        /// Position of the offending record.
        index: usize,
        /// The underlying decode failure.
        source: DecodeError,
    },
}

impl From<FetchError> for CandlefoldError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Decode { .. } => Self::Decode(err.to_string()),
            other => Self::Fetch(other.to_string()),
        }
    }
}

/// HTTP client for kline history with retry logic.
#[derive(Debug, Clone)]
pub struct KlineClient {
    client: Client,
    config: ClientConfig,
}

impl KlineClient {
    /// Creates a new kline client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches the raw response body for `interval`.
    ///
    /// A body that is not valid JSON is logged and returned as
    /// [`Value::Null`], which decodes to no ticks.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retries.
    pub async fn fetch_payload(&self, interval: Interval) -> Result<Value, FetchError> {
        let url = klines_url(&self.config.base_url, self.config.pair_id, interval);
        let body = self.get(&url).await?;

        match serde_json::from_slice(&body) {
            Ok(payload) => Ok(payload),
            Err(e) => {
                warn!(%url, error = %e, "kline response is not valid JSON");
                Ok(Value::Null)
            }
        }
    }

    /// Fetches history for `interval` as ticks sorted by time.
    ///
    /// Records that fail to decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retries.
    pub async fn fetch_ticks(&self, interval: Interval) -> Result<Vec<Tick>, FetchError> {
        let payload = self.fetch_payload(interval).await?;
        let batch = decode_payload(&payload);

        let mut ticks = batch.ticks;
        ticks.sort_by_key(|tick| tick.time);
        info!(
            %interval,
            pair_id = self.config.pair_id,
            ticks = ticks.len(),
            skipped = batch.rejected.len(),
            "fetched kline history"
        );
        Ok(ticks)
    }

    /// Issues a GET with retries, returning the response body.
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut attempts = 0;

        loop {
            let mut request = self.client.get(url);
            if let Some(token) = &self.config.auth_token {
                request = request.bearer_auth(token);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    // Retry on server errors (5xx) and rate limiting (429)
                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            let delay = self.calculate_backoff_delay(attempts);
                            debug!(%url, status = status.as_u16(), attempts, ?delay, "retrying");
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(FetchError::ServerError {
                            status: status.as_u16(),
                        });
                    }

                    if status.is_client_error() {
                        return Err(FetchError::ServerError {
                            status: status.as_u16(),
                        });
                    }
                    return Ok(response.bytes().await?.to_vec());
                }
                Err(e) if Self::is_retryable_error(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    let delay = self.calculate_backoff_delay(attempts);
                    debug!(%url, error = %e, attempts, ?delay, "retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));
        let capped = exp_delay.min(self.config.max_delay_ms);

        // ±25% jitter
        let jitter_range = capped / 4;
        let delay = if jitter_range > 0 {
            let offset = rand::thread_rng().gen_range(0..=jitter_range * 2);
            (capped + offset).saturating_sub(jitter_range)
        } else {
            capped
        };
        Duration::from_millis(delay.max(100))
    }

    /// Determines if an error is retryable.
    fn is_retryable_error(error: &reqwest::Error) -> bool {
        if error.is_builder() {
            return false;
        }
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

#[async_trait]
impl HistoricalSource for KlineClient {
    async fn fetch_ticks(&self, interval: Interval) -> Result<Vec<Tick>, FetchError> {
        Self::fetch_ticks(self, interval).await
    }
}
