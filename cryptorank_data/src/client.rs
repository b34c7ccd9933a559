use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use snafu::{Snafu, ResultExt};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::coingecko::{RawMarketEntry, MarketsQuery};
use crate::fresh::Fresh;

pub type Markets = Arc<Vec<RawMarketEntry>>;

#[derive(Snafu, Debug)]
pub enum FetchError {
    #[snafu(display("Upstream rate limit exceeded (HTTP 429)"))]
    RateLimited,

    #[snafu(display("Upstream responded with HTTP {}", status))]
    UpstreamStatus {
        status: u16,
    },

    #[snafu(display("Failed to complete HTTP request: {}", source))]
    Transport {
        source: reqwest::Error,
    },

    #[snafu(display("Failed to deserialize response: {}", source))]
    Decode {
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }
}

/// Anything that can produce the current page of markets.
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_markets(&self) -> Result<Markets, FetchError>;
}

pub type MarketSourceRef = Arc<dyn MarketSource>;

/// Talks to the CoinGecko REST API. Every call goes over the network; wrap it
/// in a [`FreshnessCache`] to reuse recent results.
pub struct CoinGeckoClient {
    http: reqwest::Client,
    markets_url: String,
    query: MarketsQuery,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<CoinGeckoClient, FetchError> {
        let http = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .gzip(true)
            .build()
            .context(Transport)?;

        Ok(CoinGeckoClient::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl AsRef<str>) -> CoinGeckoClient {
        CoinGeckoClient {
            http,
            markets_url: markets_url(base_url.as_ref()),
            query: MarketsQuery::default(),
        }
    }
}

fn markets_url(base_url: &str) -> String {
    format!("{}/coins/markets", base_url.trim_end_matches('/'))
}

#[async_trait]
impl MarketSource for CoinGeckoClient {
    async fn fetch_markets(&self) -> Result<Markets, FetchError> {
        let started = Instant::now();
        let response = self.http
            .get(&self.markets_url)
            .query(&self.query)
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    warn!("Timed out requesting '{}'", self.markets_url);
                }
                FetchError::Transport { source }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return RateLimited.fail();
        }
        if !status.is_success() {
            return UpstreamStatus { status: status.as_u16() }.fail();
        }

        let buffer: Bytes = response.bytes().await.context(Transport)?;
        let markets = serde_json::from_slice::<Vec<RawMarketEntry>>(&buffer).context(Decode)?;

        debug!("Fetched {} markets ({} bytes) in {:?}",
               markets.len(), buffer.len(), started.elapsed());

        Ok(Arc::new(markets))
    }
}

/// Reuses the last successful result of `S` for `window`.
///
/// Holds a single entry. Callers arriving while a fetch is outstanding wait on
/// it rather than issuing their own. Failures are never stored.
pub struct FreshnessCache<S> {
    inner: S,
    window: Duration,
    entry: Mutex<Option<Fresh<Markets>>>,
}

impl<S: MarketSource> FreshnessCache<S> {
    pub fn new(inner: S, window: Duration) -> FreshnessCache<S> {
        FreshnessCache {
            inner,
            window,
            entry: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<S: MarketSource> MarketSource for FreshnessCache<S> {
    async fn fetch_markets(&self) -> Result<Markets, FetchError> {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(self.window) {
                trace!("Serving markets from cache (age = {:?})", cached.age_at(Instant::now()));
                return Ok(cached.value().clone());
            }
        }

        let markets = self.inner.fetch_markets().await?;
        *entry = Some(Fresh::new(markets.clone()));
        Ok(markets)
    }
}
