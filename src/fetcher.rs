//! HTTP page fetching with a bounded timeout.
//!
//! [`PageFetcher`] is the seam the rest of the crate fetches through, so site
//! adapters and the season orchestrator can be driven by any implementation.
//! [`Fetcher`] is the real one, built on `reqwest`.
//!
//! # Failure modes
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Deadline elapsed before the page arrived | [`ScrapeError::Timeout`] |
//! | Non-2xx status | [`ScrapeError::HttpStatus`] |
//! | Anything else on the wire | [`ScrapeError::Fetch`] |
//!
//! There are no retries here; the season orchestrator decides what a failed
//! page means.

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Something that can turn a URL into page text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, ScrapeError>;
}

/// `reqwest`-backed fetcher with a per-request deadline.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    /// Build a fetcher from the timeout and user agent in `config`.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        Self::with_client_builder(reqwest::Client::builder(), config)
    }

    fn with_client_builder(
        builder: reqwest::ClientBuilder,
        config: &ScraperConfig,
    ) -> Result<Self, ScrapeError> {
        let client = builder
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_error(&self, url: &str) -> ScrapeError {
        ScrapeError::Timeout {
            url: url.to_string(),
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }

    fn transport_error(&self, url: &str, source: reqwest::Error) -> ScrapeError {
        if source.is_timeout() {
            self.timeout_error(url)
        } else {
            ScrapeError::Fetch {
                url: url.to_string(),
                source,
            }
        }
    }

    async fn exchange(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HTML)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(url, e))
    }
}

#[async_trait]
impl PageFetcher for Fetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn get(&self, url: &str) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        // Dropping the exchange future on expiry aborts the request and the timer.
        let result = match tokio::time::timeout(self.timeout, self.exchange(url)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(url)),
        };
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        match &result {
            Ok(body) => debug!(
                elapsed_ms,
                bytes = body.len(),
                preview = %truncate_for_log(body, 120),
                "Fetched page"
            ),
            Err(e) => warn!(elapsed_ms, error = %e, "Fetch failed"),
        }
        result
    }
}
