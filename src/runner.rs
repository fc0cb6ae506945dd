//! Request-level entry point.
//!
//! [`Scraper`] owns the fetcher and adapter registry and turns a
//! [`ScrapeRequest`] into a [`ScrapeReport`]: rows, metadata and the full
//! progress log. On failure the log recorded so far travels with the error
//! inside a [`ScrapeFailure`].

use crate::adapters::AdapterRegistry;
use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeFailure};
use crate::fetcher::{Fetcher, PageFetcher};
use crate::models::{ScrapeKind, ScrapeMetadata, ScrapeRequest, ScrapeResult};
use crate::orchestrator::{SeasonScraper, scrape_match};
use crate::progress::{LogEvent, ScrapeLog};
use crate::season::extract_year;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument};

/// A finished request: rows, metadata and every progress event.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    #[serde(flatten)]
    pub result: ScrapeResult,
    pub logs: Vec<LogEvent>,
}

/// Fetcher + adapters + settings for running scrape requests.
pub struct Scraper {
    fetcher: Box<dyn PageFetcher>,
    registry: AdapterRegistry,
    delay: Duration,
}

impl Scraper {
    /// A scraper using the real HTTP fetcher.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::new(config)?;
        Ok(Self::with_fetcher(fetcher, config))
    }

    /// A scraper over any [`PageFetcher`].
    pub fn with_fetcher<F: PageFetcher + 'static>(fetcher: F, config: &ScraperConfig) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            registry: AdapterRegistry::new(),
            delay: config.delay(),
        }
    }

    /// Registry for adding site adapters.
    pub fn registry_mut(&mut self) -> &mut AdapterRegistry {
        &mut self.registry
    }

    /// Run `request`, recording progress into `log`.
    #[instrument(level = "info", skip_all, fields(url = %request.url, kind = %request.kind))]
    pub async fn run(
        &self,
        request: &ScrapeRequest,
        mut log: ScrapeLog,
    ) -> Result<ScrapeReport, ScrapeFailure> {
        if request.url.trim().is_empty() {
            log.error("URL is required");
            return Err(ScrapeFailure {
                error: ScrapeError::InvalidRequest("URL is required".to_string()),
                logs: log.into_events(),
            });
        }

        log.info(format!("Starting scrape: {} - {}", request.kind, request.url));
        let outcome = match request.kind {
            ScrapeKind::Match => self.run_match(&request.url, &mut log).await,
            ScrapeKind::Season => {
                self.run_season(&request.url, request.round_number, &mut log)
                    .await
            }
        };

        match outcome {
            Ok(result) => {
                info!(rows = result.metadata.row_count, "Scrape finished");
                Ok(ScrapeReport {
                    result,
                    logs: log.into_events(),
                })
            }
            Err(error) => {
                log.error(format!("Fatal error: {error}"));
                if let Some(hint) = error.hint() {
                    log.info(format!("Tip: {hint}"));
                }
                Err(ScrapeFailure {
                    error,
                    logs: log.into_events(),
                })
            }
        }
    }

    async fn run_match(&self, url: &str, log: &mut ScrapeLog) -> Result<ScrapeResult, ScrapeError> {
        log.info(format!("Parsing match data from {url}..."));
        let rows = scrape_match(url, self.fetcher.as_ref(), &self.registry).await?;
        log.success(format!("Successfully scraped {} rows", rows.len()));

        let metadata = ScrapeMetadata {
            url: url.to_string(),
            kind: ScrapeKind::Match,
            timestamp: Utc::now(),
            row_count: rows.len(),
            match_count: Some(1),
            success_count: None,
            year: None,
            round_number: None,
        };
        Ok(ScrapeResult { rows, metadata })
    }

    async fn run_season(
        &self,
        url: &str,
        round: Option<u32>,
        log: &mut ScrapeLog,
    ) -> Result<ScrapeResult, ScrapeError> {
        match round {
            Some(r) => log.info(format!("Expanding season to match URLs (Round {r})...")),
            None => log.info("Expanding season to match URLs..."),
        }
        let scraper = SeasonScraper::new(self.fetcher.as_ref(), &self.registry, self.delay);
        let summary = scraper.scrape(url, round, log).await?;
        log.success(format!(
            "Successfully scraped {} rows from season",
            summary.rows.len()
        ));

        let metadata = ScrapeMetadata {
            url: url.to_string(),
            kind: ScrapeKind::Season,
            timestamp: Utc::now(),
            row_count: summary.rows.len(),
            match_count: Some(summary.attempted),
            success_count: Some(summary.success_count),
            year: extract_year(url),
            round_number: round,
        };
        Ok(ScrapeResult {
            rows: summary.rows,
            metadata,
        })
    }
}
