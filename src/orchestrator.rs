//! Season scraping: expand once, then scrape each match in turn.
//!
//! Matches are fetched strictly one after another with a fixed pause in
//! between, to keep the load on the site low and the row order stable.
//! Expansion failure ends the request; a failed match is logged and skipped.

use crate::adapters::{AdapterRegistry, ExpandOptions};
use crate::error::ScrapeError;
use crate::fetcher::PageFetcher;
use crate::models::Row;
use crate::progress::ScrapeLog;
use std::time::Duration;
use tokio::time::sleep;
use tracing::instrument;

/// Fetch one match page and parse it with the adapter for its URL.
///
/// Errors propagate; there is no skip path for a single match.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn scrape_match(
    url: &str,
    fetcher: &dyn PageFetcher,
    registry: &AdapterRegistry,
) -> Result<Vec<Row>, ScrapeError> {
    let html = fetcher.get(url).await?;
    registry.resolve(url).parse_page(&html, url)
}

/// What happened to one match of a season.
#[derive(Debug)]
pub enum MatchOutcome {
    Scraped(Vec<Row>),
    Skipped(ScrapeError),
}

/// Rows and counts from a finished season scrape.
#[derive(Debug, Default)]
pub struct SeasonSummary {
    pub rows: Vec<Row>,
    /// Matches that were fetched and parsed without error.
    pub success_count: usize,
    /// Matches attempted (the number of expanded URLs).
    pub attempted: usize,
}

/// Drives one season request over a fetcher and adapter registry.
pub struct SeasonScraper<'a> {
    fetcher: &'a dyn PageFetcher,
    registry: &'a AdapterRegistry,
    delay: Duration,
}

impl<'a> SeasonScraper<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, registry: &'a AdapterRegistry, delay: Duration) -> Self {
        Self {
            fetcher,
            registry,
            delay,
        }
    }

    async fn attempt(&self, url: &str) -> MatchOutcome {
        match scrape_match(url, self.fetcher, self.registry).await {
            Ok(rows) => MatchOutcome::Scraped(rows),
            Err(e) => MatchOutcome::Skipped(e),
        }
    }

    /// Scrape every match of the season (or of one round).
    ///
    /// The season URL is expanded by the adapter that claims it, then each
    /// match URL is fetched and parsed by the adapter that claims that URL,
    /// one at a time with the configured pause between attempts. A failed
    /// match is logged and skipped.
    ///
    /// # Arguments
    ///
    /// * `season_url` - The season page, e.g. `.../seas/2024.html`
    /// * `round` - Only scrape this round when set
    /// * `log` - Receives one progress event per step
    ///
    /// # Returns
    ///
    /// A [`SeasonSummary`] with the rows of every successful match in URL
    /// order. Only an expansion error is returned as `Err`; it is also
    /// recorded in `log`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let scraper = SeasonScraper::new(&fetcher, &registry, Duration::from_millis(500));
    /// let mut log = ScrapeLog::new();
    /// let summary = scraper.scrape("https://afltables.com/afl/seas/2024.html", Some(1), &mut log).await?;
    /// println!("{}/{} matches", summary.success_count, summary.attempted);
    /// ```
    #[instrument(level = "info", skip_all, fields(%season_url, ?round))]
    pub async fn scrape(
        &self,
        season_url: &str,
        round: Option<u32>,
        log: &mut ScrapeLog,
    ) -> Result<SeasonSummary, ScrapeError> {
        log.info(format!("Fetching season page: {season_url}"));
        let options = ExpandOptions {
            round_number: round,
        };
        let urls = match self
            .registry
            .resolve(season_url)
            .expand_url(season_url, self.fetcher, options)
            .await
        {
            Ok(urls) => urls,
            Err(e) => {
                log.error(format!("Fatal error scraping season: {e}"));
                return Err(e);
            }
        };

        if urls.is_empty() {
            log.warning("No match URLs found in season page");
            return Ok(SeasonSummary::default());
        }

        let total = urls.len();
        log.info(format!("Found {total} match URLs to scrape"));

        let mut summary = SeasonSummary {
            attempted: total,
            ..SeasonSummary::default()
        };
        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            let n = i + 1;
            log.info(format!("[{n}/{total}] Scraping: {url}"));

            match self.attempt(url).await {
                MatchOutcome::Scraped(rows) if rows.is_empty() => {
                    summary.success_count += 1;
                    log.warning(format!("No data extracted from match {n}"));
                }
                MatchOutcome::Scraped(rows) => {
                    summary.success_count += 1;
                    log.success(format!(
                        "Successfully scraped {} rows from match {n}",
                        rows.len()
                    ));
                    summary.rows.extend(rows);
                }
                MatchOutcome::Skipped(e) => {
                    log.error(format!("Error processing match {n}: {e}"));
                }
            }
        }

        log.success(format!(
            "Season scraping complete: {}/{} matches successful, {} total rows",
            summary.success_count,
            total,
            summary.rows.len()
        ));
        Ok(summary)
    }
}
