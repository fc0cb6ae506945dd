//! # footy_stats
//!
//! Scrapes player statistics tables from match pages of a footy statistics
//! site, and expands season pages into the match pages to scrape.
//!
//! ## Pipeline
//!
//! 1. **Expanding**: A season URL (`.../seas/<YYYY>.html`) is fetched and its
//!    match links collected, for the whole season or a single round
//! 2. **Fetching**: Each match page is fetched in turn, with a pause between
//!    requests
//! 3. **Parsing**: Statistics tables are turned into [`Row`]s keyed by the
//!    column names found in each table header
//!
//! Site-specific behaviour plugs in through [`SiteAdapter`]; anything no
//! adapter claims goes through the generic expander and table parser.
//!
//! ```ignore
//! let scraper = Scraper::new(&ScraperConfig::default())?;
//! let request = ScrapeRequest {
//!     url: "https://afltables.com/afl/seas/2024.html".into(),
//!     kind: ScrapeKind::Season,
//!     round_number: Some(1),
//! };
//! let report = scraper.run(&request, ScrapeLog::new()).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod orchestrator;
pub mod outputs;
pub mod progress;
pub mod runner;
pub mod season;
pub mod tables;
pub mod utils;

pub use adapters::{AdapterRegistry, ExpandOptions, FallbackAdapter, SiteAdapter};
pub use config::ScraperConfig;
pub use error::{ScrapeError, ScrapeFailure};
pub use fetcher::{Fetcher, PageFetcher};
pub use models::{Row, ScrapeKind, ScrapeMetadata, ScrapeRequest, ScrapeResult};
pub use orchestrator::{MatchOutcome, SeasonScraper, SeasonSummary, scrape_match};
pub use progress::{LogEvent, LogSink, ScrapeLog, Severity};
pub use runner::{ScrapeReport, Scraper};
