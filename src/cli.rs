//! Command-line interface definitions for footy_stats.
//!
//! All options can be provided via command-line flags or environment variables.

use crate::models::{ScrapeKind, ScrapeRequest};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the footy_stats scraper.
///
/// # Examples
///
/// ```sh
/// # One match page
/// footy_stats https://afltables.com/afl/stats/games/2024/031420240307.html
///
/// # A whole season, written to a file
/// footy_stats --type season https://afltables.com/afl/seas/2024.html -o season.json
///
/// # One round of a season
/// footy_stats --type season --round 3 https://afltables.com/afl/seas/2024.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Match or season page URL
    pub url: String,

    /// What the URL points at
    #[arg(short = 't', long = "type", value_enum, default_value_t = ScrapeKind::Match)]
    pub kind: ScrapeKind,

    /// Only scrape this round of the season
    #[arg(short, long, env = "FOOTY_STATS_ROUND")]
    pub round: Option<u32>,

    /// Optional path to a YAML settings file
    #[arg(short, long, env = "FOOTY_STATS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fetch timeout in milliseconds (overrides the settings file)
    #[arg(long, env = "FOOTY_STATS_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Pause between match fetches in milliseconds (overrides the settings file)
    #[arg(long, env = "FOOTY_STATS_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn request(&self) -> ScrapeRequest {
        ScrapeRequest {
            url: self.url.clone(),
            kind: self.kind,
            round_number: self.round,
        }
    }
}
