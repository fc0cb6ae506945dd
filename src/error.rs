//! Error types for fetching, expanding and parsing statistics pages.
//!
//! Every fallible operation in the crate returns [`ScrapeError`]. Season
//! requests that fail fatally hand back a [`ScrapeFailure`], which pairs the
//! error with the log events recorded up to that point so callers can still
//! show partial progress.

use crate::progress::LogEvent;
use thiserror::Error;

/// The failure taxonomy shared by the fetcher, expander, parser and runner.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport-level failure (DNS, connection reset, body decode, ...).
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The fetch deadline elapsed before the page was received.
    #[error("Request timeout after {timeout_ms}ms fetching {url}")]
    Timeout { url: String, timeout_ms: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {reason} ({url})")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    /// Season URL does not end in `/seas/<YYYY>.html`.
    #[error("Cannot detect year from {url}")]
    YearDetection { url: String },

    /// The round anchor is missing, or it has no match links after it.
    #[error("Round {round} not found in {url}")]
    RoundNotFound { round: u32, url: String },

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The request itself is unusable (e.g. no URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl ScrapeError {
    /// A short hint for the user, for the errors that have an obvious fix.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ScrapeError::YearDetection { .. } => {
                Some("Season URL should match pattern: /seas/YYYY.html")
            }
            ScrapeError::RoundNotFound { .. } => {
                Some("Check if the round number exists in the season page")
            }
            _ => None,
        }
    }
}

/// A fatal request error together with every log event emitted before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ScrapeFailure {
    #[source]
    pub error: ScrapeError,
    pub logs: Vec<LogEvent>,
}
