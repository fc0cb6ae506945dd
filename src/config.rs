//! Scraper settings.
//!
//! Defaults match the politeness settings the site has always been scraped
//! with: a 30 second fetch timeout and a 500ms pause between match pages.
//! Values can come from a YAML file and be overridden on the command line.

use crate::error::ScrapeError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Runtime settings for the fetcher and the season orchestrator.
///
/// ```yaml
/// timeout_ms: 15000
/// delay_ms: 1000
/// user_agent: "my-scraper/1.0"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Per-request fetch deadline in milliseconds.
    pub timeout_ms: u64,
    /// Pause between consecutive match fetches in milliseconds.
    pub delay_ms: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            delay_ms: DEFAULT_DELAY_MS,
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Parse settings from a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ScrapeError> {
        serde_yaml::from_str(yaml).map_err(|e| ScrapeError::Config(e.to_string()))
    }

    /// Load settings from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, ScrapeError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScrapeError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_yaml_str(&raw)?;
        info!(timeout_ms = config.timeout_ms, delay_ms = config.delay_ms, "Loaded configuration");
        Ok(config)
    }

    /// Apply command-line overrides on top of these settings.
    pub fn with_overrides(mut self, timeout_ms: Option<u64>, delay_ms: Option<u64>) -> Self {
        if let Some(t) = timeout_ms {
            self.timeout_ms = t;
        }
        if let Some(d) = delay_ms {
            self.delay_ms = d;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.delay(), Duration::from_millis(500));
        assert!(config.user_agent.starts_with("footy_stats/"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ScraperConfig::from_yaml_str("delay_ms: 1000\n").unwrap();
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = ScraperConfig::from_yaml_str("timeout_ms: soon\n").unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = ScraperConfig::default().with_overrides(Some(100), None);
        assert_eq!(config.timeout_ms, 100);
        assert_eq!(config.delay_ms, DEFAULT_DELAY_MS);
    }
}
