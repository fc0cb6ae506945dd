//! Site adapters and the registry that picks one per URL.
//!
//! An adapter bundles the two site-specific capabilities the scraper needs:
//! expanding a season URL into match URLs and parsing a page into rows.
//! Both have default implementations backed by the generic season expander
//! and table parser, so an adapter only overrides what its site does
//! differently.
//!
//! The [`AdapterRegistry`] tries adapters in registration order; the first
//! whose [`SiteAdapter::matches`] accepts the URL wins. [`FallbackAdapter`]
//! sits behind every registered adapter and accepts everything, so callers
//! never need to know which path ran.

use crate::error::ScrapeError;
use crate::fetcher::PageFetcher;
use crate::models::Row;
use crate::season;
use crate::tables;
use async_trait::async_trait;
use std::fmt;
use tracing::debug;

/// Options for season expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Only expand this round.
    pub round_number: Option<u32>,
}

/// Site-specific expansion and parsing strategy.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether this adapter handles `url`.
    fn matches(&self, url: &str) -> bool;

    /// Expand a season URL into absolute match URLs, in page order.
    async fn expand_url(
        &self,
        season_url: &str,
        fetcher: &dyn PageFetcher,
        options: ExpandOptions,
    ) -> Result<Vec<String>, ScrapeError> {
        season::expand_season(season_url, fetcher, options.round_number).await
    }

    /// Parse one match page into rows.
    ///
    /// The default reads the `Match Statistics` tables only, so each player
    /// appears once per page with a single column set.
    fn parse_page(&self, html: &str, url: &str) -> Result<Vec<Row>, ScrapeError> {
        Ok(tables::parse_match_stats(html, url))
    }
}

/// Generic strategy used when no registered adapter claims a URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackAdapter;

#[async_trait]
impl SiteAdapter for FallbackAdapter {
    fn name(&self) -> &str {
        "fallback"
    }

    fn matches(&self, _url: &str) -> bool {
        true
    }
}

/// Ordered list of adapters; first match wins.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SiteAdapter>>,
    fallback: FallbackAdapter,
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field(
                "adapters",
                &self.adapters.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterRegistry {
    /// A registry with only the fallback strategy.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
            fallback: FallbackAdapter,
        }
    }

    /// Append an adapter; earlier registrations take precedence.
    pub fn register<A: SiteAdapter + 'static>(&mut self, adapter: A) -> &mut Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// The registered adapter for `url`, if any claims it.
    pub fn find_adapter(&self, url: &str) -> Option<&dyn SiteAdapter> {
        self.adapters
            .iter()
            .find(|a| a.matches(url))
            .map(|a| &**a)
    }

    /// The adapter for `url`, falling back to the generic strategy.
    pub fn resolve(&self, url: &str) -> &dyn SiteAdapter {
        let fallback: &dyn SiteAdapter = &self.fallback;
        let adapter = self.find_adapter(url).unwrap_or(fallback);
        debug!(%url, adapter = adapter.name(), "Resolved adapter");
        adapter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PrefixAdapter {
        name: &'static str,
        prefix: &'static str,
    }

    #[async_trait]
    impl SiteAdapter for PrefixAdapter {
        fn name(&self) -> &str {
            self.name
        }

        fn matches(&self, url: &str) -> bool {
            url.starts_with(self.prefix)
        }

        fn parse_page(&self, _html: &str, url: &str) -> Result<Vec<Row>, ScrapeError> {
            let mut row = Row::new();
            row.tag(self.name, url);
            Ok(vec![row])
        }
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(PrefixAdapter {
                name: "specific",
                prefix: "https://afltables.com/afl/stats/",
            })
            .register(PrefixAdapter {
                name: "broad",
                prefix: "https://afltables.com/",
            });

        assert_eq!(
            registry
                .resolve("https://afltables.com/afl/stats/games/2024/a.html")
                .name(),
            "specific"
        );
        assert_eq!(
            registry.resolve("https://afltables.com/afl/seas/2024.html").name(),
            "broad"
        );
    }

    #[test]
    fn test_unclaimed_url_uses_fallback() {
        let registry = AdapterRegistry::new();
        assert!(registry.find_adapter("https://example.com/").is_none());
        assert_eq!(registry.resolve("https://example.com/").name(), "fallback");
    }

    #[test]
    fn test_default_parse_page_is_table_parser() {
        let html = r#"<table class="sortable"><thead>
            <tr><th colspan="2">Geelong Match Statistics</th></tr>
            <tr><th>#</th><th>Player</th></tr></thead>
            <tbody><tr><td>4</td><td>P. Dangerfield</td></tr></tbody></table>"#;
        let rows = FallbackAdapter.parse_page(html, "https://x/").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team(), Some("Geelong"));
    }

    #[test]
    fn test_default_parse_page_ignores_player_details() {
        let html = r#"<table class="sortable"><thead>
            <tr><th colspan="3">Richmond Match Statistics [Season]</th></tr>
            <tr><th>#</th><th>Player</th><th>Kicks</th></tr></thead>
            <tbody><tr><td>23</td><td>J. Smith</td><td>5</td></tr></tbody></table>
            <table class="sortable"><thead>
            <tr><th colspan="3">Richmond Player Details</th></tr>
            <tr><th>#</th><th>Player</th><th>Games</th></tr></thead>
            <tbody><tr><td>23</td><td>J. Smith</td><td>101</td></tr></tbody></table>"#;

        let rows = FallbackAdapter.parse_page(html, "https://x/").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Kicks"), Some(&serde_json::json!(5)));
        assert!(rows[0].get("Games").is_none());
    }
}
