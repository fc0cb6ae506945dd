//! Data models for scraped rows and request results.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Row`]: One statistics line, keyed by the column names found in the table header
//! - [`ScrapeKind`] / [`ScrapeRequest`]: What the caller asked for
//! - [`ScrapeMetadata`] / [`ScrapeResult`]: What a finished request hands back
//!
//! Rows serialize as flat JSON objects in column order, which is what the
//! export and display layers consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Column holding the team name, added to every row.
pub const TEAM_COLUMN: &str = "Team";
/// Column holding the page the row was scraped from, added to every row.
pub const SOURCE_URL_COLUMN: &str = "SourceURL";
/// Columns that are never numeric-coerced.
pub const IDENTITY_COLUMNS: [&str; 4] = ["#", "Player", TEAM_COLUMN, SOURCE_URL_COLUMN];

/// A single extracted statistics line.
///
/// Keys keep insertion order: the discovered columns left to right, then
/// `Team` and `SourceURL`. Values are strings until numeric coercion turns
/// numeric cells into JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a row from header names and the matching cell texts.
    pub fn from_cells(columns: &[String], cells: impl IntoIterator<Item = String>) -> Self {
        let mut row = Self::new();
        for (column, cell) in columns.iter().zip(cells) {
            row.insert(column, cell);
        }
        row
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut Value> {
        self.0.get_mut(column)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn team(&self) -> Option<&str> {
        self.get(TEAM_COLUMN).and_then(Value::as_str)
    }

    pub fn source_url(&self) -> Option<&str> {
        self.get(SOURCE_URL_COLUMN).and_then(Value::as_str)
    }

    /// Attach the identity fields every row carries.
    pub fn tag(&mut self, team: &str, source_url: &str) {
        self.insert(TEAM_COLUMN, team);
        self.insert(SOURCE_URL_COLUMN, source_url);
    }
}

/// Whether a request targets one match page or a whole season page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeKind {
    Match,
    Season,
}

impl fmt::Display for ScrapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeKind::Match => f.write_str("match"),
            ScrapeKind::Season => f.write_str("season"),
        }
    }
}

/// A scrape request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ScrapeKind,
    /// Restrict a season scrape to one round.
    pub round_number: Option<u32>,
}

/// Descriptive data about a finished request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeMetadata {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ScrapeKind,
    pub timestamp: DateTime<Utc>,
    pub row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_number: Option<u32>,
}

/// Rows plus metadata for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub rows: Vec<Row>,
    pub metadata: ScrapeMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_keeps_column_order() {
        let columns = vec!["#".to_string(), "Player".to_string(), "Kicks".to_string()];
        let mut row = Row::from_cells(
            &columns,
            vec!["23".to_string(), "J. Smith".to_string(), "5".to_string()],
        );
        row.tag("Richmond", "https://example.com/m.html");

        let cols: Vec<_> = row.columns().collect();
        assert_eq!(cols, vec!["#", "Player", "Kicks", "Team", "SourceURL"]);
        assert_eq!(row.team(), Some("Richmond"));
        assert_eq!(row.source_url(), Some("https://example.com/m.html"));
    }

    #[test]
    fn test_row_serializes_flat() {
        let mut row = Row::new();
        row.insert("Player", "J. Smith");
        row.insert("Kicks", 5);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, json!({"Player": "J. Smith", "Kicks": 5}));
    }

    #[test]
    fn test_request_deserialization() {
        let request: ScrapeRequest = serde_json::from_str(
            r#"{"url": "https://example.com/seas/2024.html", "type": "season", "roundNumber": 3}"#,
        )
        .unwrap();
        assert_eq!(request.kind, ScrapeKind::Season);
        assert_eq!(request.round_number, Some(3));
    }

    #[test]
    fn test_metadata_omits_absent_fields() {
        let metadata = ScrapeMetadata {
            url: "https://example.com/stats/games/2024/a.html".to_string(),
            kind: ScrapeKind::Match,
            timestamp: Utc::now(),
            row_count: 44,
            match_count: Some(1),
            success_count: None,
            year: None,
            round_number: None,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["type"], "match");
        assert_eq!(json["rowCount"], 44);
        assert_eq!(json["matchCount"], 1);
        assert!(json.get("year").is_none());
        assert!(json.get("roundNumber").is_none());
    }
}
