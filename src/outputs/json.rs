//! JSON output of a finished request.
//!
//! The payload mirrors what the web front end consumes:
//!
//! ```text
//! { "success": true, "data": [...rows], "metadata": {...}, "count": N, "logs": [...] }
//! { "error": "Scraping failed", "message": "...", "logs": [...] }
//! ```
//!
//! It is written to a file when a path is given, otherwise to stdout.

use crate::error::{ScrapeError, ScrapeFailure};
use crate::models::{Row, ScrapeMetadata};
use crate::progress::LogEvent;
use crate::runner::ScrapeReport;
use crate::utils::ensure_writable_dir;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

/// Response body for a successful or failed request.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseBody<'a> {
    Success {
        success: bool,
        data: &'a [Row],
        metadata: &'a ScrapeMetadata,
        count: usize,
        logs: &'a [LogEvent],
    },
    Failure {
        error: &'static str,
        message: String,
        logs: &'a [LogEvent],
    },
}

impl<'a> ResponseBody<'a> {
    pub fn from_report(report: &'a ScrapeReport) -> Self {
        ResponseBody::Success {
            success: true,
            data: &report.result.rows,
            metadata: &report.result.metadata,
            count: report.result.rows.len(),
            logs: &report.logs,
        }
    }

    pub fn from_failure(failure: &'a ScrapeFailure) -> Self {
        ResponseBody::Failure {
            error: "Scraping failed",
            message: failure.error.to_string(),
            logs: &failure.logs,
        }
    }

    pub fn to_json(&self) -> Result<String, ScrapeError> {
        serde_json::to_string_pretty(self).map_err(|e| ScrapeError::Output(e.to_string()))
    }
}

/// Write `body` to `output`, or to stdout when `output` is `None`.
///
/// The parent directory of `output` is created if needed and checked for
/// writability first.
#[instrument(level = "info", skip_all, fields(output = ?output))]
pub async fn write_response(body: &ResponseBody<'_>, output: Option<&Path>) -> Result<(), ScrapeError> {
    let json = body.to_json()?;

    let Some(path) = output else {
        let mut stdout = tokio::io::stdout();
        let written = async {
            stdout.write_all(json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
            Ok::<(), std::io::Error>(())
        };
        return written.await.map_err(|e| ScrapeError::Output(e.to_string()));
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        ensure_writable_dir(dir).await?;
    }

    info!(path = %path.display(), "Writing JSON");
    if let Err(e) = fs::write(path, json).await {
        error!(path = %path.display(), error = %e, "Failed writing JSON");
        return Err(ScrapeError::Output(format!("{}: {e}", path.display())));
    }
    info!(path = %path.display(), "Wrote JSON result");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScrapeKind, ScrapeResult};
    use chrono::Utc;

    fn report() -> ScrapeReport {
        let mut row = Row::new();
        row.insert("Player", "J. Smith");
        row.tag("Richmond", "https://example.com/m.html");
        ScrapeReport {
            result: ScrapeResult {
                rows: vec![row],
                metadata: ScrapeMetadata {
                    url: "https://example.com/m.html".to_string(),
                    kind: ScrapeKind::Match,
                    timestamp: Utc::now(),
                    row_count: 1,
                    match_count: Some(1),
                    success_count: None,
                    year: None,
                    round_number: None,
                },
            },
            logs: Vec::new(),
        }
    }

    #[test]
    fn test_success_body_shape() {
        let report = report();
        let json: serde_json::Value =
            serde_json::from_str(&ResponseBody::from_report(&report).to_json().unwrap()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 1);
        assert_eq!(json["data"][0]["Team"], "Richmond");
        assert_eq!(json["metadata"]["type"], "match");
    }

    #[test]
    fn test_failure_body_shape() {
        let failure = ScrapeFailure {
            error: ScrapeError::YearDetection {
                url: "https://example.com/seas/x.html".to_string(),
            },
            logs: Vec::new(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&ResponseBody::from_failure(&failure).to_json().unwrap()).unwrap();
        assert_eq!(json["error"], "Scraping failed");
        assert!(json["message"].as_str().unwrap().contains("Cannot detect year"));
    }

    #[tokio::test]
    async fn test_write_response_to_file() {
        let dir = std::env::temp_dir().join(format!("footy_stats_out_{}", std::process::id()));
        let path = dir.join("nested").join("result.json");
        let report = report();

        write_response(&ResponseBody::from_report(&report), Some(&path))
            .await
            .unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("J. Smith"));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
