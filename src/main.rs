//! Command-line front end: scrape one match or season page and print the
//! JSON result (rows, metadata and progress log).
//!
//! ```sh
//! RUST_LOG=debug footy_stats --type season --round 1 https://afltables.com/afl/seas/2024.html
//! ```

use clap::Parser;
use footy_stats::cli::Cli;
use footy_stats::outputs::json::{ResponseBody, write_response};
use footy_stats::{ScrapeLog, Scraper, ScraperConfig};
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => ScraperConfig::load(path).await?,
        None => ScraperConfig::default(),
    }
    .with_overrides(args.timeout_ms, args.delay_ms);
    info!(
        timeout_ms = config.timeout_ms,
        delay_ms = config.delay_ms,
        user_agent = %config.user_agent,
        "footy_stats starting up"
    );

    let scraper = Scraper::new(&config)?;
    let request = args.request();

    let exit = match scraper.run(&request, ScrapeLog::new()).await {
        Ok(report) => {
            write_response(&ResponseBody::from_report(&report), args.output.as_deref()).await?;
            info!(
                rows = report.result.rows.len(),
                "Scrape completed successfully"
            );
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!(error = %failure.error, "Scrape failed");
            write_response(&ResponseBody::from_failure(&failure), args.output.as_deref()).await?;
            ExitCode::FAILURE
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(exit)
}
