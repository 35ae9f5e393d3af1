#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

// Core modules
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod models;
pub mod notify;
pub mod patterns;
pub mod signal;
pub mod utils;

// Re-export commonly used types
pub use data::{TimeSeriesCollection, fetch_market_data};
pub use domain::{Candle, PairInterval};
pub use engine::{ScanOutcome, SentryEngine};
pub use models::OhlcvTimeSeries;
pub use signal::{SignalClassification, SignalClassifier};

use anyhow::Result;

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use API as primary source instead of the local cache
    #[arg(long, default_value_t = false)]
    pub prefer_api: bool,

    /// Keep running and re-poll instead of exiting after one scan
    #[arg(long, default_value_t = false)]
    pub watch: bool,

    /// Seconds between polls in watch mode
    #[arg(long, default_value_t = 300)]
    pub poll_secs: u64,
}

/// One full cycle: fetch series, scan them, deliver the surviving alerts.
pub async fn run_scan_cycle(
    engine: &mut SentryEngine,
    notifiers: &[Box<dyn notify::Notifier>],
    args: &Cli,
) -> Result<ScanOutcome> {
    let (timeseries_data, timeseries_signature) = fetch_market_data(args).await?;

    // Background cache write; the scan does not wait for the disk
    let cache_data = timeseries_data.clone();
    tokio::spawn(async move {
        if let Err(e) = data::write_timeseries_data_async(
            timeseries_signature,
            cache_data,
            config::ANALYSIS.intervals,
        )
        .await
        {
            log::error!("Failed to write kline cache: {:#}", e);
        }
    });

    let outcome = engine.scan(&timeseries_data);
    log::info!(
        "Scan complete: {} evaluated, {} skipped, {} alert(s), {} suppressed by ledger",
        outcome.evaluated,
        outcome.skipped,
        outcome.alerts.len(),
        outcome.suppressed,
    );

    for alert in &outcome.alerts {
        match notify::send_with_fallback(notifiers, &alert.title, &alert.body).await {
            Ok(channel) => log::info!("Delivered via {}: {}", channel, alert.title),
            Err(e) => log::error!("Alert delivery failed for {}: {:#}", alert.title, e),
        }
    }

    Ok(outcome)
}
