pub mod bn_kline;
pub mod raw_ohlcv;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use bn_kline::AllValidKlines4Pair;
use futures::future::join_all;
use itertools::iproduct;
use rayon::prelude::*;
use tokio::{fs, task::JoinError, task::JoinHandle, time::Instant};

use crate::config::{ANALYSIS, BINANCE, KLINE_VERSION};
use crate::data::timeseries::{MarketDataSource, TimeSeriesCollection};
use crate::domain::pair_interval::PairInterval;
use crate::models::OhlcvTimeSeries;
pub use raw_ohlcv::OhlcvTimeSeriesTemp;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
#[cfg(debug_assertions)]
use crate::utils::time_utils;

/// Tag stamped onto every series this source produces.
pub const BINANCE_SIGNATURE_SHORT: &str = "binance";

pub struct BinanceSource;

#[async_trait]
impl MarketDataSource for BinanceSource {
    fn signature(&self) -> &'static str {
        "Binance API"
    }

    async fn create_timeseries_data(&self) -> Result<TimeSeriesCollection> {
        // Pair list comes from a text file; intervals from the analysis config
        let start_time = Instant::now();

        let series_data = timeseries_data_load(ANALYSIS.intervals).await?;

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_fetch_summary {
            log::info!(
                "Complete timeseries data downloaded for {} valid series.",
                series_data.len(),
            );
            for ts in &series_data {
                log::info!(
                    "{} (from {} to {}) with {} klines and {:.2}% gaps",
                    ts.pair_interval,
                    time_utils::epoch_ms_to_utc(ts.first_kline_timestamp_ms),
                    time_utils::epoch_ms_to_utc(ts.last_kline_timestamp_ms()),
                    ts.klines(),
                    ts.pct_gaps,
                );
            }
        }

        log::info!("Binance download finished in {:?}", start_time.elapsed());

        Ok(TimeSeriesCollection {
            name: "Binance TimeSeries Collection".to_string(),
            version: KLINE_VERSION,
            series_data,
        })
    }
}

/// Read the configured pair list, fan out batched kline downloads for every
/// pair x interval combination, and convert the survivors into dense series.
pub async fn timeseries_data_load(supply_intervals: &[i64]) -> Result<Vec<OhlcvTimeSeries>> {
    let mut all_valid_klines_4_pairs: Vec<AllValidKlines4Pair> = Vec::new();

    let pairs_file_content = fs::read_to_string("pairs.txt").await?;
    let supply_pairs: Vec<String> = pairs_file_content
        .lines()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .take(BINANCE.max_pairs)
        .collect();
    if supply_pairs.is_empty() {
        bail!("pairs.txt contained no usable pair names");
    }

    let all_permutations_vec: Vec<PairInterval> = iproduct!(supply_pairs, supply_intervals)
        .take(BINANCE.limits.max_lookups_total)
        .map(|(pair_name, interval_ms)| PairInterval::new(pair_name, *interval_ms))
        .collect();

    for batch in all_permutations_vec.chunks(BINANCE.limits.simultaneous_calls_ceiling) {
        let batch_size: u32 = batch.len() as u32;

        log::info!("--- Downloading batch of {} series ---", batch.len());
        let start_tasks_time = Instant::now();
        let mut handles: Vec<JoinHandle<Result<AllValidKlines4Pair>>> = Vec::new();
        for pair_interval in batch {
            let handle = tokio::spawn(bn_kline::load_klines(pair_interval.clone(), batch_size));
            handles.push(handle);
        }
        let results: Vec<Result<Result<AllValidKlines4Pair>, JoinError>> = join_all(handles).await;
        log::info!(
            "Batch of {} finished in {:?}",
            results.len(),
            start_tasks_time.elapsed()
        );

        let mut errors = Vec::new();

        for result in results {
            let pair_kline = match result {
                Ok(inner_result) => inner_result,
                Err(e) => {
                    errors.push(format!("Request task failed: {:?}", e));
                    continue;
                }
            };

            // A failed pair is logged and skipped; the rest of the batch
            // stays usable
            let pair_kline = match pair_kline {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("Binance API error for pair: {:#}", e);
                    continue;
                }
            };

            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_fetch_summary {
                log::info!(
                    "{}: {} klines downloaded",
                    pair_kline.pair_interval,
                    pair_kline.klines.len()
                );
            }
            all_valid_klines_4_pairs.push(pair_kline);
        }

        // Task-level failures (panics/cancellations) are critical
        if !errors.is_empty() {
            return Err(anyhow!("Failed to fetch data: {}", errors.join(", ")));
        }
    }

    if all_valid_klines_4_pairs.is_empty() {
        bail!("No series could be downloaded for any configured pair");
    }

    // Convert to dense series in parallel; conversion failures drop the
    // series with a logged error
    let ohlcv_time_series: Vec<OhlcvTimeSeries> = all_valid_klines_4_pairs
        .into_par_iter()
        .map(OhlcvTimeSeriesTemp::try_from)
        .filter_map(|result| match result {
            Ok(ohlcv) => Some(ohlcv),
            Err(e) => {
                log::error!("Error converting series: {}", e);
                None
            }
        })
        .map(|s| s.into())
        .collect();

    if ohlcv_time_series.is_empty() {
        bail!("Every downloaded series failed conversion");
    }

    Ok(ohlcv_time_series)
}
