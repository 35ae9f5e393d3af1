#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::utils::time_utils::how_many_seconds_ago;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use crate::config::KLINE_VERSION;
use crate::data::timeseries::{MarketDataSource, TimeSeriesCollection, cache_file::CacheFile};

/// A cached interval file is usable when it exists, matches the current
/// format version and interval, and is fresh enough.
pub fn check_local_data_validity(recency_required_secs: i64, intervals: &[i64]) -> Result<()> {
    for &interval_ms in intervals {
        let full_path = CacheFile::default_cache_path(interval_ms);

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_serde {
            log::info!("Checking validity of local cache at {:?}...", full_path);
        }
        let cache = CacheFile::load_from_path(&full_path)?;

        // Check version
        if cache.version != KLINE_VERSION {
            bail!(
                "Cache version mismatch: file v{} vs required v{}",
                cache.version,
                KLINE_VERSION
            );
        }

        // Check interval matches
        if cache.interval_ms != interval_ms {
            bail!(
                "Cache interval mismatch: file has {}ms intervals, expected {}ms",
                cache.interval_ms,
                interval_ms
            );
        }

        // Check recency
        let seconds_ago = how_many_seconds_ago(cache.timestamp_ms);
        if seconds_ago > recency_required_secs {
            bail!(
                "Cache too old: created {} seconds ago (limit: {} seconds)",
                seconds_ago,
                recency_required_secs
            );
        }
    }

    Ok(())
}

/// Write downloaded series to one binary cache file per interval.
/// Uses bincode for compact, fast serialization.
pub fn write_timeseries_data_locally(
    timeseries_signature: &'static str,
    timeseries_collection: &TimeSeriesCollection,
    intervals: &[i64],
) -> Result<()> {
    if timeseries_signature != binance_signature() {
        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_serde {
            log::info!("Skipping cache write (data not from the Binance API)");
        }
        return Ok(());
    }

    for &interval_ms in intervals {
        let interval_series: Vec<_> = timeseries_collection
            .series_data
            .iter()
            .filter(|ts| ts.pair_interval.interval_ms == interval_ms)
            .cloned()
            .collect();
        if interval_series.is_empty() {
            continue;
        }

        let subset = TimeSeriesCollection {
            name: timeseries_collection.name.clone(),
            version: timeseries_collection.version,
            series_data: interval_series,
        };

        let full_path = CacheFile::default_cache_path(interval_ms);
        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_serde {
            log::info!("Writing cache to disk: {:?}...", full_path);
        }
        CacheFile::new(interval_ms, subset).save_to_path(&full_path)?;
    }

    Ok(())
}

/// Async wrapper for `write_timeseries_data_locally`.
/// Spawns a blocking task so the caller's runtime thread stays responsive.
pub async fn write_timeseries_data_async(
    timeseries_signature: &'static str,
    timeseries_collection: TimeSeriesCollection,
    intervals: &'static [i64],
) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        write_timeseries_data_locally(timeseries_signature, &timeseries_collection, intervals)
    })
    .await
    .context("Cache write task panicked")?
}

fn binance_signature() -> &'static str {
    crate::data::timeseries::binance::BinanceSource.signature()
}

pub struct SerdeVersion {
    pub intervals: &'static [i64],
}

#[async_trait]
impl MarketDataSource for SerdeVersion {
    fn signature(&self) -> &'static str {
        "Local Cache"
    }

    async fn create_timeseries_data(&self) -> Result<TimeSeriesCollection> {
        let mut merged = TimeSeriesCollection::default();

        for &interval_ms in self.intervals {
            let full_path = CacheFile::default_cache_path(interval_ms);

            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_serde {
                log::info!("Reading cache from: {:?}...", full_path);
            }

            let cache = tokio::task::spawn_blocking(move || CacheFile::load_from_path(&full_path))
                .await
                .context("Deserialization task panicked")?
                .context("Failed to load cache file")?;

            merged.name = cache.data.name;
            merged.version = cache.data.version;
            merged.series_data.extend(cache.data.series_data);
        }

        if merged.series_data.is_empty() {
            bail!("Local cache produced no series");
        }

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_serde {
            log::info!("Cache loaded: {} series", merged.series_data.len());
        }

        Ok(merged)
    }
}
