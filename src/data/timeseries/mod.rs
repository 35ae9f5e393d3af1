pub mod binance;
pub mod cache_file;
pub mod serde_version;

use crate::models::OhlcvTimeSeries;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use serde_version::write_timeseries_data_async;

/// A source of candle series: an exchange API, a local cache, anything that
/// can produce a full collection for the configured pairs and intervals.
#[async_trait]
pub trait MarketDataSource {
    // Either produce the series collection OR return an anyhow::error
    async fn create_timeseries_data(&self) -> Result<TimeSeriesCollection>;

    /// A unique identifier for this source (so that afterwards we know which
    /// one was used, and which series came from which exchange).
    fn signature(&self) -> &'static str;
}

/// Try each source in order; first success wins.
pub async fn get_timeseries_data_async(
    sources: &[Box<dyn MarketDataSource>],
) -> Result<(TimeSeriesCollection, &'static str)> {
    for source in sources {
        match source.create_timeseries_data().await {
            Ok(data) => {
                return Ok((data, source.signature()));
            }
            Err(e) => {
                log::info!("Market-data source {} failed: {:#}", source.signature(), e);
                // Continue to the next source
            }
        }
    }
    Err(anyhow!("All market-data sources failed to produce data"))
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct TimeSeriesCollection {
    pub name: String, // Metadata e.g. "Binance TimeSeries Collection"
    pub version: f64,
    pub series_data: Vec<OhlcvTimeSeries>,
}

impl TimeSeriesCollection {
    pub fn unique_pair_names(&self) -> Vec<String> {
        // BTreeSet maintains sorted order and ensures uniqueness
        self.series_data
            .iter()
            .map(|ts| ts.pair_interval.name().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
