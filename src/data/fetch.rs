// Market-data acquisition: decide source order, then run the chain.

use crate::Cli;
use crate::config::{ANALYSIS, BINANCE};
use crate::data::timeseries::{
    MarketDataSource, TimeSeriesCollection, get_timeseries_data_async,
    binance::BinanceSource,
    serde_version::{SerdeVersion, check_local_data_validity},
};

/// Load the series collection for this run.
///
/// If the local cache fails validation, the API is the only choice; otherwise
/// both sources are available and `--prefer-api` decides which goes first.
pub async fn fetch_market_data(args: &Cli) -> anyhow::Result<(TimeSeriesCollection, &'static str)> {
    let sources: Vec<Box<dyn MarketDataSource>> = {
        let api_first = args.prefer_api;
        match (
            api_first,
            check_local_data_validity(BINANCE.limits.kline_acceptable_age_sec, ANALYSIS.intervals),
        ) {
            (false, Ok(_)) => vec![
                Box::new(SerdeVersion {
                    intervals: ANALYSIS.intervals,
                }),
                Box::new(BinanceSource),
            ], // local first
            (true, Ok(_)) => vec![
                Box::new(BinanceSource),
                Box::new(SerdeVersion {
                    intervals: ANALYSIS.intervals,
                }),
            ], // API first
            (_, Err(e)) => {
                log::warn!("⚠️  Local cache validation failed: {:#}", e);
                log::warn!("⚠️  Falling back to the Binance API...");
                vec![Box::new(BinanceSource)] // API only
            }
        }
    };

    let (timeseries_data, timeseries_signature) = get_timeseries_data_async(&sources).await?;

    log::info!(
        "Retrieved {} series for {} pairs using: {}.",
        timeseries_data.series_data.len(),
        timeseries_data.unique_pair_names().len(),
        timeseries_signature
    );

    Ok((timeseries_data, timeseries_signature))
}
