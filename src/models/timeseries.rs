use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::domain::pair_interval::PairInterval;

// ============================================================================
// OhlcvTimeSeries: Raw time series data for a trading pair
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OhlcvTimeSeries {
    pub pair_interval: PairInterval,
    /// Which market-data source produced this series (e.g. "binance")
    pub exchange: String,
    pub first_kline_timestamp_ms: i64,

    // Prices
    pub open_prices: Vec<f64>,
    pub high_prices: Vec<f64>,
    pub low_prices: Vec<f64>,
    pub close_prices: Vec<f64>,

    // Volumes
    pub base_asset_volumes: Vec<f64>,
    pub quote_asset_volumes: Vec<f64>,

    // Stats
    pub pct_gaps: f64,
}

impl OhlcvTimeSeries {
    pub fn get_candle(&self, idx: usize) -> Candle {
        Candle::new(
            self.open_prices[idx],
            self.high_prices[idx],
            self.low_prices[idx],
            self.close_prices[idx],
            self.base_asset_volumes[idx],
            self.quote_asset_volumes[idx],
        )
    }

    pub fn klines(&self) -> usize {
        self.open_prices.len()
    }

    pub fn timestamp_ms_at(&self, idx: usize) -> i64 {
        self.first_kline_timestamp_ms + (idx as i64 * self.pair_interval.interval_ms)
    }

    pub fn last_kline_timestamp_ms(&self) -> i64 {
        self.timestamp_ms_at(self.klines().saturating_sub(1))
    }

    /// Start/end indices (end exclusive) covering the most recent `count`
    /// candles, or the whole series when it is shorter.
    pub fn tail_range(&self, count: usize) -> (usize, usize) {
        let total = self.klines();
        (total.saturating_sub(count), total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TimeUtils;

    fn series(closes: &[f64]) -> OhlcvTimeSeries {
        let n = closes.len();
        OhlcvTimeSeries {
            pair_interval: PairInterval::new("BTCUSDT", TimeUtils::MS_IN_H),
            exchange: "binance".to_string(),
            first_kline_timestamp_ms: 1_000_000,
            open_prices: closes.to_vec(),
            high_prices: closes.iter().map(|c| c + 1.0).collect(),
            low_prices: closes.iter().map(|c| c - 1.0).collect(),
            close_prices: closes.to_vec(),
            base_asset_volumes: vec![1.0; n],
            quote_asset_volumes: vec![100.0; n],
            pct_gaps: 0.0,
        }
    }

    #[test]
    fn timestamps_are_derived_from_first_kline() {
        let ts = series(&[1.0, 2.0, 3.0]);
        assert_eq!(ts.timestamp_ms_at(0), 1_000_000);
        assert_eq!(ts.timestamp_ms_at(2), 1_000_000 + 2 * TimeUtils::MS_IN_H);
        assert_eq!(ts.last_kline_timestamp_ms(), ts.timestamp_ms_at(2));
    }

    #[test]
    fn tail_range_clamps_to_series_length() {
        let ts = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(ts.tail_range(2), (3, 5));
        assert_eq!(ts.tail_range(10), (0, 5));
    }
}
