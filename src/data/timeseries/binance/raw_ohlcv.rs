use anyhow::Result;
use std::fmt;

use crate::data::timeseries::binance::bn_kline::AllValidKlines4Pair;
use crate::domain::pair_interval::PairInterval;
use crate::models::OhlcvTimeSeries;
use crate::utils::vec_utils;

// If a series has fewer gaps than this (percent), missing klines are
// forward-filled. Above it, everything up to the last gap is cut off so the
// remaining data is gap-free, at the cost of a shorter series.
const MAX_PCT_MISSING_KLINES_ALLOWED: f64 = 10.0;

/// Interim structure between raw downloaded klines and the dense series the
/// engine consumes: every slot is optional until gap repair has run.
pub struct OhlcvTimeSeriesTemp {
    pub pair_interval: PairInterval,
    pub first_kline_timestamp_ms: i64,

    pub open_prices: Vec<Option<f64>>,
    pub high_prices: Vec<Option<f64>>,
    pub low_prices: Vec<Option<f64>>,
    pub close_prices: Vec<Option<f64>>,

    pub base_asset_volumes: Vec<Option<f64>>,
    pub quote_asset_volumes: Vec<Option<f64>>,

    pub pct_gaps: Option<f64>,
}

#[derive(Debug)]
pub enum KlinesPreparationError {
    TooShort { pair_interval: PairInterval },
}

impl std::error::Error for KlinesPreparationError {}
impl fmt::Display for KlinesPreparationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KlinesPreparationError::TooShort { pair_interval } => {
                write!(f, "{} produced an empty kline set", pair_interval)
            }
        }
    }
}

/// Number of interval slots needed to span first..=last open times.
fn slots_needed(first_ts_ms: i64, last_ts_ms: i64, interval_ms: i64) -> usize {
    debug_assert_eq!((last_ts_ms - first_ts_ms) % interval_ms, 0);
    (((last_ts_ms - first_ts_ms) / interval_ms) + 1) as usize
}

impl TryFrom<AllValidKlines4Pair> for OhlcvTimeSeriesTemp {
    type Error = KlinesPreparationError;

    fn try_from(klines: AllValidKlines4Pair) -> Result<Self, Self::Error> {
        if klines.klines.is_empty() {
            return Err(KlinesPreparationError::TooShort {
                pair_interval: klines.pair_interval,
            });
        }

        let interval_ms = klines.pair_interval.interval_ms;
        let number_klines_needed = slots_needed(
            klines.first_timestamp_ms(),
            klines.last_timestamp_ms(),
            interval_ms,
        );

        let mut time_series = OhlcvTimeSeriesTemp {
            pair_interval: klines.pair_interval.clone(),
            first_kline_timestamp_ms: klines.klines[0].open_timestamp_ms,
            // Initialize all vectors to None; downloaded klines fill their slot
            open_prices: vec![None; number_klines_needed],
            high_prices: vec![None; number_klines_needed],
            low_prices: vec![None; number_klines_needed],
            close_prices: vec![None; number_klines_needed],
            base_asset_volumes: vec![None; number_klines_needed],
            quote_asset_volumes: vec![None; number_klines_needed],
            pct_gaps: None,
        };

        for source_kline in klines.klines {
            let kline_index = ((source_kline.open_timestamp_ms
                - time_series.first_kline_timestamp_ms)
                / interval_ms) as usize;

            debug_assert!(
                kline_index < number_klines_needed,
                "Calculated index {} was not less than {}",
                kline_index,
                number_klines_needed,
            );

            time_series.open_prices[kline_index] = source_kline.open_price;
            time_series.high_prices[kline_index] = source_kline.high_price;
            time_series.close_prices[kline_index] = source_kline.close_price;
            time_series.low_prices[kline_index] = source_kline.low_price;
            time_series.base_asset_volumes[kline_index] = source_kline.base_asset_volume;
            time_series.quote_asset_volumes[kline_index] = source_kline.quote_asset_volume;
        }

        // Decide between forward-filling gaps and cutting them all off
        let open_price_none_pct = vec_utils::count_pct_none_elements(&time_series.open_prices);
        time_series.pct_gaps = Some(open_price_none_pct);
        if open_price_none_pct > MAX_PCT_MISSING_KLINES_ALLOWED {
            #[cfg(debug_assertions)]
            log::info!(
                "{} has {:.2}% gaps, above the {:.2}% limit; cutting off everything up to the last gap.",
                time_series.pair_interval,
                open_price_none_pct,
                MAX_PCT_MISSING_KLINES_ALLOWED,
            );
            let cut_at = vec_utils::find_last_none_index(&time_series.open_prices);
            let removed_count = time_series.open_prices.drain(..cut_at).count();
            time_series.high_prices.drain(..cut_at);
            time_series.low_prices.drain(..cut_at);
            time_series.close_prices.drain(..cut_at);
            time_series.base_asset_volumes.drain(..cut_at);
            time_series.quote_asset_volumes.drain(..cut_at);
            time_series.first_kline_timestamp_ms += removed_count as i64 * interval_ms;
            time_series.pct_gaps = Some(0.0);
        }

        // Forward-fill whatever gaps remain. Prices carry the previous close
        // region forward; volume gaps genuinely mean no trades, so 0.
        let default_volume = 0.0;
        let mut kline_gaps: Vec<u32> = Vec::new();
        for prices in [
            &mut time_series.open_prices,
            &mut time_series.high_prices,
            &mut time_series.low_prices,
            &mut time_series.close_prices,
        ] {
            if vec_utils::has_any_none_elements(prices) {
                // A leading gap cannot occur: index 0 is a real kline
                kline_gaps.push(vec_utils::fill_forward_mut(prices, f64::NAN));
            }
        }
        for volumes in [
            &mut time_series.base_asset_volumes,
            &mut time_series.quote_asset_volumes,
        ] {
            if vec_utils::has_any_none_elements(volumes) {
                kline_gaps.push(vec_utils::fill_forward_mut(volumes, default_volume));
            }
        }

        // Uneven fill counts mean partially-populated klines (e.g. a high
        // without a low), which the fill above would paper over differently
        // per column
        if !vec_utils::are_all_elements_same(&kline_gaps) {
            #[cfg(debug_assertions)]
            log::error!(
                "{} kline gaps are uneven across OHLCV columns: {:?}",
                time_series.pair_interval,
                kline_gaps
            );
        }

        Ok(time_series)
    }
}

impl From<OhlcvTimeSeriesTemp> for OhlcvTimeSeries {
    fn from(old_struct: OhlcvTimeSeriesTemp) -> Self {
        fn dense(column: Vec<Option<f64>>, field: &'static str) -> Vec<f64> {
            column
                .into_iter()
                .map(|val| val.unwrap_or_else(|| panic!("Missing {field} data after gap repair")))
                .collect()
        }

        OhlcvTimeSeries {
            open_prices: dense(old_struct.open_prices, "open_prices"),
            high_prices: dense(old_struct.high_prices, "high_prices"),
            low_prices: dense(old_struct.low_prices, "low_prices"),
            close_prices: dense(old_struct.close_prices, "close_prices"),
            base_asset_volumes: dense(old_struct.base_asset_volumes, "base_asset_volumes"),
            quote_asset_volumes: dense(old_struct.quote_asset_volumes, "quote_asset_volumes"),
            pair_interval: old_struct.pair_interval,
            exchange: super::BINANCE_SIGNATURE_SHORT.to_string(),
            first_kline_timestamp_ms: old_struct.first_kline_timestamp_ms,
            pct_gaps: old_struct.pct_gaps.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::timeseries::binance::bn_kline::BNKline;
    use crate::utils::TimeUtils;

    fn kline(ts: i64, price: f64) -> BNKline {
        BNKline {
            open_timestamp_ms: ts,
            open_price: Some(price),
            high_price: Some(price + 1.0),
            low_price: Some(price - 1.0),
            close_price: Some(price + 0.5),
            base_asset_volume: Some(10.0),
            quote_asset_volume: Some(1000.0),
        }
    }

    #[test]
    fn contiguous_klines_convert_without_gaps() {
        let iv = TimeUtils::MS_IN_H;
        let klines = AllValidKlines4Pair::new(
            vec![kline(0, 100.0), kline(iv, 101.0), kline(2 * iv, 102.0)],
            PairInterval::new("BTCUSDT", iv),
        );
        let temp = OhlcvTimeSeriesTemp::try_from(klines).unwrap();
        assert_eq!(temp.open_prices.len(), 3);
        assert!((temp.pct_gaps.unwrap() - 0.0).abs() < f64::EPSILON);

        let dense: OhlcvTimeSeries = temp.into();
        assert_eq!(dense.klines(), 3);
        assert_eq!(dense.exchange, "binance");
        assert!((dense.close_prices[1] - 101.5).abs() < 1e-12);
    }

    #[test]
    fn small_gap_is_forward_filled() {
        let iv = TimeUtils::MS_IN_H;
        // 11 slots, one missing (index 5): ~9.1% < 10% ceiling
        let mut klines: Vec<BNKline> = (0..11)
            .filter(|i| *i != 5)
            .map(|i| kline(i * iv, 100.0 + i as f64))
            .collect();
        klines.sort_by_key(|k| k.open_timestamp_ms);
        let all = AllValidKlines4Pair::new(klines, PairInterval::new("BTCUSDT", iv));

        let dense: OhlcvTimeSeries = OhlcvTimeSeriesTemp::try_from(all).unwrap().into();
        assert_eq!(dense.klines(), 11);
        // Slot 5 carries slot 4's close forward
        assert!((dense.close_prices[5] - dense.close_prices[4]).abs() < 1e-12);
        assert!(dense.pct_gaps > 0.0);
    }

    #[test]
    fn large_gap_cuts_history_instead_of_filling() {
        let iv = TimeUtils::MS_IN_H;
        // 2 early klines, 8-slot hole, then 10 recent klines: 40% gaps
        let mut klines = vec![kline(0, 100.0), kline(iv, 101.0)];
        for i in 10..20 {
            klines.push(kline(i * iv, 100.0 + i as f64));
        }
        let all = AllValidKlines4Pair::new(klines, PairInterval::new("BTCUSDT", iv));

        let temp = OhlcvTimeSeriesTemp::try_from(all).unwrap();
        // Everything before the last gap is gone; only the clean tail remains
        assert_eq!(temp.open_prices.len(), 10);
        assert_eq!(temp.first_kline_timestamp_ms, 10 * iv);
        assert!(!vec_utils::has_any_none_elements(&temp.open_prices));
    }
}
