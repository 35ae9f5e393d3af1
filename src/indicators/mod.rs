//! Derives the indicator columns the signal classifier consumes.
//!
//! Every column is a `Vec<f64>` aligned 1:1 with the bar series, and every
//! entry depends only on bars at or before its own index.

pub mod obv;
pub mod pivots;
pub mod trend;

pub use pivots::{LevelKind, PivotLevel, PivotLevels};

use crate::config::AnalysisConfig;
use crate::models::timeseries::OhlcvTimeSeries;
use crate::signal::error::{EvalError, Result};

/// Typed indicator columns, replacing name-keyed dataframe lookups.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub obv: Vec<f64>,
    pub obv_ma: Vec<f64>,
    pub atr: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
}

/// Candle count below which classification must not run. OBV only needs a
/// prior bar; each enabled Wilder-smoothed stage needs 2 x its period of
/// warm-up before the exponential seed has decayed enough to trust.
pub fn required_candles(config: &AnalysisConfig) -> usize {
    let mut need = 2;
    if config.classifier.adx_filter {
        need = need.max(2 * config.indicators.adx_period);
    }
    if config.classifier.atr_targets {
        need = need.max(2 * config.indicators.atr_period);
    }
    need
}

impl IndicatorSeries {
    pub fn compute(series: &OhlcvTimeSeries, config: &AnalysisConfig) -> Result<Self> {
        let n = series.klines();
        let need = required_candles(config);
        if n < need {
            return Err(EvalError::InsufficientData { need, got: n });
        }

        let obv = obv::obv(&series.close_prices, &series.base_asset_volumes);
        let obv_ma = obv::ema_span(&obv, config.indicators.ma_period);

        let tr = trend::true_range(
            &series.high_prices,
            &series.low_prices,
            &series.close_prices,
        );
        let atr = trend::wilder_smooth(&tr, config.indicators.atr_period);

        let (plus_dm, minus_dm) =
            trend::directional_movement(&series.high_prices, &series.low_prices);
        // The DI denominators use the ADX-period ATR, which may differ from
        // the target-sizing ATR above.
        let adx_atr = trend::wilder_smooth(&tr, config.indicators.adx_period);
        let plus_di = trend::directional_index(
            &trend::wilder_smooth(&plus_dm, config.indicators.adx_period),
            &adx_atr,
        );
        let minus_di = trend::directional_index(
            &trend::wilder_smooth(&minus_dm, config.indicators.adx_period),
            &adx_atr,
        );
        let dx = trend::dx(&plus_di, &minus_di);
        let adx = trend::wilder_smooth(&dx, config.indicators.adx_period);

        Ok(IndicatorSeries {
            obv,
            obv_ma,
            atr,
            plus_di,
            minus_di,
            dx,
            adx,
        })
    }

    pub fn len(&self) -> usize {
        self.obv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obv.is_empty()
    }

    /// Index of the latest bar.
    pub fn last_index(&self) -> usize {
        self.len() - 1
    }
}
