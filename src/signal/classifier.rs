//! The decision core: folds crossover state, trend strength, pivot/pattern
//! confirmation and pre-cross proximity into at most one classification for
//! the latest bar.
//!
//! One classifier, staged. Each filter (ADX gate, pattern confirmation, ATR
//! target sizing) is an independently toggleable stage of the same function,
//! not a separate variant.

use strum_macros::Display;

use crate::config::AnalysisConfig;
use crate::indicators::{IndicatorSeries, PivotLevels, required_candles};
use crate::models::timeseries::OhlcvTimeSeries;
use crate::patterns::{PatternBias, PatternHit, detect_pattern};
use crate::signal::error::{EvalError, Result};

/// OBV MA magnitudes at or below this are too small for a meaningful
/// relative-distance ratio; the pre-cross stage is skipped instead.
const MA_DISTANCE_GUARD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CrossDirection {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TradeAction {
    #[strum(serialize = "BUY")]
    Buy,
    #[strum(serialize = "SELL")]
    Sell,
    /// No actionable direction; informational alert only.
    Advisory,
}

/// The closed set of mutually exclusive alert categories, highest priority
/// first. The first satisfied category wins; nothing below it fires in the
/// same evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SignalCategory {
    #[strum(serialize = "High-confirmation crossover")]
    HighConfirmation,
    #[strum(serialize = "Crossover")]
    Crossover,
    #[strum(serialize = "Pattern reversal")]
    PatternReversal,
    #[strum(serialize = "Pre-cross warning")]
    PreCross,
}

/// ATR-multiple stop/target attached to actionable classifications.
#[derive(Debug, Clone, Copy)]
pub struct TradePlan {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl TradePlan {
    fn sized(direction: CrossDirection, close: f64, atr: f64, config: &AnalysisConfig) -> Self {
        let risk = atr * config.targets.sl_multiplier;
        let reward = risk * config.targets.tp_reward_ratio;
        match direction {
            CrossDirection::Bullish => TradePlan {
                entry: close,
                stop_loss: close - risk,
                take_profit: close + reward,
            },
            CrossDirection::Bearish => TradePlan {
                entry: close,
                stop_loss: close + risk,
                take_profit: close - reward,
            },
        }
    }
}

/// One classified alert with the numbers the renderer needs.
#[derive(Debug, Clone)]
pub struct SignalClassification {
    pub category: SignalCategory,
    pub action: TradeAction,
    pub direction: Option<CrossDirection>,
    pub obv: f64,
    pub obv_ma: f64,
    /// Fractional |OBV - MA| / |MA|; None when the MA guard suppressed it.
    pub distance_pct: Option<f64>,
    pub adx: Option<f64>,
    pub pattern: Option<PatternHit>,
    pub plan: Option<TradePlan>,
}

/// Everything the pure classification step consumes, already extracted at
/// the latest index. Built by `classify_series` in production; tests can
/// construct it directly.
#[derive(Debug, Clone)]
pub struct ClassifierInputs {
    pub last_close: f64,
    pub prev_obv: f64,
    pub prev_obv_ma: f64,
    pub obv: f64,
    pub obv_ma: f64,
    pub adx: f64,
    pub atr: f64,
    pub pattern: Option<PatternHit>,
}

pub struct SignalClassifier {
    config: AnalysisConfig,
}

impl SignalClassifier {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run the full annotate-then-classify pipeline for one series.
    pub fn classify_series(
        &self,
        series: &OhlcvTimeSeries,
        indicators: &IndicatorSeries,
    ) -> Result<Option<SignalClassification>> {
        let n = series.klines();
        let need = required_candles(&self.config).max(2);
        if n < need {
            return Err(EvalError::InsufficientData { need, got: n });
        }
        debug_assert_eq!(n, indicators.len());

        let last = indicators.last_index();
        let prev = last - 1;

        let pattern = if self.config.classifier.pattern_confirmation {
            let prev_candle = series.get_candle(prev);
            let last_candle = series.get_candle(last);
            let level = PivotLevels::from_series(series).and_then(|pivots| {
                pivots.first_within(
                    last_candle.close_price,
                    self.config.classifier.level_proximity_pct,
                )
            });
            detect_pattern(
                &prev_candle,
                &last_candle,
                level,
                self.config.classifier.doji_body_pct,
            )
        } else {
            None
        };

        let inputs = ClassifierInputs {
            last_close: series.close_prices[last],
            prev_obv: indicators.obv[prev],
            prev_obv_ma: indicators.obv_ma[prev],
            obv: indicators.obv[last],
            obv_ma: indicators.obv_ma[last],
            adx: indicators.adx[last],
            atr: indicators.atr[last],
            pattern,
        };
        Ok(self.classify(&inputs))
    }

    /// The prioritized decision ladder. Pure: same inputs, same answer.
    pub fn classify(&self, inputs: &ClassifierInputs) -> Option<SignalClassification> {
        let flags = &self.config.classifier;

        let cross = self.cross_direction(inputs);
        let distance_pct = self.guarded_distance(inputs);

        if let Some(direction) = cross {
            let strong_trend = flags.adx_filter && inputs.adx >= flags.adx_threshold;
            let bias_confirms = !flags.pattern_confirmation
                || inputs
                    .pattern
                    .is_some_and(|hit| bias_matches(hit.bias, direction));

            let category = if strong_trend && bias_confirms {
                SignalCategory::HighConfirmation
            } else {
                SignalCategory::Crossover
            };
            return Some(self.actionable(category, direction, inputs, distance_pct));
        }

        // No crossover this bar: a confirmed pattern at a pivot level is the
        // next-strongest evidence.
        if let Some(hit) = inputs.pattern {
            if hit.level.is_some() {
                return Some(SignalClassification {
                    category: SignalCategory::PatternReversal,
                    action: TradeAction::Advisory,
                    direction: match hit.bias {
                        PatternBias::Bullish => Some(CrossDirection::Bullish),
                        PatternBias::Bearish => Some(CrossDirection::Bearish),
                        PatternBias::Indecision => None,
                    },
                    obv: inputs.obv,
                    obv_ma: inputs.obv_ma,
                    distance_pct,
                    adx: flags.adx_filter.then_some(inputs.adx),
                    pattern: Some(hit),
                    plan: None,
                });
            }
        }

        // Pre-cross: close to the MA but not yet across it.
        if let Some(distance) = distance_pct {
            if distance <= flags.pre_cross_threshold {
                let direction = if inputs.obv < inputs.obv_ma {
                    // Below and closing in: the pending cross would be upward
                    CrossDirection::Bullish
                } else {
                    CrossDirection::Bearish
                };
                return Some(SignalClassification {
                    category: SignalCategory::PreCross,
                    action: TradeAction::Advisory,
                    direction: Some(direction),
                    obv: inputs.obv,
                    obv_ma: inputs.obv_ma,
                    distance_pct,
                    adx: flags.adx_filter.then_some(inputs.adx),
                    pattern: None,
                    plan: None,
                });
            }
        }

        None
    }

    fn cross_direction(&self, inputs: &ClassifierInputs) -> Option<CrossDirection> {
        if inputs.prev_obv < inputs.prev_obv_ma && inputs.obv > inputs.obv_ma {
            Some(CrossDirection::Bullish)
        } else if inputs.prev_obv > inputs.prev_obv_ma && inputs.obv < inputs.obv_ma {
            Some(CrossDirection::Bearish)
        } else {
            None
        }
    }

    fn guarded_distance(&self, inputs: &ClassifierInputs) -> Option<f64> {
        (inputs.obv_ma.abs() > MA_DISTANCE_GUARD)
            .then(|| (inputs.obv - inputs.obv_ma).abs() / inputs.obv_ma.abs())
    }

    fn actionable(
        &self,
        category: SignalCategory,
        direction: CrossDirection,
        inputs: &ClassifierInputs,
        distance_pct: Option<f64>,
    ) -> SignalClassification {
        let flags = &self.config.classifier;
        let action = match direction {
            CrossDirection::Bullish => TradeAction::Buy,
            CrossDirection::Bearish => TradeAction::Sell,
        };
        let plan = flags.atr_targets.then(|| {
            TradePlan::sized(direction, inputs.last_close, inputs.atr, &self.config)
        });

        SignalClassification {
            category,
            action,
            direction: Some(direction),
            obv: inputs.obv,
            obv_ma: inputs.obv_ma,
            distance_pct,
            adx: flags.adx_filter.then_some(inputs.adx),
            pattern: inputs.pattern,
            plan,
        }
    }
}

fn bias_matches(bias: PatternBias, direction: CrossDirection) -> bool {
    matches!(
        (bias, direction),
        (PatternBias::Bullish, CrossDirection::Bullish)
            | (PatternBias::Bearish, CrossDirection::Bearish)
    )
}
