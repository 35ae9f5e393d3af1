//! Analysis and signal-classification configuration

use crate::utils::TimeUtils;

/// Periods for the indicator engine
#[derive(Debug, Clone)]
pub struct IndicatorSettings {
    // Span of the exponential MA applied to OBV (alpha = 2 / (span + 1))
    pub ma_period: usize,
    // Wilder period shared by +DI/-DI/ADX (alpha = 1 / period)
    pub adx_period: usize,
    // Wilder period for ATR
    pub atr_period: usize,
}

/// Settings for the signal classifier stages
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    // ADX at or above this value counts as a strong trend
    pub adx_threshold: f64,
    // Fractional OBV-to-MA distance below which a pre-cross warning fires
    // (0.01 corresponds to 1%)
    pub pre_cross_threshold: f64,
    // Fractional close-to-pivot distance for pattern confirmation (0.005 = 0.5%)
    pub level_proximity_pct: f64,
    // Body below this fraction of the full range counts as a doji
    pub doji_body_pct: f64,

    // Stage toggles. Each stage is independent; turning one off removes only
    // that filter from the classification.
    pub adx_filter: bool,
    pub pattern_confirmation: bool,
    pub atr_targets: bool,
}

/// ATR-multiple stop/target sizing, used when `atr_targets` is enabled
#[derive(Debug, Clone)]
pub struct TargetSettings {
    pub sl_multiplier: f64,
    pub tp_reward_ratio: f64,
}

/// The Master Analysis Configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Candle intervals scanned for every pair
    pub intervals: &'static [i64],
    // Minimum number of candles required before a series is classified.
    // Must cover the Wilder warm-up (2 x period) with headroom.
    pub min_candles_for_analysis: usize,

    // Sub-groups
    pub indicators: IndicatorSettings,
    pub classifier: ClassifierSettings,
    pub targets: TargetSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    intervals: &[TimeUtils::MS_IN_30_MIN, TimeUtils::MS_IN_4_H],
    min_candles_for_analysis: 60,

    indicators: IndicatorSettings {
        ma_period: 30,
        adx_period: 14,
        atr_period: 14,
    },

    classifier: ClassifierSettings {
        adx_threshold: 25.0,
        pre_cross_threshold: 0.01,
        level_proximity_pct: 0.005,
        doji_body_pct: 0.10,
        adx_filter: true,
        pattern_confirmation: true,
        atr_targets: true,
    },

    targets: TargetSettings {
        sl_multiplier: 1.5,
        tp_reward_ratio: 2.0,
    },
};
