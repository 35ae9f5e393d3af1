//! Single/double-candle reversal patterns, gated by a nearby pivot level.
//!
//! Evaluation order is fixed: engulfing, then hammer/hanging-man, then doji.
//! The first match wins. Engulfing and hammer only fire against a level of
//! the matching kind; doji is the ungated fallback and carries no direction.

use strum_macros::Display;

use crate::domain::candle::Candle;
use crate::indicators::pivots::{LevelKind, PivotLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CandlePattern {
    #[strum(serialize = "Bullish Engulfing")]
    BullishEngulfing,
    #[strum(serialize = "Bearish Engulfing")]
    BearishEngulfing,
    #[strum(serialize = "Bullish Hammer")]
    BullishHammer,
    #[strum(serialize = "Bearish Hanging Man")]
    BearishHangingMan,
    Doji,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PatternBias {
    Bullish,
    Bearish,
    Indecision,
}

/// A detected pattern, with the pivot level it formed against (doji may have
/// none).
#[derive(Debug, Clone, Copy)]
pub struct PatternHit {
    pub pattern: CandlePattern,
    pub bias: PatternBias,
    pub level: Option<PivotLevel>,
}

/// Lower wick must be at least this multiple of the body for a hammer shape.
const HAMMER_WICK_BODY_RATIO: f64 = 2.0;

/// Classify the last two candles against an optional nearby level.
pub fn detect_pattern(
    prev: &Candle,
    last: &Candle,
    level: Option<PivotLevel>,
    doji_body_pct: f64,
) -> Option<PatternHit> {
    if let Some(level) = level {
        if let Some(hit) = detect_engulfing(prev, last, level) {
            return Some(hit);
        }
        if let Some(hit) = detect_hammer_family(last, level) {
            return Some(hit);
        }
    }
    detect_doji(last, level, doji_body_pct)
}

fn detect_engulfing(prev: &Candle, last: &Candle, level: PivotLevel) -> Option<PatternHit> {
    let (prev_lo, prev_hi) = prev.body_range();
    let (last_lo, last_hi) = last.body_range();
    let engulfs = last_lo <= prev_lo && prev_hi <= last_hi && last.body() > prev.body();

    if !engulfs {
        return None;
    }

    match level.kind {
        LevelKind::Support if prev.is_bearish() && last.is_bullish() => Some(PatternHit {
            pattern: CandlePattern::BullishEngulfing,
            bias: PatternBias::Bullish,
            level: Some(level),
        }),
        LevelKind::Resistance if prev.is_bullish() && last.is_bearish() => Some(PatternHit {
            pattern: CandlePattern::BearishEngulfing,
            bias: PatternBias::Bearish,
            level: Some(level),
        }),
        _ => None,
    }
}

fn detect_hammer_family(last: &Candle, level: PivotLevel) -> Option<PatternHit> {
    let body = last.body();
    let hammer_shape =
        last.lower_wick() >= HAMMER_WICK_BODY_RATIO * body && last.upper_wick() < body;
    if !hammer_shape {
        return None;
    }

    match level.kind {
        LevelKind::Support => Some(PatternHit {
            pattern: CandlePattern::BullishHammer,
            bias: PatternBias::Bullish,
            level: Some(level),
        }),
        LevelKind::Resistance => Some(PatternHit {
            pattern: CandlePattern::BearishHangingMan,
            bias: PatternBias::Bearish,
            level: Some(level),
        }),
    }
}

fn detect_doji(
    last: &Candle,
    level: Option<PivotLevel>,
    doji_body_pct: f64,
) -> Option<PatternHit> {
    let fraction = last.body_fraction()?;
    (fraction < doji_body_pct).then_some(PatternHit {
        pattern: CandlePattern::Doji,
        bias: PatternBias::Indecision,
        level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(open, high, low, close, 1000.0, 100_000.0)
    }

    fn support(price: f64) -> PivotLevel {
        PivotLevel {
            name: "S1",
            price,
            kind: LevelKind::Support,
        }
    }

    fn resistance(price: f64) -> PivotLevel {
        PivotLevel {
            name: "R1",
            price,
            kind: LevelKind::Resistance,
        }
    }

    #[test]
    fn bullish_engulfing_at_support() {
        // Bearish prev (body 100.5 -> 100.0) fully inside bullish last (99.8 -> 100.8)
        let prev = candle(100.5, 100.7, 99.9, 100.0);
        let last = candle(99.8, 101.0, 99.6, 100.8);
        let hit = detect_pattern(&prev, &last, Some(support(100.0)), 0.10).unwrap();
        assert_eq!(hit.pattern, CandlePattern::BullishEngulfing);
        assert_eq!(hit.bias, PatternBias::Bullish);
        assert_eq!(hit.level.unwrap().name, "S1");
    }

    #[test]
    fn bearish_engulfing_at_resistance() {
        let prev = candle(100.0, 100.7, 99.9, 100.5);
        let last = candle(100.8, 101.0, 99.6, 99.8);
        let hit = detect_pattern(&prev, &last, Some(resistance(100.5)), 0.10).unwrap();
        assert_eq!(hit.pattern, CandlePattern::BearishEngulfing);
        assert_eq!(hit.bias, PatternBias::Bearish);
    }

    #[test]
    fn engulfing_direction_must_match_level_kind() {
        // Bullish engulfing shape at a RESISTANCE level: engulfing stage
        // rejects it, and the shape is no hammer, so only doji could remain.
        let prev = candle(100.5, 100.7, 99.9, 100.0);
        let last = candle(99.8, 101.0, 99.6, 100.8);
        let hit = detect_pattern(&prev, &last, Some(resistance(100.5)), 0.10);
        assert!(hit.is_none());
    }

    #[test]
    fn hammer_at_support_and_hanging_man_at_resistance() {
        // Long lower wick (2.0), small body (0.4), tiny upper wick (0.1)
        let prev = candle(101.0, 101.5, 100.4, 100.5);
        let hammer = candle(100.5, 101.0, 98.5, 100.9);
        assert!(hammer.lower_wick() >= 2.0 * hammer.body());
        assert!(hammer.upper_wick() < hammer.body());

        let hit = detect_pattern(&prev, &hammer, Some(support(100.6)), 0.10).unwrap();
        assert_eq!(hit.pattern, CandlePattern::BullishHammer);
        assert_eq!(hit.bias, PatternBias::Bullish);

        let hit = detect_pattern(&prev, &hammer, Some(resistance(100.6)), 0.10).unwrap();
        assert_eq!(hit.pattern, CandlePattern::BearishHangingMan);
        assert_eq!(hit.bias, PatternBias::Bearish);
    }

    #[test]
    fn engulfing_outranks_hammer() {
        // Last candle both engulfs prev AND has a hammer-ish wick; engulfing
        // is evaluated first and must win.
        let prev = candle(100.4, 100.5, 100.1, 100.2);
        let last = candle(100.0, 100.7, 98.7, 100.6);
        assert!(last.lower_wick() >= 2.0 * last.body());
        let hit = detect_pattern(&prev, &last, Some(support(100.2)), 0.10).unwrap();
        assert_eq!(hit.pattern, CandlePattern::BullishEngulfing);
    }

    #[test]
    fn doji_fires_without_a_level() {
        // Body 0.05 of range 2.0 -> 2.5% < 10%
        let prev = candle(100.0, 100.5, 99.5, 100.2);
        let doji = candle(100.0, 101.0, 99.0, 100.05);
        let hit = detect_pattern(&prev, &doji, None, 0.10).unwrap();
        assert_eq!(hit.pattern, CandlePattern::Doji);
        assert_eq!(hit.bias, PatternBias::Indecision);
        assert!(hit.level.is_none());
    }

    #[test]
    fn ordinary_candle_matches_nothing() {
        let prev = candle(100.0, 100.5, 99.5, 100.2);
        let last = candle(100.2, 101.4, 100.1, 101.2);
        assert!(detect_pattern(&prev, &last, Some(support(100.2)), 0.10).is_none());
        assert!(detect_pattern(&prev, &last, None, 0.10).is_none());
    }

    #[test]
    fn flat_candle_is_not_classified() {
        let prev = candle(100.0, 100.5, 99.5, 100.2);
        let flat = candle(100.0, 100.0, 100.0, 100.0);
        assert!(detect_pattern(&prev, &flat, None, 0.10).is_none());
    }
}
