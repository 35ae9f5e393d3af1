//! Classical pivot-point support/resistance levels.
//!
//! Levels come from the last fully-settled prior bar (index N-2), not the
//! in-progress one, and are recomputed fresh per evaluation.

use crate::domain::candle::Candle;
use crate::models::timeseries::OhlcvTimeSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum LevelKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy)]
pub struct PivotLevel {
    pub name: &'static str,
    pub price: f64,
    pub kind: LevelKind,
}

#[derive(Debug, Clone, Copy)]
pub struct PivotLevels {
    pub s1: f64,
    pub s2: f64,
    pub r1: f64,
    pub r2: f64,
}

impl PivotLevels {
    /// PP = (H+L+C)/3; R1 = 2PP-L; R2 = PP+(H-L); S1 = 2PP-H; S2 = PP-(H-L).
    pub fn from_candle(candle: &Candle) -> Self {
        let (high, low, close) = (candle.high_price, candle.low_price, candle.close_price);
        let pp = (high + low + close) / 3.0;
        PivotLevels {
            s1: 2.0 * pp - high,
            s2: pp - (high - low),
            r1: 2.0 * pp - low,
            r2: pp + (high - low),
        }
    }

    /// Levels from the second-to-last bar of the series. None when the series
    /// is too short to have a settled prior bar.
    pub fn from_series(series: &OhlcvTimeSeries) -> Option<Self> {
        let n = series.klines();
        (n >= 2).then(|| Self::from_candle(&series.get_candle(n - 2)))
    }

    /// Fixed consumption order: S1, S2, R1, R2.
    pub fn ordered(&self) -> [PivotLevel; 4] {
        [
            PivotLevel {
                name: "S1",
                price: self.s1,
                kind: LevelKind::Support,
            },
            PivotLevel {
                name: "S2",
                price: self.s2,
                kind: LevelKind::Support,
            },
            PivotLevel {
                name: "R1",
                price: self.r1,
                kind: LevelKind::Resistance,
            },
            PivotLevel {
                name: "R2",
                price: self.r2,
                kind: LevelKind::Resistance,
            },
        ]
    }

    /// First level (in S1, S2, R1, R2 order) whose relative distance to
    /// `close` is within `proximity_pct`. List order is the tie-break, not
    /// closeness.
    pub fn first_within(&self, close: f64, proximity_pct: f64) -> Option<PivotLevel> {
        self.ordered().into_iter().find(|level| {
            level.price > f64::EPSILON
                && ((close - level.price).abs() / level.price) <= proximity_pct
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior_bar() -> Candle {
        // H=110, L=90, C=105 -> PP = 101.666...
        Candle::new(100.0, 110.0, 90.0, 105.0, 1000.0, 100_000.0)
    }

    #[test]
    fn classical_formulas() {
        let p = PivotLevels::from_candle(&prior_bar());
        let pp = (110.0 + 90.0 + 105.0) / 3.0;
        assert!((p.r1 - (2.0 * pp - 90.0)).abs() < 1e-9);
        assert!((p.r2 - (pp + 20.0)).abs() < 1e-9);
        assert!((p.s1 - (2.0 * pp - 110.0)).abs() < 1e-9);
        assert!((p.s2 - (pp - 20.0)).abs() < 1e-9);
    }

    #[test]
    fn list_order_wins_over_closeness() {
        // Construct levels where S2 is closer to the probe price than S1, but
        // both are within the threshold: S1 must still win.
        let p = PivotLevels {
            s1: 100.0,
            s2: 100.2,
            r1: 150.0,
            r2: 160.0,
        };
        let hit = p.first_within(100.25, 0.01).expect("one level in range");
        assert_eq!(hit.name, "S1");
        assert_eq!(hit.kind, LevelKind::Support);
    }

    #[test]
    fn no_level_outside_threshold() {
        let p = PivotLevels {
            s1: 100.0,
            s2: 95.0,
            r1: 110.0,
            r2: 115.0,
        };
        assert!(p.first_within(105.0, 0.005).is_none());
    }

    #[test]
    fn resistance_found_when_supports_are_far() {
        let p = PivotLevels {
            s1: 90.0,
            s2: 85.0,
            r1: 105.0,
            r2: 110.0,
        };
        let hit = p.first_within(105.3, 0.005).expect("R1 in range");
        assert_eq!(hit.name, "R1");
        assert_eq!(hit.kind, LevelKind::Resistance);
    }
}
