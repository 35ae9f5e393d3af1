// Define the CandleType enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

// Define the Candle struct with all its properties
#[derive(Debug, Clone, Copy)]
pub struct Candle {
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,

    pub base_volume: f64,
    pub quote_volume: f64,
}

// Implement methods for the Candle struct
impl Candle {
    // A constructor for convenience
    pub fn new(
        open_price: f64,
        high_price: f64,
        low_price: f64,
        close_price: f64,
        base_volume: f64,
        quote_volume: f64,
    ) -> Self {
        Candle {
            open_price,
            high_price,
            low_price,
            close_price,
            base_volume,
            quote_volume,
        }
    }

    // A method to determine the type of candle
    pub fn get_type(&self) -> CandleType {
        if self.close_price >= self.open_price {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.get_type() == CandleType::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.get_type() == CandleType::Bearish
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            CandleType::Bullish => (self.open_price, self.close_price),
            CandleType::Bearish => (self.close_price, self.open_price),
        }
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> f64 {
        (self.close_price - self.open_price).abs()
    }

    /// Full high-to-low extent.
    pub fn range(&self) -> f64 {
        self.high_price - self.low_price
    }

    /// Length of the wick below the body.
    pub fn lower_wick(&self) -> f64 {
        self.body_range().0 - self.low_price
    }

    /// Length of the wick above the body.
    pub fn upper_wick(&self) -> f64 {
        self.high_price - self.body_range().1
    }

    /// Body as a fraction of the full range. None when the candle is flat
    /// (high == low), which would otherwise divide by zero.
    pub fn body_fraction(&self) -> Option<f64> {
        let range = self.range();
        (range > f64::EPSILON).then(|| self.body() / range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(open, high, low, close, 1000.0, 100_000.0)
    }

    #[test]
    fn candle_type_treats_flat_close_as_bullish() {
        assert_eq!(candle(10.0, 11.0, 9.0, 10.5).get_type(), CandleType::Bullish);
        assert_eq!(candle(10.0, 11.0, 9.0, 9.5).get_type(), CandleType::Bearish);
        assert_eq!(candle(10.0, 11.0, 9.0, 10.0).get_type(), CandleType::Bullish);
    }

    #[test]
    fn body_and_wicks() {
        // Bullish: open 10, close 12, high 13, low 9
        let c = candle(10.0, 13.0, 9.0, 12.0);
        assert!((c.body() - 2.0).abs() < f64::EPSILON);
        assert!((c.range() - 4.0).abs() < f64::EPSILON);
        assert!((c.lower_wick() - 1.0).abs() < f64::EPSILON);
        assert!((c.upper_wick() - 1.0).abs() < f64::EPSILON);
        assert_eq!(c.body_range(), (10.0, 12.0));

        // Bearish body range swaps open/close
        let c = candle(12.0, 13.0, 9.0, 10.0);
        assert_eq!(c.body_range(), (10.0, 12.0));
    }

    #[test]
    fn body_fraction_guards_flat_candles() {
        let c = candle(10.0, 10.0, 10.0, 10.0);
        assert!(c.body_fraction().is_none());

        let c = candle(10.0, 14.0, 10.0, 11.0);
        assert!((c.body_fraction().unwrap() - 0.25).abs() < 1e-12);
    }
}
