use serde::{Deserialize, Serialize};

use crate::utils::TimeUtils;

/// One (symbol, timeframe) combination, e.g. ("SOLUSDT", 30m).
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub name: String,
    pub interval_ms: i64,
}

impl PairInterval {
    pub fn new(name: impl Into<String>, interval_ms: i64) -> Self {
        PairInterval {
            name: name.into(),
            interval_ms,
        }
    }

    pub fn get_base(text: &str) -> Option<&str> {
        let quote = Self::get_quote(text)?;
        // `strip_suffix` returns `None` if the quote is not actually at the end
        // (malformed pair name).
        text.strip_suffix(quote)
    }

    // Finds the trading quote at the end of the pair name and returns it.
    // Returns None if no matching quote is found.
    pub fn get_quote(text: &str) -> Option<&str> {
        static PAIR_QUOTES: &[&str] = &["USDT", "USDC", "FDUSD", "BTC", "ETH"];
        PAIR_QUOTES
            .iter()
            .find(|&&ext| text.ends_with(ext))
            .copied()
    }

    // The name we pass into the exchange API (not necessarily display name)
    pub fn api_name(&self) -> &str {
        &self.name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short label for log lines and alert titles, e.g. "SOLUSDT 30m".
    pub fn label(&self) -> String {
        format!(
            "{} {}",
            self.name,
            TimeUtils::interval_to_string(self.interval_ms)
        )
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_splitting() {
        assert_eq!(PairInterval::get_quote("SOLUSDT"), Some("USDT"));
        assert_eq!(PairInterval::get_base("SOLUSDT"), Some("SOL"));
        assert_eq!(PairInterval::get_quote("NOQUOTE"), None);
    }

    #[test]
    fn label_renders_interval_shorthand() {
        let pi = PairInterval::new("BTCUSDT", TimeUtils::MS_IN_H);
        assert_eq!(pi.label(), "BTCUSDT 1h");
        assert_eq!(format!("{pi}"), "BTCUSDT 1h");
    }
}
