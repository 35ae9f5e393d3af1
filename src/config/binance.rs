//! Binance-specific configuration constants and types.

/// Configuration for Binance REST API client
/// (This is the runtime struct used by the Http Client)
pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: BINANCE.client.timeout_ms,
            retries: BINANCE.client.retries,
            backoff_ms: BINANCE.client.backoff_ms,
        }
    }
}

/// Configuration for REST API Limits and Weights
pub struct RestLimits {
    /// Limit for number of klines returned in a single request
    pub klines_limit: i32,
    /// Cap on total klines kept per (pair, interval) series; paging stops here
    pub max_klines_per_series: usize,
    /// Maximum number of simultaneous Binance API calls allowed per batch
    pub simultaneous_calls_ceiling: usize,
    /// Maximum total number of pair/interval combinations to query
    pub max_lookups_total: usize,
    /// Weight limit per minute as specified in Binance FAQ
    pub weight_limit_minute: u32,
    /// Weight cost for a single kline API call
    pub kline_call_weight: u32,
    /// Maximum age of cached kline data (seconds)
    pub kline_acceptable_age_sec: i64,
}

/// Default values for the Rest Client
pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

/// The Master Configuration Struct
pub struct BinanceConfig {
    pub limits: RestLimits,
    pub client: ClientDefaults,
    pub max_pairs: usize,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    limits: RestLimits {
        klines_limit: 500,
        // Recent window only; the classifier reads the tail of the series
        max_klines_per_series: 500,
        // Theoretical limit is 1000, but 500 is safer for rate limiting
        simultaneous_calls_ceiling: 500,
        max_lookups_total: 1000,
        weight_limit_minute: 6000,
        kline_call_weight: 2,
        // 30 minutes; stale candles make stale alerts
        kline_acceptable_age_sec: 1800,
    },
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 5,
        backoff_ms: 5000,
    },
    max_pairs: 20,
};
