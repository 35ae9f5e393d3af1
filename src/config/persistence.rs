//! File persistence and serialization configuration

/// Directory path for storing kline data
pub const KLINE_PATH: &str = "kline_data";

/// Base filename for kline data files (without extension)
pub const KLINE_FILENAME_WITHOUT_EXT: &str = "kline";

/// Current version of the kline data serialization format
pub const KLINE_VERSION: f64 = 1.0;

use crate::utils::TimeUtils;

/// Generate interval-specific cache filename
/// Example: "kline_1h_v1.0.bin" or "kline_15m_v1.0.bin"
pub fn kline_cache_filename(interval_ms: i64) -> String {
    let interval_str = TimeUtils::interval_to_string(interval_ms);
    format!(
        "{}_{}_v{}.bin",
        KLINE_FILENAME_WITHOUT_EXT, interval_str, KLINE_VERSION
    )
}
