//! Configuration module for the trend-sentry application.

pub mod analysis;
pub mod binance;
pub mod notify;

mod debug; // Private; use the public re-export crate::config::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

pub mod persistence;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AnalysisConfig};
pub use binance::BINANCE;
pub use notify::NOTIFY;
pub use persistence::{
    KLINE_FILENAME_WITHOUT_EXT, KLINE_PATH, KLINE_VERSION, kline_cache_filename,
};
