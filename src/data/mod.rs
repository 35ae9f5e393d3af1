// Market data loading and caching
pub mod fetch;
pub mod timeseries;

// Re-export commonly used types
pub use fetch::fetch_market_data;
pub use timeseries::{MarketDataSource, TimeSeriesCollection, write_timeseries_data_async};
