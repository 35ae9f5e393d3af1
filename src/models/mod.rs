// Data models shared between the fetch layer and the signal engine
pub mod timeseries;

pub use timeseries::OhlcvTimeSeries;
