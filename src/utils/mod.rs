// Small shared helpers with no domain knowledge
pub mod time_utils;
pub mod vec_utils;

pub use time_utils::TimeUtils;
