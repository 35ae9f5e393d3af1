pub mod core;
pub mod ledger;

// Re-export key components
pub use core::{AlertEvent, ScanOutcome, SentryEngine};
pub use ledger::{AlertKey, AlertLedger};
