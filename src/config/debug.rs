//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so
//! development builds stay quiet unless a subsystem is being inspected.

pub struct DebugFlags {
    /// Emit detailed serialization/deserialization logs for the kline cache.
    pub print_serde: bool,
    /// Emit per-pair fetch progress and kline counts after download.
    pub print_fetch_summary: bool,
    /// Emit per-series classifier outcomes, including "no signal" results.
    pub print_scan_details: bool,
    /// Emit alert-ledger decisions (fired / suppressed / cooled down).
    pub print_ledger_events: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_serde: false,
    print_fetch_summary: false,
    print_scan_details: false,
    print_ledger_events: false,
};
