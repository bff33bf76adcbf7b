//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default lookback window in hours.
pub const HOURS: u32 = 24;

/// Default watch reload interval in seconds (the collector's cadence).
pub const WATCH_INTERVAL_SECS: u64 = 30;

/// Default path written by `init`.
pub const CONFIG_FILE: &str = "net-rewind.toml";

/// Default watch reload interval as Duration.
#[must_use]
pub const fn watch_interval() -> Duration {
    Duration::from_secs(WATCH_INTERVAL_SECS)
}
