//! Runtime tunables for tapchess.
//!
//! Every value has a compile-time default and can be overridden at runtime
//! via a dedicated environment variable.

use std::path::PathBuf;
use std::time::Duration;

use session::DEFAULT_TICK_PERIOD;

/// Ticks faster than this would only burn CPU.
const MIN_TICK_MS: u64 = 10;

/// Default directory for the rolling log file.
const DEFAULT_LOG_DIR: &str = "logs";

/// Get the clock tick period.
///
/// Priority:
/// 1. `TAPCHESS_TICK_MS` env variable if set (falls back to default if the
///    value cannot be parsed as a `u64`; clamped to at least 10 ms)
/// 2. [`DEFAULT_TICK_PERIOD`] (one second) as fallback
pub fn get_tick_period() -> Duration {
    tick_period_from(std::env::var("TAPCHESS_TICK_MS").ok().as_deref())
}

fn tick_period_from(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TICK_PERIOD)
        .max(Duration::from_millis(MIN_TICK_MS))
}

/// Get the directory the log file is written to.
///
/// Priority:
/// 1. `TAPCHESS_LOG_DIR` env variable if set
/// 2. `./logs` as fallback
pub fn get_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TAPCHESS_LOG_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}
