//! Constants for HiveGuard Core
//!
//! Centralized numeric values used throughout the analytics engine. Every
//! decision band, neutral default and window size lives here so the
//! detection and forecasting code reads as rules rather than magic numbers.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Defaults**: neutral values substituted for missing metrics
//! - **Thresholds**: anomaly bands, narrative bands and alert limits
//! - **Windows**: trailing window sizes and forecast cadence

/// Neutral metric values used when a reading omits a metric.
pub mod defaults;

/// Decision bands for anomaly flags, narratives and forecast alerts.
pub mod thresholds;

/// Window sizes and forecast cadence.
pub mod windows;

pub use defaults::{
    DEFAULT_TEMPERATURE_C, DEFAULT_HUMIDITY_PCT, DEFAULT_WEIGHT_KG, DEFAULT_GAS_LEVEL,
};

pub use windows::{
    TREND_WINDOW, SHORT_MOVING_AVERAGE, LONG_MOVING_AVERAGE,
    MEASUREMENTS_PER_DAY, FORECAST_CHECKPOINT_HOURS, MIN_REGRESSION_POINTS,
    HUMIDITY_RECENT_WINDOW,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_windows_are_reachable_from_the_root() {
        assert_eq!(MIN_REGRESSION_POINTS, 10);
        assert_eq!(HUMIDITY_RECENT_WINDOW, 10);
        assert_eq!(FORECAST_CHECKPOINT_HOURS.len(), MEASUREMENTS_PER_DAY);
        assert!(SHORT_MOVING_AVERAGE < LONG_MOVING_AVERAGE);
    }
}
