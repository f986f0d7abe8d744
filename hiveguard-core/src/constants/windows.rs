//! Window Sizes and Forecast Cadence

/// Trailing points used for a trend slope.
pub const TREND_WINDOW: usize = 10;

/// Short trailing moving average window (points).
pub const SHORT_MOVING_AVERAGE: usize = 3;

/// Long trailing moving average window (points).
pub const LONG_MOVING_AVERAGE: usize = 7;

/// Telemetry cadence assumed by the forecasters: one reading every 6 hours.
pub const MEASUREMENTS_PER_DAY: usize = 4;

/// Intraday hours at which each forecast day is evaluated.
///
/// Hour 24 is kept literally; the regressors see it as a numeric input,
/// never as a wall-clock time.
pub const FORECAST_CHECKPOINT_HOURS: [u32; MEASUREMENTS_PER_DAY] = [6, 12, 18, 24];

/// Minimum series length before the forecaster runs its regressors.
pub const MIN_REGRESSION_POINTS: usize = 10;

/// Trailing points averaged by the humidity heuristic.
pub const HUMIDITY_RECENT_WINDOW: usize = 10;
