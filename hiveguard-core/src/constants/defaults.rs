//! Neutral Metric Defaults
//!
//! Values substituted for metrics a reading does not carry. They sit in the
//! middle of a healthy hive's operating range so a missing metric never
//! raises an anomaly by itself. Callers must not assume zero-defaulting.

/// Temperature used when a reading has none (°C).
pub const DEFAULT_TEMPERATURE_C: f64 = 20.0;

/// Relative humidity used when a reading has none (%).
pub const DEFAULT_HUMIDITY_PCT: f64 = 50.0;

/// Hive mass used when a reading has none (kg).
pub const DEFAULT_WEIGHT_KG: f64 = 10.0;

/// Gas concentration used when a reading has none (unitless ppm scale).
pub const DEFAULT_GAS_LEVEL: f64 = 0.5;
