//! Shared fixtures for the integration tests
//!
//! Series are deterministic: the same index always yields the same
//! reading, so tests can compare whole outputs across calls.

#![allow(dead_code)]

use hiveguard_core::time::from_epoch_millis;
use hiveguard_core::SensorReading;

/// 2024-03-04T06:00:00Z
pub const SERIES_START_MS: i64 = 1_709_532_000_000;

/// Readings arrive every six hours
pub const CADENCE_MS: i64 = 6 * 3_600_000;

/// A reading inside every threshold band
pub fn nominal_reading(i: usize) -> SensorReading {
    SensorReading::new()
        .with_temperature(33.5 + (i % 6) as f64 * 0.3)
        .with_humidity(57.0 + (i % 5) as f64 * 0.6)
        .with_weight(41.0 + (i % 4) as f64 * 0.25)
        .with_gas_level(0.35 + (i % 3) as f64 * 0.05)
}

/// A batch of nominal readings for training
pub fn training_batch(n: usize) -> Vec<SensorReading> {
    (0..n).map(nominal_reading).collect()
}

/// Timestamped series with steadily rising weight and draining battery
pub fn hive_series(n: usize) -> Vec<SensorReading> {
    (0..n)
        .map(|i| {
            let timestamp = from_epoch_millis(SERIES_START_MS + i as i64 * CADENCE_MS)
                .expect("series timestamp in range");
            SensorReading::new()
                .with_temperature(32.0 + (i % 4) as f64 * 0.8)
                .with_humidity(55.0 + (i % 6) as f64)
                .with_weight(38.0 + 0.15 * i as f64)
                .with_battery_level(96.0 - 0.3 * i as f64)
                .at(timestamp)
        })
        .collect()
}

/// Same series with the battery held at one level
pub fn flat_battery_series(n: usize) -> Vec<SensorReading> {
    hive_series(n)
        .into_iter()
        .map(|reading| reading.with_battery_level(88.0))
        .collect()
}
