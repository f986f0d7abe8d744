//! Sensor readings and historical series
//!
//! A hive node reports a handful of named metrics per transmission. Any of
//! them may be absent: a node without a load cell never sends `weight`, a
//! mains-powered node never sends `batteryLevel`. The reading keeps that
//! absence explicit (`Option<f64>`) and lets each consumer decide between a
//! neutral default (feature extraction) and skipping the point (series
//! statistics).

use serde::{Deserialize, Serialize};

use crate::constants::defaults::{
    DEFAULT_GAS_LEVEL, DEFAULT_HUMIDITY_PCT, DEFAULT_TEMPERATURE_C, DEFAULT_WEIGHT_KG,
};
use crate::time::Timestamp;

/// Recognized telemetry metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Hive temperature (°C)
    #[serde(rename = "temperature")]
    Temperature,
    /// Relative humidity (%)
    #[serde(rename = "humidity")]
    Humidity,
    /// Hive mass (kg)
    #[serde(rename = "weight")]
    Weight,
    /// Gas concentration (unitless ppm scale)
    #[serde(rename = "gasLevel")]
    GasLevel,
    /// Node battery (%)
    #[serde(rename = "batteryLevel")]
    BatteryLevel,
}

impl Metric {
    /// Primary metrics in feature-vector order
    pub const PRIMARY: [Metric; 4] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Weight,
        Metric::GasLevel,
    ];

    /// Metrics summarized by the statistical trend analysis
    pub const TRENDED: [Metric; 4] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Weight,
        Metric::BatteryLevel,
    ];

    /// Wire name of the metric
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Weight => "weight",
            Metric::GasLevel => "gasLevel",
            Metric::BatteryLevel => "batteryLevel",
        }
    }

    /// Neutral value substituted when a reading omits this metric
    pub fn neutral_default(&self) -> Option<f64> {
        match self {
            Metric::Temperature => Some(DEFAULT_TEMPERATURE_C),
            Metric::Humidity => Some(DEFAULT_HUMIDITY_PCT),
            Metric::Weight => Some(DEFAULT_WEIGHT_KG),
            Metric::GasLevel => Some(DEFAULT_GAS_LEVEL),
            Metric::BatteryLevel => None,
        }
    }
}

/// One transmission from a hive node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Hive temperature (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Hive mass (kg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Gas concentration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_level: Option<f64>,
    /// Battery level (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    /// When the reading was taken
    #[serde(
        default,
        with = "crate::time::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<Timestamp>,
}

impl SensorReading {
    /// Builder entry point for tests and fixtures
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature (°C)
    pub fn with_temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }

    /// Set humidity (%)
    pub fn with_humidity(mut self, value: f64) -> Self {
        self.humidity = Some(value);
        self
    }

    /// Set weight (kg)
    pub fn with_weight(mut self, value: f64) -> Self {
        self.weight = Some(value);
        self
    }

    /// Set gas level
    pub fn with_gas_level(mut self, value: f64) -> Self {
        self.gas_level = Some(value);
        self
    }

    /// Set battery level (%)
    pub fn with_battery_level(mut self, value: f64) -> Self {
        self.battery_level = Some(value);
        self
    }

    /// Set timestamp
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Raw value of a metric, if the reading carries it
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Weight => self.weight,
            Metric::GasLevel => self.gas_level,
            Metric::BatteryLevel => self.battery_level,
        }
    }

    /// Value of a metric, falling back to its neutral default
    pub fn value_or_default(&self, metric: Metric) -> f64 {
        self.get(metric)
            .or_else(|| metric.neutral_default())
            .unwrap_or(0.0)
    }
}

/// Sort a series by ascending timestamp.
///
/// The sort is stable; undated readings sort first and keep their relative
/// input order.
pub fn sort_by_time(history: &[SensorReading]) -> Vec<SensorReading> {
    let mut sorted = history.to_vec();
    sorted.sort_by_key(|reading| reading.timestamp);
    sorted
}

/// Present values of one metric, in series order
pub fn metric_values(history: &[SensorReading], metric: Metric) -> Vec<f64> {
    history.iter().filter_map(|reading| reading.get(metric)).collect()
}
