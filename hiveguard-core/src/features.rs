//! Feature extraction for anomaly scoring
//!
//! ## Layout
//!
//! A feature vector has one of two fixed shapes:
//!
//! ```text
//! base (4):       [temperature, humidity, weight, gasLevel]
//! trended (7):    [temperature, humidity, weight, gasLevel,
//!                  temp_trend, weight_trend, humidity_trend]
//! ```
//!
//! The trend block is appended only when the caller supplies at least two
//! historical readings. Each trend is the least-squares slope of that
//! metric's last 10 values in the (timestamp-sorted) history, 0.0 when the
//! metric has fewer than two values there.
//!
//! Models fitted on one shape cannot score the other; the detector checks
//! [`FeatureVector::len`] against the fitted width before scoring.

use serde::{Deserialize, Serialize};

use crate::reading::{metric_values, sort_by_time, Metric, SensorReading};
use crate::stats::recent_slope;

/// Number of base features
pub const BASE_FEATURES: usize = 4;

/// Number of features once trends are appended
pub const TRENDED_FEATURES: usize = 7;

/// Names of every feature position, in vector order
pub const FEATURE_NAMES: [&str; TRENDED_FEATURES] = [
    "temperature",
    "humidity",
    "weight",
    "gasLevel",
    "temp_trend",
    "weight_trend",
    "humidity_trend",
];

/// Metrics whose trends are appended, in vector order
const TREND_METRICS: [Metric; 3] = [Metric::Temperature, Metric::Weight, Metric::Humidity];

/// Ordered numeric features of one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap raw values (used by model training on pre-built batches)
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the trend block is present
    pub fn has_trends(&self) -> bool {
        self.0.len() >= TRENDED_FEATURES
    }

    /// Feature values
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value at a named position
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.0.get(i).copied())
    }
}

/// Stateless feature extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Build the feature vector of a reading, with trends when at least two
    /// historical readings are supplied.
    pub fn extract(&self, reading: &SensorReading, history: Option<&[SensorReading]>) -> FeatureVector {
        let mut values: Vec<f64> = Metric::PRIMARY
            .iter()
            .map(|metric| reading.value_or_default(*metric))
            .collect();

        if let Some(history) = history.filter(|h| h.len() >= 2) {
            let sorted = sort_by_time(history);
            values.extend(
                TREND_METRICS
                    .iter()
                    .map(|metric| recent_slope(&metric_values(&sorted, *metric))),
            );
        }

        FeatureVector(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::from_epoch_millis;

    fn hourly(i: i64) -> crate::time::Timestamp {
        from_epoch_millis(1_700_000_000_000 + i * 3_600_000).unwrap()
    }

    #[test]
    fn base_vector_uses_defaults() {
        let extractor = FeatureExtractor::new();
        let features = extractor.extract(&SensorReading::new().with_weight(18.0), None);
        assert_eq!(features.as_slice(), &[20.0, 50.0, 18.0, 0.5]);
        assert!(!features.has_trends());
    }

    #[test]
    fn single_history_point_adds_no_trends() {
        let extractor = FeatureExtractor::new();
        let history = vec![SensorReading::new().with_temperature(30.0)];
        let features = extractor.extract(&SensorReading::new(), Some(&history));
        assert_eq!(features.len(), BASE_FEATURES);
    }

    #[test]
    fn trends_follow_sorted_history() {
        let extractor = FeatureExtractor::new();
        // Delivered out of order; weight rises 0.5 kg per step once sorted
        let mut history: Vec<SensorReading> = (0..6)
            .map(|i| {
                SensorReading::new()
                    .with_temperature(30.0)
                    .with_weight(20.0 + 0.5 * i as f64)
                    .at(hourly(i))
            })
            .collect();
        history.reverse();

        let features = extractor.extract(&SensorReading::new(), Some(&history));
        assert_eq!(features.len(), TRENDED_FEATURES);
        assert_eq!(features.get("temp_trend"), Some(0.0));
        assert!((features.get("weight_trend").unwrap() - 0.5).abs() < 1e-12);
        // No humidity in history
        assert_eq!(features.get("humidity_trend"), Some(0.0));
    }

    #[test]
    fn extraction_is_pure() {
        let extractor = FeatureExtractor::new();
        let reading = SensorReading::new().with_temperature(33.0);
        let history: Vec<SensorReading> = (0..4)
            .map(|i| SensorReading::new().with_humidity(60.0 - i as f64).at(hourly(i)))
            .collect();
        assert_eq!(
            extractor.extract(&reading, Some(&history)),
            extractor.extract(&reading, Some(&history))
        );
    }
}
