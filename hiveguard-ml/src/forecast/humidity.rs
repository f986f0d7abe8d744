//! Humidity heuristic
//!
//! No fitted model: the recent mean is scaled by a seasonal factor of the
//! horizon and perturbed by an injected noise source, then clamped to a
//! valid relative humidity.

use std::f64::consts::PI;
use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use hiveguard_core::constants::thresholds::HUMIDITY_CONFIDENCE;
use hiveguard_core::constants::HUMIDITY_RECENT_WINDOW;
use hiveguard_core::stats::mean;
use hiveguard_core::{Metric, TrendDirection};

use super::table::TimeFeatureTable;
use super::{ForecastError, MetricForecaster};

/// Source of per-day humidity perturbations
pub trait HumidityNoise: Debug + Send + Sync {
    /// One perturbation per forecast day; identical calls return identical
    /// sequences.
    fn perturbations(&self, days: usize) -> Vec<f64>;
}

/// Deterministic smoothing: no perturbation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoNoise;

impl HumidityNoise for NoNoise {
    fn perturbations(&self, days: usize) -> Vec<f64> {
        vec![0.0; days]
    }
}

/// Gaussian perturbations from a fixed seed, re-seeded on every call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeededGaussian {
    pub std_dev: f64,
    pub seed: u64,
}

impl Default for SeededGaussian {
    fn default() -> Self {
        Self { std_dev: 2.0, seed: 42 }
    }
}

impl HumidityNoise for SeededGaussian {
    fn perturbations(&self, days: usize) -> Vec<f64> {
        let Ok(normal) = Normal::new(0.0, self.std_dev) else {
            return vec![0.0; days];
        };
        let mut rng = StdRng::seed_from_u64(self.seed);
        normal.sample_iter(&mut rng).take(days).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HumidityForecast {
    pub predictions: Vec<f64>,
    pub trend_direction: TrendDirection,
    pub confidence: f64,
}

#[derive(Debug)]
pub struct HumidityForecaster {
    noise: Box<dyn HumidityNoise>,
}

impl HumidityForecaster {
    pub fn new(noise: Box<dyn HumidityNoise>) -> Self {
        Self { noise }
    }
}

impl Default for HumidityForecaster {
    fn default() -> Self {
        Self::new(Box::new(SeededGaussian::default()))
    }
}

/// Seasonal factor for a horizon, in [0.85, 1.05]
pub fn seasonal_factor(days: u32) -> f64 {
    0.95 + 0.1 * (2.0 * PI * f64::from(days) / 365.0).sin()
}

impl MetricForecaster for HumidityForecaster {
    type Output = HumidityForecast;

    fn metric(&self) -> Metric {
        Metric::Humidity
    }

    fn forecast(&self, table: &TimeFeatureTable, days: u32) -> Result<HumidityForecast, ForecastError> {
        let values = table.values(Metric::Humidity);
        let recent = &values[values.len().saturating_sub(HUMIDITY_RECENT_WINDOW)..];
        let recent_mean = mean(recent).ok_or(ForecastError::MissingMetric("humidity"))?;

        let base = recent_mean * seasonal_factor(days);
        let predictions = self
            .noise
            .perturbations(days as usize)
            .into_iter()
            .map(|noise| (base + noise).clamp(0.0, 100.0))
            .collect();

        Ok(HumidityForecast {
            predictions,
            trend_direction: TrendDirection::Stable,
            confidence: HUMIDITY_CONFIDENCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiveguard_core::time::from_epoch_millis;
    use hiveguard_core::SensorReading;

    fn table(values: &[f64]) -> TimeFeatureTable {
        let history: Vec<SensorReading> = values
            .iter()
            .enumerate()
            .map(|(i, h)| {
                SensorReading::new()
                    .with_humidity(*h)
                    .at(from_epoch_millis(1_709_532_000_000 + i as i64 * 3_600_000).unwrap())
            })
            .collect();
        TimeFeatureTable::build(&history).unwrap()
    }

    #[test]
    fn smoothing_uses_recent_mean_and_season() {
        // The first two values fall outside the trailing window
        let mut values = vec![0.0, 0.0];
        values.extend(std::iter::repeat(60.0).take(10));

        let forecaster = HumidityForecaster::new(Box::new(NoNoise));
        let forecast = forecaster.forecast(&table(&values), 7).unwrap();

        assert_eq!(forecast.predictions.len(), 7);
        let expected = 60.0 * seasonal_factor(7);
        assert!(forecast.predictions.iter().all(|p| (p - expected).abs() < 1e-9));
        assert_eq!(forecast.trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn predictions_are_clamped() {
        let forecaster = HumidityForecaster::new(Box::new(SeededGaussian { std_dev: 50.0, seed: 3 }));
        let forecast = forecaster.forecast(&table(&[99.0; 12]), 30).unwrap();
        assert!(forecast.predictions.iter().all(|p| (0.0..=100.0).contains(p)));
    }

    #[test]
    fn seeded_noise_is_repeatable() {
        let noise = SeededGaussian::default();
        assert_eq!(noise.perturbations(14), noise.perturbations(14));
        assert_eq!(noise.perturbations(5).len(), 5);
    }

    #[test]
    fn missing_humidity_is_an_error() {
        let history = vec![SensorReading::new().with_weight(30.0).at(from_epoch_millis(0).unwrap())];
        let table = TimeFeatureTable::build(&history).unwrap();
        assert_eq!(
            HumidityForecaster::default().forecast(&table, 7),
            Err(ForecastError::MissingMetric("humidity"))
        );
    }
}
