//! Trend Forecaster
//!
//! ## Paths
//!
//! ```text
//! history ──► < 2 readings ────────► simple analysis + "Insufficient data" error
//!        ├──► < min_regression_points ──► simple analysis
//!        └──► time-feature table ──┬─► weight      (random forest)
//!                                  ├─► temperature (linear model)
//!                                  ├─► humidity    (seasonal heuristic)
//!                                  └─► battery     (linear discharge)
//! ```
//!
//! Every regressor is fitted fresh from the supplied history on each call;
//! nothing is cached between calls. Sub-forecasts are independent: one
//! metric failing yields `{ "error": ... }` for that metric only.

mod battery;
mod humidity;
mod table;
mod temperature;
mod weight;

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hiveguard_core::constants::MIN_REGRESSION_POINTS;
use hiveguard_core::reading::{metric_values, sort_by_time};
use hiveguard_core::{Metric, SensorReading, StatisticsSummary, Timestamp, TrendSummary};

use crate::analysis::{overall_analysis, OverallAnalysis};
use crate::regression::RegressionForestConfig;
use crate::MLError;

pub use battery::{BatteryForecast, BatteryForecaster, DaysUntilCritical};
pub use humidity::{seasonal_factor, HumidityForecast, HumidityForecaster, HumidityNoise, NoNoise, SeededGaussian};
pub use table::{rolling_mean, Lagged, TableRow, TimeFeatureTable};
pub use temperature::{DailyTemperature, TemperatureForecast, TemperatureForecaster};
pub use weight::{WeightForecast, WeightForecaster};

/// Message of a bundle built from fewer than two readings
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient data for analysis";

/// Why a single metric could not be forecast
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Insufficient {metric} data: need {required} rows, have {available}")]
    InsufficientData {
        metric: &'static str,
        required: usize,
        available: usize,
    },

    #[error("No {0} readings in history")]
    MissingMetric(&'static str),

    #[error("{metric} model failed: {source}")]
    Model {
        metric: &'static str,
        #[source]
        source: MLError,
    },
}

/// A per-metric forecaster over the shared time-feature table
pub trait MetricForecaster {
    type Output: Serialize;

    /// Metric this forecaster projects
    fn metric(&self) -> Metric;

    fn forecast(&self, table: &TimeFeatureTable, days: u32) -> Result<Self::Output, ForecastError>;
}

/// A sub-forecast, or the reason it is missing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Forecast<T> {
    Ready(T),
    Failed { error: String },
}

impl<T> Forecast<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Forecast::Ready(value) => Some(value),
            Forecast::Failed { .. } => None,
        }
    }
}

/// Sub-forecasts keyed by metric family
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricPredictions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Forecast<WeightForecast>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Forecast<TemperatureForecast>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Forecast<HumidityForecast>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<Forecast<BatteryForecast>>,
}

impl MetricPredictions {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none() && self.temperature.is_none() && self.humidity.is_none() && self.battery.is_none()
    }
}

/// Which path produced a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Statistics and trends only, no regressor
    SimpleAnalysis,
    /// Time-feature table and per-metric forecasters
    Regression,
}

/// Result of one forecasting call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastBundle {
    pub method: ForecastMethod,
    pub forecast_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_observation: Option<Timestamp>,
    #[serde(skip_serializing_if = "MetricPredictions::is_empty")]
    pub predictions: MetricPredictions,
    pub trends: BTreeMap<Metric, TrendSummary>,
    pub statistics: BTreeMap<Metric, StatisticsSummary>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub confidence_scores: BTreeMap<Metric, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_analysis: Option<OverallAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ForecastBundle {
    fn new(method: ForecastMethod, forecast_days: u32) -> Self {
        Self {
            method,
            forecast_days,
            last_observation: None,
            predictions: MetricPredictions::default(),
            trends: BTreeMap::new(),
            statistics: BTreeMap::new(),
            confidence_scores: BTreeMap::new(),
            overall_analysis: None,
            error: None,
        }
    }
}

/// Forecaster configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastConfig {
    /// Readings required before the regressors run
    pub min_regression_points: usize,
    /// Horizon used when a request names none
    pub default_forecast_days: u32,
    /// Largest accepted horizon
    pub max_forecast_days: u32,
    pub weight_forest: RegressionForestConfig,
    pub humidity_noise: SeededGaussian,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_regression_points: MIN_REGRESSION_POINTS,
            default_forecast_days: 7,
            max_forecast_days: 90,
            weight_forest: RegressionForestConfig::default(),
            humidity_noise: SeededGaussian::default(),
        }
    }
}

#[derive(Debug)]
pub struct TrendForecaster {
    config: ForecastConfig,
    weight: WeightForecaster,
    temperature: TemperatureForecaster,
    humidity: HumidityForecaster,
    battery: BatteryForecaster,
}

impl Default for TrendForecaster {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}

impl TrendForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            weight: WeightForecaster::new(config.weight_forest),
            temperature: TemperatureForecaster,
            humidity: HumidityForecaster::new(Box::new(config.humidity_noise)),
            battery: BatteryForecaster,
            config,
        }
    }

    /// Replace the humidity noise source
    pub fn with_humidity_noise(mut self, noise: Box<dyn HumidityNoise>) -> Self {
        self.humidity = HumidityForecaster::new(noise);
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast `horizon_days` days ahead, clamped to `[1, max_forecast_days]`
    pub fn forecast(&self, history: &[SensorReading], horizon_days: u32) -> ForecastBundle {
        let days = horizon_days.clamp(1, self.config.max_forecast_days.max(1));

        if history.len() < 2 {
            let mut bundle = simple_analysis(history, days);
            bundle.error = Some(INSUFFICIENT_DATA_MESSAGE.to_string());
            return bundle;
        }
        if history.len() < self.config.min_regression_points {
            debug!("{} readings, using simple analysis", history.len());
            return simple_analysis(history, days);
        }

        match TimeFeatureTable::build(history) {
            Ok(table) => self.regression_analysis(&table, days),
            Err(e) => {
                warn!("Forecast degraded to simple analysis: {}", e);
                simple_analysis(history, days)
            }
        }
    }

    fn regression_analysis(&self, table: &TimeFeatureTable, days: u32) -> ForecastBundle {
        let mut bundle = ForecastBundle::new(ForecastMethod::Regression, days);
        bundle.last_observation = table.last_timestamp();

        if table.has(Metric::Weight) {
            let forecast = run(&self.weight, table, days);
            if let Some(w) = forecast.ready() {
                bundle.confidence_scores.insert(Metric::Weight, w.confidence);
            }
            bundle.predictions.weight = Some(forecast);
            summarize(&mut bundle, table, Metric::Weight);
        }

        if table.has(Metric::Temperature) {
            let forecast = run(&self.temperature, table, days);
            if let Some(t) = forecast.ready() {
                bundle.confidence_scores.insert(Metric::Temperature, t.confidence);
            }
            bundle.predictions.temperature = Some(forecast);
            summarize(&mut bundle, table, Metric::Temperature);
        }

        if table.has(Metric::Humidity) {
            let forecast = run(&self.humidity, table, days);
            if let Some(h) = forecast.ready() {
                bundle.confidence_scores.insert(Metric::Humidity, h.confidence);
            }
            bundle.predictions.humidity = Some(forecast);
            summarize(&mut bundle, table, Metric::Humidity);
        }

        if table.has(Metric::BatteryLevel) {
            bundle.predictions.battery = Some(run(&self.battery, table, days));
            bundle
                .trends
                .insert(Metric::BatteryLevel, TrendSummary::analyze(&table.values(Metric::BatteryLevel)));
        }

        bundle.overall_analysis = Some(overall_analysis(&bundle.predictions, &bundle.trends));
        bundle
    }
}

fn run<F: MetricForecaster>(forecaster: &F, table: &TimeFeatureTable, days: u32) -> Forecast<F::Output> {
    match forecaster.forecast(table, days) {
        Ok(output) => Forecast::Ready(output),
        Err(e) => {
            debug!("{} forecast unavailable: {}", forecaster.metric().name(), e);
            Forecast::Failed { error: e.to_string() }
        }
    }
}

fn summarize(bundle: &mut ForecastBundle, table: &TimeFeatureTable, metric: Metric) {
    let values = table.values(metric);
    bundle.trends.insert(metric, TrendSummary::analyze(&values));
    if let Ok(stats) = StatisticsSummary::from_values(&values) {
        bundle.statistics.insert(metric, stats);
    }
}

/// Statistics and trend per metric with more than one value
fn simple_analysis(history: &[SensorReading], days: u32) -> ForecastBundle {
    let sorted = sort_by_time(history);
    let mut bundle = ForecastBundle::new(ForecastMethod::SimpleAnalysis, days);
    bundle.last_observation = sorted.iter().filter_map(|r| r.timestamp).last();

    for metric in Metric::TRENDED {
        let values = metric_values(&sorted, metric);
        if values.len() < 2 {
            continue;
        }
        if let Ok(stats) = StatisticsSummary::from_values(&values) {
            bundle.statistics.insert(metric, stats);
        }
        bundle.trends.insert(metric, TrendSummary::analyze(&values));
    }
    bundle
}
