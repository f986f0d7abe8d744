//! Hive weight forecast
//!
//! A random forest regresses weight on calendar features plus the weight's
//! own moving averages and lag. Projections hold the momentum inputs at
//! their last observed values; predictions are never fed back as inputs.

use chrono::Duration;
use serde::Serialize;

use hiveguard_core::constants::thresholds::{
    STABLE_WEIGHT_CHANGE_KG, WEIGHT_CONFIDENCE_DEFAULT, WEIGHT_CONFIDENCE_MAX, WEIGHT_CONFIDENCE_MIN,
};
use hiveguard_core::constants::{FORECAST_CHECKPOINT_HOURS, MIN_REGRESSION_POINTS};
use hiveguard_core::time::CalendarFeatures;
use hiveguard_core::{Metric, Timestamp, TrendDirection};

use super::table::{TableRow, TimeFeatureTable};
use super::{ForecastError, MetricForecaster};
use crate::regression::{score, RandomForestRegressor, RegressionForestConfig};

/// Table rows required before the weight model is attempted
pub const MIN_WEIGHT_ROWS: usize = 5;

/// Rows with every model input present required to fit
pub const MIN_CLEAN_ROWS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightForecast {
    /// One prediction per forecast day and checkpoint hour
    pub predictions: Vec<f64>,
    /// Timestamp of each prediction's forecast day
    pub dates: Vec<Timestamp>,
    pub trend_direction: TrendDirection,
    pub weight_change: f64,
    pub current_weight: f64,
    pub predicted_final_weight: f64,
    pub confidence: f64,
    pub data_points_used: usize,
}

/// Model inputs of one row, `None` unless every input is present
fn model_inputs(calendar: &CalendarFeatures, ma3: Option<f64>, ma7: Option<f64>, lag1: Option<f64>) -> Option<Vec<f64>> {
    Some(vec![
        calendar.hour as f64,
        calendar.day_of_week as f64,
        calendar.day_of_year as f64,
        calendar.month as f64,
        ma3?,
        ma7?,
        lag1?,
    ])
}

fn clean_row(row: &TableRow) -> Option<(Vec<f64>, f64)> {
    let w = row.weight;
    Some((model_inputs(&row.calendar, w.ma3, w.ma7, w.lag1)?, w.value?))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightForecaster {
    pub forest: RegressionForestConfig,
}

impl WeightForecaster {
    pub fn new(forest: RegressionForestConfig) -> Self {
        Self { forest }
    }
}

impl MetricForecaster for WeightForecaster {
    type Output = WeightForecast;

    fn metric(&self) -> Metric {
        Metric::Weight
    }

    fn forecast(&self, table: &TimeFeatureTable, days: u32) -> Result<WeightForecast, ForecastError> {
        if table.len() < MIN_WEIGHT_ROWS {
            return Err(ForecastError::InsufficientData {
                metric: "weight",
                required: MIN_WEIGHT_ROWS,
                available: table.len(),
            });
        }

        let clean: Vec<(&TableRow, Vec<f64>, f64)> = table
            .rows()
            .iter()
            .filter_map(|row| clean_row(row).map(|(x, y)| (row, x, y)))
            .collect();
        if clean.len() < MIN_CLEAN_ROWS {
            return Err(ForecastError::InsufficientData {
                metric: "weight",
                required: MIN_CLEAN_ROWS,
                available: clean.len(),
            });
        }

        let inputs: Vec<Vec<f64>> = clean.iter().map(|(_, x, _)| x.clone()).collect();
        let targets: Vec<f64> = clean.iter().map(|(_, _, y)| *y).collect();
        let model = RandomForestRegressor::fit(&inputs, &targets, self.forest)
            .map_err(|source| ForecastError::Model { metric: "weight", source })?;

        let Some((last_row, last_inputs, current_weight)) = clean.last() else {
            return Err(ForecastError::MissingMetric("weight"));
        };
        // Momentum inputs held at their last observed values
        let momentum = &last_inputs[4..];

        let mut predictions = Vec::with_capacity(days as usize * FORECAST_CHECKPOINT_HOURS.len());
        let mut dates = Vec::with_capacity(predictions.capacity());
        for day in 0..days {
            let date = last_row.timestamp + Duration::days(i64::from(day) + 1);
            let calendar = CalendarFeatures::from_timestamp(&date);
            for hour in FORECAST_CHECKPOINT_HOURS {
                let mut row = vec![
                    f64::from(hour),
                    f64::from(calendar.day_of_week),
                    f64::from(calendar.day_of_year),
                    f64::from(calendar.month),
                ];
                row.extend_from_slice(momentum);
                predictions.push(
                    model
                        .predict(&row)
                        .map_err(|source| ForecastError::Model { metric: "weight", source })?,
                );
                dates.push(date);
            }
        }

        let predicted_final_weight = predictions.last().copied().unwrap_or(*current_weight);
        let weight_change = predicted_final_weight - current_weight;
        let trend_direction = if weight_change > STABLE_WEIGHT_CHANGE_KG {
            TrendDirection::Increasing
        } else if weight_change < -STABLE_WEIGHT_CHANGE_KG {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        let confidence = if targets.len() >= MIN_REGRESSION_POINTS {
            score(|row| model.predict(row).unwrap_or(f64::NAN), &inputs, &targets)
                .clamp(WEIGHT_CONFIDENCE_MIN, WEIGHT_CONFIDENCE_MAX)
        } else {
            WEIGHT_CONFIDENCE_DEFAULT
        };

        Ok(WeightForecast {
            predictions,
            dates,
            trend_direction,
            weight_change,
            current_weight: *current_weight,
            predicted_final_weight,
            confidence,
            data_points_used: targets.len(),
        })
    }
}
