use serde::Serialize;

use hiveguard_core::constants::thresholds::TEMPERATURE_CONFIDENCE;
use hiveguard_core::constants::FORECAST_CHECKPOINT_HOURS;
use hiveguard_core::{Metric, TrendDirection, TrendSummary};

use super::table::TimeFeatureTable;
use super::{ForecastError, MetricForecaster};
use crate::regression::LinearRegression;

/// Rows with a temperature required to fit
pub const MIN_TEMPERATURE_ROWS: usize = 3;

/// Envelope of one forecast day across the checkpoint hours
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTemperature {
    /// 1-based forecast day
    pub day: u32,
    pub min_temp: f64,
    pub max_temp: f64,
    pub avg_temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureForecast {
    pub daily_predictions: Vec<DailyTemperature>,
    pub trend_direction: TrendDirection,
    pub confidence: f64,
}

/// Linear model of temperature on (hour, day-of-year, month)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureForecaster;

impl MetricForecaster for TemperatureForecaster {
    type Output = TemperatureForecast;

    fn metric(&self) -> Metric {
        Metric::Temperature
    }

    fn forecast(&self, table: &TimeFeatureTable, days: u32) -> Result<TemperatureForecast, ForecastError> {
        let (inputs, targets): (Vec<Vec<f64>>, Vec<f64>) = table
            .rows()
            .iter()
            .filter_map(|row| {
                let c = row.calendar;
                let t = row.temperature.value?;
                Some((vec![f64::from(c.hour), f64::from(c.day_of_year), f64::from(c.month)], t))
            })
            .unzip();

        if targets.len() < MIN_TEMPERATURE_ROWS {
            return Err(ForecastError::InsufficientData {
                metric: "temperature",
                required: MIN_TEMPERATURE_ROWS,
                available: targets.len(),
            });
        }

        let model = LinearRegression::fit(&inputs, &targets)
            .map_err(|source| ForecastError::Model { metric: "temperature", source })?;

        // Last clean row anchors the projection; month is held there
        let (last_doy, last_month) = inputs
            .last()
            .map(|row| (row[1], row[2]))
            .ok_or(ForecastError::MissingMetric("temperature"))?;

        let daily_predictions = (0..days)
            .map(|day| {
                let doy = last_doy + f64::from(day) + 1.0;
                let temps = FORECAST_CHECKPOINT_HOURS
                    .iter()
                    .map(|hour| model.predict(&[f64::from(*hour), doy, last_month]))
                    .collect::<Result<Vec<f64>, _>>()
                    .map_err(|source| ForecastError::Model { metric: "temperature", source })?;

                Ok(DailyTemperature {
                    day: day + 1,
                    min_temp: temps.iter().copied().fold(f64::INFINITY, f64::min),
                    max_temp: temps.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    avg_temp: temps.iter().sum::<f64>() / temps.len() as f64,
                })
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;

        Ok(TemperatureForecast {
            daily_predictions,
            trend_direction: TrendSummary::analyze(&targets).direction,
            confidence: TEMPERATURE_CONFIDENCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiveguard_core::time::from_epoch_millis;
    use hiveguard_core::SensorReading;

    fn table(temps: impl Iterator<Item = f64>) -> TimeFeatureTable {
        let history: Vec<SensorReading> = temps
            .enumerate()
            .map(|(i, t)| {
                SensorReading::new()
                    .with_temperature(t)
                    .at(from_epoch_millis(1_709_532_000_000 + i as i64 * 6 * 3_600_000).unwrap())
            })
            .collect();
        TimeFeatureTable::build(&history).unwrap()
    }

    #[test]
    fn daily_envelope_is_ordered() {
        let forecast = TemperatureForecaster
            .forecast(&table((0..16).map(|i| 30.0 + (i % 4) as f64)), 5)
            .unwrap();

        assert_eq!(forecast.daily_predictions.len(), 5);
        assert_eq!(forecast.confidence, TEMPERATURE_CONFIDENCE);
        for (i, day) in forecast.daily_predictions.iter().enumerate() {
            assert_eq!(day.day, i as u32 + 1);
            assert!(day.min_temp <= day.avg_temp && day.avg_temp <= day.max_temp);
        }
    }

    #[test]
    fn warming_series_extrapolates_upward() {
        let forecast = TemperatureForecaster
            .forecast(&table((0..20).map(|i| 20.0 + 0.5 * i as f64)), 3)
            .unwrap();
        assert_eq!(forecast.trend_direction, TrendDirection::Increasing);
        let days = &forecast.daily_predictions;
        assert!(days[2].avg_temp > days[0].avg_temp);
    }

    #[test]
    fn two_rows_are_not_enough() {
        assert_eq!(
            TemperatureForecaster.forecast(&table([30.0, 31.0].into_iter()), 7),
            Err(ForecastError::InsufficientData { metric: "temperature", required: 3, available: 2 })
        );
    }
}
