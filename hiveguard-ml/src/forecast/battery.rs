use serde::{Serialize, Serializer};

use hiveguard_core::constants::thresholds::{BATTERY_CRITICAL_PCT, BATTERY_HORIZON_CAP_DAYS};
use hiveguard_core::constants::MEASUREMENTS_PER_DAY;
use hiveguard_core::stats::linear_fit;
use hiveguard_core::{Metric, TrendDirection};

use super::table::TimeFeatureTable;
use super::{ForecastError, MetricForecaster};

/// Time until the battery reaches the critical level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DaysUntilCritical {
    /// Days at the current discharge rate, capped
    Days(f64),
    /// The battery is not discharging
    Never,
}

impl DaysUntilCritical {
    pub fn days(&self) -> Option<f64> {
        match self {
            DaysUntilCritical::Days(days) => Some(*days),
            DaysUntilCritical::Never => None,
        }
    }
}

impl Serialize for DaysUntilCritical {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DaysUntilCritical::Days(days) => serializer.serialize_f64(*days),
            DaysUntilCritical::Never => serializer.serialize_str("infinite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryForecast {
    pub predictions: Vec<f64>,
    pub discharge_rate_per_day: f64,
    pub current_level: f64,
    pub days_until_critical: DaysUntilCritical,
    pub trend_direction: TrendDirection,
}

/// Linear discharge extrapolation over the battery series index
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatteryForecaster;

impl MetricForecaster for BatteryForecaster {
    type Output = BatteryForecast;

    fn metric(&self) -> Metric {
        Metric::BatteryLevel
    }

    fn forecast(&self, table: &TimeFeatureTable, days: u32) -> Result<BatteryForecast, ForecastError> {
        let values = table.values(Metric::BatteryLevel);
        let fit = linear_fit(&values).map_err(|_| ForecastError::InsufficientData {
            metric: "battery",
            required: 2,
            available: values.len(),
        })?;
        let current_level = values.last().copied().ok_or(ForecastError::MissingMetric("battery"))?;

        // Slope is per reading; readings arrive MEASUREMENTS_PER_DAY times a day
        let rate_per_day = fit.slope * MEASUREMENTS_PER_DAY as f64;

        // Day 0 is the latest reading
        let predictions = (0..days)
            .map(|day| (current_level + rate_per_day * f64::from(day)).max(0.0))
            .collect();

        let days_until_critical = if rate_per_day < 0.0 {
            let days = ((current_level - BATTERY_CRITICAL_PCT) / rate_per_day.abs()).max(0.0);
            DaysUntilCritical::Days(days.min(BATTERY_HORIZON_CAP_DAYS))
        } else {
            DaysUntilCritical::Never
        };

        Ok(BatteryForecast {
            predictions,
            discharge_rate_per_day: rate_per_day,
            current_level,
            days_until_critical,
            trend_direction: if rate_per_day < 0.0 {
                TrendDirection::Decreasing
            } else {
                TrendDirection::Stable
            },
        })
    }
}
