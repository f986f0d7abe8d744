//! Time-feature table shared by the sub-forecasters
//!
//! One row per reading, sorted by timestamp, carrying the calendar
//! decomposition of the timestamp and, per metric, the observed value with
//! its trailing moving averages and lags:
//!
//! ```text
//! ts │ hour dow doy month │ weight  ma3  ma7  lag1  lag2 │ temperature ... │ battery
//! ```
//!
//! Moving averages are taken over the present values inside the trailing
//! window (a window with no present value yields `None`); lags are `None`
//! for the first rows and wherever the lagged reading omitted the metric.

use hiveguard_core::constants::{LONG_MOVING_AVERAGE, SHORT_MOVING_AVERAGE};
use hiveguard_core::reading::sort_by_time;
use hiveguard_core::time::CalendarFeatures;
use hiveguard_core::{DataError, DataResult, Metric, SensorReading, Timestamp};

/// A metric's value with its derived momentum features
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lagged {
    pub value: Option<f64>,
    pub ma3: Option<f64>,
    pub ma7: Option<f64>,
    pub lag1: Option<f64>,
    pub lag2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub timestamp: Timestamp,
    pub calendar: CalendarFeatures,
    pub temperature: Lagged,
    pub humidity: Lagged,
    pub weight: Lagged,
    pub battery: Option<f64>,
}

impl TableRow {
    /// Lagged features of a metric; battery carries only its value
    pub fn lagged(&self, metric: Metric) -> Lagged {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Weight => self.weight,
            Metric::BatteryLevel => Lagged {
                value: self.battery,
                ..Lagged::default()
            },
            Metric::GasLevel => Lagged::default(),
        }
    }
}

/// Timestamp-ordered feature table
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFeatureTable {
    rows: Vec<TableRow>,
}

impl TimeFeatureTable {
    /// Build from a history; every reading must carry a timestamp
    pub fn build(history: &[SensorReading]) -> DataResult<Self> {
        if let Some(index) = history.iter().position(|r| r.timestamp.is_none()) {
            return Err(DataError::MissingTimestamp { index });
        }
        let sorted = sort_by_time(history);

        let column = |metric: Metric| -> Vec<Option<f64>> { sorted.iter().map(|r| r.get(metric)).collect() };
        let temperature = lagged_column(&column(Metric::Temperature));
        let humidity = lagged_column(&column(Metric::Humidity));
        let weight = lagged_column(&column(Metric::Weight));

        let rows = sorted
            .iter()
            .enumerate()
            .filter_map(|(i, reading)| {
                let timestamp = reading.timestamp?;
                Some(TableRow {
                    timestamp,
                    calendar: CalendarFeatures::from_timestamp(&timestamp),
                    temperature: temperature[i],
                    humidity: humidity[i],
                    weight: weight[i],
                    battery: reading.battery_level,
                })
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Present values of a metric in time order
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row.lagged(metric).value).collect()
    }

    /// Whether any row carries the metric
    pub fn has(&self, metric: Metric) -> bool {
        self.rows.iter().any(|row| row.lagged(metric).value.is_some())
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.rows.last().map(|row| row.timestamp)
    }
}

fn lagged_column(values: &[Option<f64>]) -> Vec<Lagged> {
    let ma3 = rolling_mean(values, SHORT_MOVING_AVERAGE);
    let ma7 = rolling_mean(values, LONG_MOVING_AVERAGE);
    (0..values.len())
        .map(|i| Lagged {
            value: values[i],
            ma3: ma3[i],
            ma7: ma7[i],
            lag1: lag(values, i, 1),
            lag2: lag(values, i, 2),
        })
        .collect()
}

/// Trailing mean over the present values of each window
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let present: Vec<f64> = values[start..=i].iter().flatten().copied().collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            }
        })
        .collect()
}

fn lag(values: &[Option<f64>], i: usize, k: usize) -> Option<f64> {
    i.checked_sub(k).and_then(|j| values[j])
}
