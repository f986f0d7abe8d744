//! Integration tests for the trend forecaster

mod common;

use chrono::Duration;
use hiveguard_core::{Metric, SensorReading, TrendDirection};
use hiveguard_ml::forecast::{Forecast, NoNoise};
use hiveguard_ml::{ForecastMethod, TrendForecaster};

use common::{flat_battery_series, hive_series};

fn forecaster() -> TrendForecaster {
    TrendForecaster::default().with_humidity_noise(Box::new(NoNoise))
}

#[test]
fn short_history_gets_statistics_only() {
    let bundle = forecaster().forecast(&hive_series(3), 7);

    assert_eq!(bundle.method, ForecastMethod::SimpleAnalysis);
    assert!(bundle.error.is_none());
    assert!(bundle.predictions.is_empty());
    assert_eq!(bundle.statistics[&Metric::Weight].count, 3);
    assert_eq!(bundle.trends[&Metric::BatteryLevel].direction, TrendDirection::Decreasing);
}

#[test]
fn rising_weight_series_is_forecast() {
    let history = hive_series(30);
    let bundle = forecaster().forecast(&history, 7);

    assert_eq!(bundle.method, ForecastMethod::Regression);
    let weight_trend = bundle.trends[&Metric::Weight];
    assert_eq!(weight_trend.direction, TrendDirection::Increasing);
    assert!(weight_trend.slope > 0.0);
    assert!(weight_trend.strength > 0.99);

    let weight = bundle
        .predictions
        .weight
        .as_ref()
        .and_then(Forecast::ready)
        .expect("weight forecast");
    assert_eq!(weight.predictions.len(), weight.dates.len());
    assert_eq!(weight.dates.len() % 7, 0);
    let last = history.last().and_then(|r| r.timestamp).unwrap();
    assert_eq!(weight.dates[0], last + Duration::days(1));
    assert!((0.3..=0.95).contains(&weight.confidence));
    // A bagged tree ensemble never leaves the observed target range
    assert!(weight.predictions.iter().all(|p| (38.0..=42.4).contains(p)));
}

#[test]
fn every_sub_forecast_spans_the_horizon() {
    let bundle = forecaster().forecast(&hive_series(24), 4);

    let temperature = bundle.predictions.temperature.as_ref().and_then(Forecast::ready).unwrap();
    assert_eq!(temperature.daily_predictions.len(), 4);
    for day in &temperature.daily_predictions {
        assert!(day.min_temp <= day.avg_temp + 1e-9 && day.avg_temp <= day.max_temp + 1e-9);
    }

    let humidity = bundle.predictions.humidity.as_ref().and_then(Forecast::ready).unwrap();
    assert_eq!(humidity.predictions.len(), 4);
    assert!(humidity.predictions.iter().all(|h| (0.0..=100.0).contains(h)));

    let battery = bundle.predictions.battery.as_ref().and_then(Forecast::ready).unwrap();
    assert_eq!(battery.predictions.len(), 4);
    assert!(battery.discharge_rate_per_day < 0.0);
    assert!(battery.days_until_critical.days().is_some());
}

#[test]
fn flat_battery_never_reaches_critical() {
    let bundle = forecaster().forecast(&flat_battery_series(20), 7);
    let json = serde_json::to_value(&bundle).unwrap();

    assert_eq!(json["predictions"]["battery"]["days_until_critical"], "infinite");
    assert_eq!(json["predictions"]["battery"]["discharge_rate_per_day"], 0.0);
    assert_eq!(json["trends"]["batteryLevel"]["direction"], "stable");
}

#[test]
fn forecasting_is_idempotent() {
    // Default humidity noise is seeded per call
    let forecaster = TrendForecaster::default();
    let history = hive_series(26);
    assert_eq!(forecaster.forecast(&history, 5), forecaster.forecast(&history, 5));
}

#[test]
fn delivery_order_does_not_matter() {
    let history = hive_series(28);
    let mut shuffled = history.clone();
    shuffled.reverse();
    shuffled.swap(3, 17);

    let f = forecaster();
    assert_eq!(f.forecast(&history, 3), f.forecast(&shuffled, 3));
}

#[test]
fn bundle_serializes_with_wire_names() {
    let bundle = forecaster().forecast(&hive_series(16), 2);
    let json = serde_json::to_value(&bundle).unwrap();

    assert_eq!(json["method"], "regression");
    assert_eq!(json["forecast_days"], 2);
    assert!(json["last_observation"].is_string());
    for key in ["temperature", "humidity", "weight", "batteryLevel"] {
        assert!(json["trends"][key]["direction"].is_string(), "trend {}", key);
    }
    assert!(json["statistics"]["weight"]["mean"].is_number());
    assert!(json["overall_analysis"]["summary"].is_string());
    assert!(json.get("error").is_none());
}

#[test]
fn missing_metrics_are_skipped() {
    let history: Vec<SensorReading> = hive_series(14)
        .into_iter()
        .map(|r| SensorReading {
            humidity: None,
            battery_level: None,
            ..r
        })
        .collect();
    let bundle = forecaster().forecast(&history, 3);

    assert!(bundle.predictions.humidity.is_none());
    assert!(bundle.predictions.battery.is_none());
    assert!(!bundle.trends.contains_key(&Metric::BatteryLevel));
    assert!(bundle.predictions.weight.is_some());
}
