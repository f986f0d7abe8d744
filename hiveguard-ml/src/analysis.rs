//! Analysis Aggregator
//!
//! Pure functions that turn the detector's and forecaster's numeric output
//! into alerts, details and recommendations. No model state is read or
//! written here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hiveguard_core::constants::thresholds::{
    ALERT_BATTERY_DAYS, ALERT_WEIGHT_GAIN_KG, ALERT_WEIGHT_LOSS_KG, NARRATIVE_HUMIDITY_HIGH_PCT,
    NARRATIVE_HUMIDITY_LOW_PCT, NARRATIVE_TEMP_HIGH_C, NARRATIVE_TEMP_LOW_C, NARRATIVE_WEIGHT_LOW_KG,
};
use hiveguard_core::{Metric, SensorReading, TrendDirection, TrendSummary};

use crate::forecast::{Forecast, MetricPredictions};

/// Explanation attached to a detection result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAnalysis {
    pub summary: String,
    pub details: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Cross-metric summary attached to a forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallAnalysis {
    pub summary: String,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Narrative for a detection verdict
pub fn anomaly_narrative(reading: &SensorReading, is_anomaly: bool, confidence: f64) -> AnomalyAnalysis {
    if !is_anomaly {
        return AnomalyAnalysis {
            summary: "Normal sensor readings".to_string(),
            details: vec!["All parameters within normal range".to_string()],
            recommendations: Vec::new(),
        };
    }

    let mut analysis = AnomalyAnalysis {
        summary: format!("Anomaly detected with {:.1}% confidence", confidence * 100.0),
        ..AnomalyAnalysis::default()
    };
    let mut note = |detail: String, recommendation: &str| {
        analysis.details.push(detail);
        analysis.recommendations.push(recommendation.to_string());
    };

    let temp = reading.value_or_default(Metric::Temperature);
    if temp > NARRATIVE_TEMP_HIGH_C {
        note(format!("High temperature: {}°C", temp), "Check hive ventilation");
    } else if temp < NARRATIVE_TEMP_LOW_C {
        note(format!("Low temperature: {}°C", temp), "Check hive insulation");
    }

    let humidity = reading.value_or_default(Metric::Humidity);
    if humidity > NARRATIVE_HUMIDITY_HIGH_PCT {
        note(format!("High humidity: {}%", humidity), "Improve hive ventilation");
    } else if humidity < NARRATIVE_HUMIDITY_LOW_PCT {
        note(format!("Low humidity: {}%", humidity), "Check water sources");
    }

    let weight = reading.value_or_default(Metric::Weight);
    if weight < NARRATIVE_WEIGHT_LOW_KG {
        note(format!("Low weight: {}kg", weight), "Check bee population and food sources");
    }

    analysis
}

/// Alerts and recommendations over a forecast's predictions and trends
pub fn overall_analysis(
    predictions: &MetricPredictions,
    trends: &BTreeMap<Metric, TrendSummary>,
) -> OverallAnalysis {
    let mut analysis = OverallAnalysis::default();

    if let Some(weight) = predictions.weight.as_ref().and_then(Forecast::ready) {
        if weight.weight_change < ALERT_WEIGHT_LOSS_KG {
            analysis.alerts.push("Significant weight loss predicted".to_string());
            analysis
                .recommendations
                .push("Monitor bee population and food sources".to_string());
        } else if weight.weight_change > ALERT_WEIGHT_GAIN_KG {
            analysis.alerts.push("Significant weight gain predicted".to_string());
            analysis
                .recommendations
                .push("Check for honey production opportunity".to_string());
        }
    }

    match trends.get(&Metric::Temperature).map(|t| t.direction) {
        Some(TrendDirection::Increasing) => analysis.recommendations.push("Monitor hive ventilation".to_string()),
        Some(TrendDirection::Decreasing) => analysis.recommendations.push("Check hive insulation".to_string()),
        _ => {}
    }

    let battery_days = predictions
        .battery
        .as_ref()
        .and_then(Forecast::ready)
        .and_then(|b| b.days_until_critical.days());
    if let Some(days) = battery_days.filter(|d| *d < ALERT_BATTERY_DAYS) {
        analysis.alerts.push(format!("Battery critical in {:.0} days", days));
        analysis.recommendations.push("Schedule battery replacement".to_string());
    }

    analysis.summary = match analysis.alerts.len() {
        0 => "All parameters within expected ranges".to_string(),
        n => format!("{} alert(s) detected requiring attention", n),
    };
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{BatteryForecast, DaysUntilCritical, WeightForecast};

    fn weight(change: f64) -> Forecast<WeightForecast> {
        Forecast::Ready(WeightForecast {
            predictions: vec![40.0 + change],
            dates: Vec::new(),
            trend_direction: TrendDirection::from_slope(change),
            weight_change: change,
            current_weight: 40.0,
            predicted_final_weight: 40.0 + change,
            confidence: 0.6,
            data_points_used: 12,
        })
    }

    fn battery(days: DaysUntilCritical) -> Forecast<BatteryForecast> {
        Forecast::Ready(BatteryForecast {
            predictions: vec![50.0],
            discharge_rate_per_day: -1.0,
            current_level: 51.0,
            days_until_critical: days,
            trend_direction: TrendDirection::Decreasing,
        })
    }

    fn trend(direction: TrendDirection) -> TrendSummary {
        TrendSummary { direction, slope: 0.0, strength: 0.0, volatility: 0.0 }
    }

    #[test]
    fn hot_anomaly_narrative() {
        let reading = SensorReading::new().with_temperature(45.0).with_weight(3.0);
        let analysis = anomaly_narrative(&reading, true, 0.8);

        assert_eq!(analysis.summary, "Anomaly detected with 80.0% confidence");
        assert_eq!(analysis.details, vec!["High temperature: 45°C", "Low weight: 3kg"]);
        assert_eq!(
            analysis.recommendations,
            vec!["Check hive ventilation", "Check bee population and food sources"]
        );
    }

    #[test]
    fn dry_cold_anomaly_narrative() {
        let reading = SensorReading::new().with_temperature(4.5).with_humidity(15.0);
        let analysis = anomaly_narrative(&reading, true, 0.25);
        assert_eq!(analysis.summary, "Anomaly detected with 25.0% confidence");
        assert_eq!(analysis.details, vec!["Low temperature: 4.5°C", "Low humidity: 15%"]);
        assert_eq!(analysis.recommendations, vec!["Check hive insulation", "Check water sources"]);
    }

    #[test]
    fn normal_narrative_is_fixed() {
        let analysis = anomaly_narrative(&SensorReading::new().with_temperature(45.0), false, 0.2);
        assert_eq!(analysis.summary, "Normal sensor readings");
        assert_eq!(analysis.details, vec!["All parameters within normal range"]);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn weight_loss_and_battery_alerts() {
        let predictions = MetricPredictions {
            weight: Some(weight(-3.0)),
            battery: Some(battery(DaysUntilCritical::Days(12.4))),
            ..MetricPredictions::default()
        };
        let mut trends = BTreeMap::new();
        trends.insert(Metric::Temperature, trend(TrendDirection::Decreasing));

        let analysis = overall_analysis(&predictions, &trends);
        assert_eq!(
            analysis.alerts,
            vec!["Significant weight loss predicted", "Battery critical in 12 days"]
        );
        assert_eq!(
            analysis.recommendations,
            vec![
                "Monitor bee population and food sources",
                "Check hive insulation",
                "Schedule battery replacement"
            ]
        );
        assert_eq!(analysis.summary, "2 alert(s) detected requiring attention");
    }

    #[test]
    fn quiet_forecast() {
        let predictions = MetricPredictions {
            weight: Some(weight(1.0)),
            battery: Some(battery(DaysUntilCritical::Never)),
            ..MetricPredictions::default()
        };
        let analysis = overall_analysis(&predictions, &BTreeMap::new());
        assert!(analysis.alerts.is_empty());
        assert_eq!(analysis.summary, "All parameters within expected ranges");
    }

    #[test]
    fn weight_gain_and_warming() {
        let predictions = MetricPredictions {
            weight: Some(weight(6.0)),
            ..MetricPredictions::default()
        };
        let mut trends = BTreeMap::new();
        trends.insert(Metric::Temperature, trend(TrendDirection::Increasing));

        let analysis = overall_analysis(&predictions, &trends);
        assert_eq!(analysis.alerts, vec!["Significant weight gain predicted"]);
        assert_eq!(
            analysis.recommendations,
            vec!["Check for honey production opportunity", "Monitor hive ventilation"]
        );
    }

    #[test]
    fn failed_sub_forecasts_raise_nothing() {
        let predictions = MetricPredictions {
            weight: Some(Forecast::Failed { error: "Insufficient weight data".to_string() }),
            ..MetricPredictions::default()
        };
        let analysis = overall_analysis(&predictions, &BTreeMap::new());
        assert!(analysis.alerts.is_empty());
        assert!(analysis.recommendations.is_empty());
    }
}
