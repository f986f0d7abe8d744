//! JSON invocation boundary
//!
//! Each handler takes the raw request text and always returns a JSON
//! object. Malformed requests are answered with an error-fallback object
//! carrying safe default fields instead of an error.
//!
//! | Handler         | Request                                   |
//! |-----------------|-------------------------------------------|
//! | [`detect_json`]   | `{sensorData, historicalData?}`           |
//! | [`forecast_json`] | `{historicalData, forecastDays?}`         |
//! | [`train_json`]    | `{trainingData}`                          |

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use hiveguard_core::SensorReading;

use crate::detector::AnomalyDetector;
use crate::forecast::TrendForecaster;

/// Detection request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRequest {
    #[serde(default)]
    pub sensor_data: SensorReading,
    #[serde(default)]
    pub historical_data: Option<Vec<SensorReading>>,
}

/// Forecast request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    #[serde(default)]
    pub historical_data: Vec<SensorReading>,
    /// Any JSON number; fractions are truncated toward zero
    #[serde(default)]
    pub forecast_days: Option<f64>,
}

/// Training request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    #[serde(default)]
    pub training_data: Vec<SensorReading>,
}

/// Detection fallback for a request that could not be served
pub fn detection_fallback(error: impl ToString) -> Value {
    json!({
        "error": error.to_string(),
        "score": 0.0,
        "isAnomaly": false,
        "confidence": 0.0,
        "method": "error_fallback",
    })
}

/// Forecast fallback for a request that could not be served
pub fn forecast_fallback(error: impl ToString) -> Value {
    json!({
        "error": error.to_string(),
        "method": "error_fallback",
    })
}

pub fn detect_json(detector: &AnomalyDetector, input: &str) -> Value {
    let request: DetectionRequest = match serde_json::from_str(input) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejected detection request: {}", e);
            return detection_fallback(e);
        }
    };

    let result = detector.detect(&request.sensor_data, request.historical_data.as_deref());
    serde_json::to_value(result).unwrap_or_else(detection_fallback)
}

pub fn forecast_json(forecaster: &TrendForecaster, input: &str) -> Value {
    let request: ForecastRequest = match serde_json::from_str(input) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejected forecast request: {}", e);
            return forecast_fallback(e);
        }
    };

    let days = match request.forecast_days {
        Some(days) if days.is_finite() => days.trunc().clamp(0.0, f64::from(u32::MAX)) as u32,
        Some(_) | None => forecaster.config().default_forecast_days,
    };
    let bundle = forecaster.forecast(&request.historical_data, days);
    serde_json::to_value(bundle).unwrap_or_else(forecast_fallback)
}

pub fn train_json(detector: &mut AnomalyDetector, input: &str) -> Value {
    let request: TrainingRequest = match serde_json::from_str(input) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejected training request: {}", e);
            return json!({ "success": false, "error": e.to_string() });
        }
    };

    let outcome = detector.train(&request.training_data);
    serde_json::to_value(outcome).unwrap_or_else(|e| json!({ "success": false, "error": e.to_string() }))
}
