//! Anomaly Detector
//!
//! ## State
//!
//! ```text
//! Untrained ──(train succeeds)──► Trained(AnomalyModel)
//!     ▲                               │
//!     └──── train fails: unchanged ───┘ (a trained detector stays trained)
//! ```
//!
//! Detection never mutates the detector. The trained path is attempted
//! first; any [`FallbackReason`] hands the reading to the threshold rules,
//! which always produce a result.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use hiveguard_core::constants::thresholds::{
    FALLBACK_ANOMALY_CONFIDENCE, FALLBACK_ANOMALY_SCORE, FALLBACK_NORMAL_CONFIDENCE, FALLBACK_NORMAL_SCORE,
    FLAG_HUMIDITY_MAX_PCT, FLAG_HUMIDITY_MIN_PCT, FLAG_TEMP_MAX_C, FLAG_TEMP_MIN_C, FLAG_WEIGHT_MAX_KG,
    FLAG_WEIGHT_MIN_KG, IMPORTANCE_GAS_REF, IMPORTANCE_HUMIDITY_REF, IMPORTANCE_TEMP_REF, IMPORTANCE_WEIGHT_REF,
};
use hiveguard_core::features::{BASE_FEATURES, FEATURE_NAMES};
use hiveguard_core::{FeatureExtractor, FeatureVector, Metric, SensorReading};

use crate::analysis::{anomaly_narrative, AnomalyAnalysis};
use crate::forest::ForestConfig;
use crate::model::{AnomalyModel, ModelState};
use crate::scoring::AnomalyScore;
use crate::store::ModelStore;
use crate::MLError;

/// Detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    pub forest: ForestConfig,
    /// Rows required before a training call fits anything
    pub min_training_samples: usize,
    /// Components kept when the feature width exceeds this count
    pub pca_components: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            min_training_samples: 10,
            pca_components: BASE_FEATURES,
        }
    }
}

impl DetectorConfig {
    /// Smaller forest for tests and constrained hosts
    pub fn compact() -> Self {
        Self {
            forest: ForestConfig::compact(),
            ..Self::default()
        }
    }
}

/// Whether a model has been fitted
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    Untrained,
    Trained(AnomalyModel),
}

/// Why the trained path handed a reading to the threshold rules
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// No model fitted yet
    Untrained,
    /// Reading's feature vector has a different width than the model
    FeatureWidthMismatch { expected: usize, found: usize },
    /// Scoring failed
    Scoring(MLError),
}

impl From<MLError> for FallbackReason {
    fn from(error: MLError) -> Self {
        match error {
            MLError::FeatureWidthMismatch { expected, found } => FallbackReason::FeatureWidthMismatch { expected, found },
            other => FallbackReason::Scoring(other),
        }
    }
}

/// Algorithm that produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    ThresholdBased,
    MlIsolationForest,
    ErrorFallback,
}

/// Rule flags raised by the threshold path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyFlag {
    ExtremeTemperature,
    ExtremeHumidity,
    ExtremeWeight,
}

/// Verdict for one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyResult {
    pub score: f64,
    pub is_anomaly: bool,
    pub confidence: f64,
    pub method: DetectionMethod,
    pub anomalies: Vec<AnomalyFlag>,
    pub feature_importance: BTreeMap<String, f64>,
    pub analysis: AnomalyAnalysis,
}

/// Outcome of a training call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the fitted model reached the store
    pub persisted: bool,
}

impl TrainingOutcome {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            message: None,
            feature_count: None,
            error: Some(error.to_string()),
            persisted: false,
        }
    }
}

pub struct AnomalyDetector {
    config: DetectorConfig,
    extractor: FeatureExtractor,
    status: ModelStatus,
    store: Option<Box<dyn ModelStore>>,
}

impl AnomalyDetector {
    /// Untrained detector without persistence
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            extractor: FeatureExtractor::new(),
            status: ModelStatus::Untrained,
            store: None,
        }
    }

    /// Detector backed by a store; a previously saved model is restored
    pub fn with_store(config: DetectorConfig, store: Box<dyn ModelStore>) -> Self {
        let status = match store.load() {
            Ok(Some(state)) => match state.into_model() {
                Ok(model) => {
                    info!("Restored anomaly model of width {}", model.feature_width());
                    ModelStatus::Trained(model)
                }
                Err(e) => {
                    warn!("Ignoring stored model: {}", e);
                    ModelStatus::Untrained
                }
            },
            Ok(None) => ModelStatus::Untrained,
            Err(e) => {
                warn!("Model store could not be read: {}", e);
                ModelStatus::Untrained
            }
        };

        Self {
            config,
            extractor: FeatureExtractor::new(),
            status,
            store: Some(store),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn status(&self) -> &ModelStatus {
        &self.status
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.status, ModelStatus::Trained(_))
    }

    /// Verdict for a reading, with optional history for trend features
    pub fn detect(&self, reading: &SensorReading, history: Option<&[SensorReading]>) -> AnomalyResult {
        let features = self.extractor.extract(reading, history);
        let importance = feature_importance(&features);

        match self.score(&features) {
            Ok(score) => {
                let is_anomaly = score.is_outlier();
                let confidence = score.confidence();
                AnomalyResult {
                    score: score.decision,
                    is_anomaly,
                    confidence,
                    method: DetectionMethod::MlIsolationForest,
                    anomalies: Vec::new(),
                    feature_importance: importance,
                    analysis: anomaly_narrative(reading, is_anomaly, confidence),
                }
            }
            Err(reason) => {
                debug!("Threshold detection: {:?}", reason);
                threshold_detection(reading, importance)
            }
        }
    }

    fn score(&self, features: &FeatureVector) -> Result<AnomalyScore, FallbackReason> {
        let ModelStatus::Trained(model) = &self.status else {
            return Err(FallbackReason::Untrained);
        };
        Ok(model.score(features)?)
    }

    /// Fit a model on single-record feature vectors of the batch.
    ///
    /// On failure the current state is kept. A store that rejects the save
    /// does not undo the training; the outcome reports `persisted: false`.
    pub fn train(&mut self, training: &[SensorReading]) -> TrainingOutcome {
        let batch: Vec<FeatureVector> = training
            .iter()
            .map(|reading| self.extractor.extract(reading, None))
            .filter(|features| features.as_slice().iter().all(|v| v.is_finite()))
            .collect();

        if batch.len() < self.config.min_training_samples {
            return TrainingOutcome::failure(MLError::InsufficientData {
                required: self.config.min_training_samples,
                available: batch.len(),
            });
        }

        let model = match AnomalyModel::fit(&batch, self.config.pca_components, self.config.forest.clone()) {
            Ok(model) => model,
            Err(e) => {
                warn!("Training failed: {}", e);
                return TrainingOutcome::failure(e);
            }
        };

        let feature_count = model.feature_width();
        let mut outcome = TrainingOutcome {
            success: true,
            message: Some(format!("Model trained with {} samples", training.len())),
            feature_count: Some(feature_count),
            error: None,
            persisted: false,
        };

        if let Some(store) = &self.store {
            match store.save(&ModelState::new(model.clone())) {
                Ok(()) => outcome.persisted = true,
                Err(e) => {
                    warn!("Trained model could not be saved: {}", e);
                    outcome.error = Some(e.to_string());
                }
            }
        }

        self.status = ModelStatus::Trained(model);
        outcome
    }
}

/// Threshold flags for a reading; missing metrics take their neutral defaults
pub fn threshold_flags(reading: &SensorReading) -> Vec<AnomalyFlag> {
    let mut flags = Vec::new();

    let temp = reading.value_or_default(Metric::Temperature);
    if temp > FLAG_TEMP_MAX_C || temp < FLAG_TEMP_MIN_C {
        flags.push(AnomalyFlag::ExtremeTemperature);
    }
    let humidity = reading.value_or_default(Metric::Humidity);
    if humidity > FLAG_HUMIDITY_MAX_PCT || humidity < FLAG_HUMIDITY_MIN_PCT {
        flags.push(AnomalyFlag::ExtremeHumidity);
    }
    let weight = reading.value_or_default(Metric::Weight);
    if weight < FLAG_WEIGHT_MIN_KG || weight > FLAG_WEIGHT_MAX_KG {
        flags.push(AnomalyFlag::ExtremeWeight);
    }

    flags
}

fn threshold_detection(reading: &SensorReading, feature_importance: BTreeMap<String, f64>) -> AnomalyResult {
    let anomalies = threshold_flags(reading);
    let is_anomaly = !anomalies.is_empty();
    let confidence = if is_anomaly {
        FALLBACK_ANOMALY_CONFIDENCE
    } else {
        FALLBACK_NORMAL_CONFIDENCE
    };

    AnomalyResult {
        score: if is_anomaly { FALLBACK_ANOMALY_SCORE } else { FALLBACK_NORMAL_SCORE },
        is_anomaly,
        confidence,
        method: DetectionMethod::ThresholdBased,
        anomalies,
        feature_importance,
        analysis: anomaly_narrative(reading, is_anomaly, confidence),
    }
}

/// Normalized deviation of each base feature from its reference midpoint,
/// plus the absolute trend values when present.
pub fn feature_importance(features: &FeatureVector) -> BTreeMap<String, f64> {
    const REFERENCES: [f64; BASE_FEATURES] = [
        IMPORTANCE_TEMP_REF,
        IMPORTANCE_HUMIDITY_REF,
        IMPORTANCE_WEIGHT_REF,
        IMPORTANCE_GAS_REF,
    ];

    features
        .as_slice()
        .iter()
        .zip(FEATURE_NAMES)
        .enumerate()
        .map(|(i, (value, name))| {
            let importance = match REFERENCES.get(i) {
                Some(reference) => (value - reference).abs() / reference,
                None => value.abs(),
            };
            (name.to_string(), importance)
        })
        .collect()
}
