//! Anomaly Detection and Trend Forecasting for Hive Telemetry
//!
//! ## Overview
//!
//! This crate turns the feature vectors and series produced by
//! `hiveguard-core` into decision support:
//!
//! - [`AnomalyDetector`]: a real-time verdict for the current reading
//! - [`TrendForecaster`]: multi-day forecasts per metric
//! - [`analysis`]: alerts and recommendations derived from both
//!
//! ## Three Data Regimes
//!
//! Every entry point must produce bounded, explainable output whether the
//! caller has no history, a short history, or a fully trained model:
//!
//! ```text
//! detect:    Untrained ──────────────► threshold rules
//!            Trained ──► scale ──► [PCA] ──► isolation forest
//!                 └── width mismatch / scoring fault ──► threshold rules
//!
//! forecast:  < 10 points ────────────► simple statistical trends
//!            ≥ 10 points ──► time-feature table ──► per-metric forecasters
//!                 └── undated readings ──► simple statistical trends
//! ```
//!
//! Fallbacks are driven by typed reasons ([`detector::FallbackReason`],
//! [`ForecastError`]), never by catching arbitrary faults, and none of the
//! public entry points return an error or panic on bad data.
//!
//! ## Why Isolation Forest?
//!
//! 1. **Unsupervised**: hives rarely come with labelled incidents
//! 2. **Small**: the fitted model is a hundred shallow trees
//! 3. **Fast Inference**: O(log n) per tree per reading
//!
//! ## Example
//!
//! ```
//! use hiveguard_ml::{AnomalyDetector, DetectorConfig, DetectionMethod};
//! use hiveguard_core::SensorReading;
//!
//! let detector = AnomalyDetector::new(DetectorConfig::default());
//! let result = detector.detect(&SensorReading::new().with_temperature(45.0), None);
//!
//! assert!(result.is_anomaly);
//! assert_eq!(result.method, DetectionMethod::ThresholdBased);
//! ```

#![deny(unsafe_code)]

use hiveguard_core::DataError;
use nalgebra::DMatrix;
use thiserror::Error;

pub mod analysis;
pub mod boundary;
pub mod detector;
pub mod forecast;
pub mod forest;
pub mod model;
pub mod node;
pub mod pca;
pub mod regression;
pub mod scaler;
pub mod scoring;
pub mod store;
pub mod tree;

pub use analysis::{AnomalyAnalysis, OverallAnalysis};
pub use detector::{AnomalyDetector, AnomalyFlag, AnomalyResult, DetectionMethod, DetectorConfig, TrainingOutcome};
pub use forecast::{ForecastBundle, ForecastConfig, ForecastError, ForecastMethod, TrendForecaster};
pub use forest::{ForestConfig, IsolationForest};
pub use model::{AnomalyModel, ModelState};
pub use scoring::AnomalyScore;
pub use store::{JsonFileStore, MemoryStore, ModelStore, StoreError};

/// Result type for fitting and scoring
pub type MLResult<T> = Result<T, MLError>;

/// Errors raised while fitting or applying a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MLError {
    /// Not enough rows to fit
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Minimum rows required
        required: usize,
        /// Rows supplied
        available: usize,
    },

    /// Row width differs from the fitted width
    #[error("Feature width mismatch: model expects {expected}, got {found}")]
    FeatureWidthMismatch {
        /// Width the model was fitted on
        expected: usize,
        /// Width of the offending row
        found: usize,
    },

    /// NaN or infinity in the input
    #[error("Invalid feature value: not a finite number")]
    InvalidValue,

    /// Prediction requested from a model that was never fitted
    #[error("Model is not fitted")]
    NotFitted,

    /// Fit produced no usable structure
    #[error("Degenerate fit: {0}")]
    Degenerate(&'static str),

    /// Error from a core numeric routine
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Check that a batch is non-empty, rectangular and finite; returns its width
pub(crate) fn validate_batch(rows: &[Vec<f64>], required: usize) -> MLResult<usize> {
    if rows.len() < required.max(1) {
        return Err(MLError::InsufficientData {
            required: required.max(1),
            available: rows.len(),
        });
    }

    let width = rows[0].len();
    if width == 0 {
        return Err(MLError::Degenerate("rows have no features"));
    }
    for row in rows {
        if row.len() != width {
            return Err(MLError::FeatureWidthMismatch { expected: width, found: row.len() });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(MLError::InvalidValue);
        }
    }
    Ok(width)
}

/// Validated batch as an `n × width` matrix
pub(crate) fn batch_matrix(rows: &[Vec<f64>], width: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), width, |i, j| rows[i][j])
}

/// Check a single row against a fitted width
pub(crate) fn validate_row(row: &[f64], expected: usize) -> MLResult<()> {
    if row.len() != expected {
        return Err(MLError::FeatureWidthMismatch { expected, found: row.len() });
    }
    if row.iter().any(|v| !v.is_finite()) {
        return Err(MLError::InvalidValue);
    }
    Ok(())
}
