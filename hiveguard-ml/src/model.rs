//! Trained anomaly model
//!
//! The fitted pipeline applied to every feature vector:
//!
//! ```text
//! features ──► StandardScaler ──► [PCA, only when width > components] ──► IsolationForest
//! ```
//!
//! The model remembers the width it was fitted on; vectors of any other
//! width are rejected with [`MLError::FeatureWidthMismatch`] rather than
//! padded or truncated.

use log::info;
use serde::{Deserialize, Serialize};

use hiveguard_core::FeatureVector;

use crate::forest::{ForestConfig, IsolationForest};
use crate::pca::Pca;
use crate::scaler::StandardScaler;
use crate::scoring::AnomalyScore;
use crate::{validate_row, MLError, MLResult};

/// Version of the persisted model layout
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Fitted scaler, optional projection and forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyModel {
    scaler: StandardScaler,
    projection: Option<Pca>,
    forest: IsolationForest,
    feature_width: usize,
    trained_samples: usize,
}

impl AnomalyModel {
    /// Fit the whole pipeline on a batch of equally wide vectors
    pub fn fit(batch: &[FeatureVector], components: usize, forest_config: ForestConfig) -> MLResult<Self> {
        let rows: Vec<Vec<f64>> = batch.iter().map(|v| v.as_slice().to_vec()).collect();
        let scaler = StandardScaler::fit(&rows)?;
        let scaled = scaler.transform_batch(&rows)?;

        let feature_width = scaler.width();
        let (projection, reduced) = if feature_width > components && components > 0 {
            let pca = Pca::fit(&scaled, components)?;
            let reduced = scaled.iter().map(|row| pca.transform(row)).collect::<MLResult<Vec<_>>>()?;
            (Some(pca), reduced)
        } else {
            (None, scaled)
        };

        let forest = IsolationForest::fit(&reduced, forest_config)?;

        info!(
            "Anomaly model fitted on {} samples of width {}{}",
            rows.len(),
            feature_width,
            if projection.is_some() { " (projected)" } else { "" }
        );

        Ok(Self {
            scaler,
            projection,
            forest,
            feature_width,
            trained_samples: rows.len(),
        })
    }

    /// Score a feature vector of the fitted width
    pub fn score(&self, features: &FeatureVector) -> MLResult<AnomalyScore> {
        validate_row(features.as_slice(), self.feature_width)?;

        let scaled = self.scaler.transform(features.as_slice())?;
        let reduced = match &self.projection {
            Some(pca) => pca.transform(&scaled)?,
            None => scaled,
        };
        self.forest.anomaly_score(&reduced)
    }

    pub fn feature_width(&self) -> usize {
        self.feature_width
    }

    pub fn trained_samples(&self) -> usize {
        self.trained_samples
    }

    pub fn is_projected(&self) -> bool {
        self.projection.is_some()
    }

    pub fn forest(&self) -> &IsolationForest {
        &self.forest
    }
}

/// Persisted form of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelState {
    pub version: u32,
    pub model: AnomalyModel,
}

impl ModelState {
    pub fn new(model: AnomalyModel) -> Self {
        Self {
            version: MODEL_FORMAT_VERSION,
            model,
        }
    }

    /// Unwrap the model, refusing layouts from another format version
    pub fn into_model(self) -> MLResult<AnomalyModel> {
        if self.version != MODEL_FORMAT_VERSION {
            return Err(MLError::Degenerate("unsupported model format version"));
        }
        Ok(self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(width: usize, n: usize) -> Vec<FeatureVector> {
        (0..n)
            .map(|i| {
                FeatureVector::from_values(
                    (0..width)
                        .map(|j| 10.0 * j as f64 + ((i * (j + 3)) % 11) as f64 * 0.1)
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn base_width_model_is_not_projected() {
        let model = AnomalyModel::fit(&batch(4, 30), 4, ForestConfig::compact()).unwrap();
        assert_eq!(model.feature_width(), 4);
        assert!(!model.is_projected());
        assert_eq!(model.trained_samples(), 30);
    }

    #[test]
    fn trended_width_model_is_projected() {
        let model = AnomalyModel::fit(&batch(7, 30), 4, ForestConfig::compact()).unwrap();
        assert!(model.is_projected());
        assert_eq!(model.forest().width(), 4);

        let probe = FeatureVector::from_values(vec![0.5, 10.5, 20.5, 30.5, 40.5, 50.5, 60.5]);
        assert!(model.score(&probe).is_ok());
    }

    #[test]
    fn other_width_is_rejected() {
        let model = AnomalyModel::fit(&batch(4, 30), 4, ForestConfig::compact()).unwrap();
        let wide = FeatureVector::from_values(vec![0.0; 7]);
        assert_eq!(
            model.score(&wide),
            Err(MLError::FeatureWidthMismatch { expected: 4, found: 7 })
        );
    }

    #[test]
    fn state_round_trips_through_json() {
        let model = AnomalyModel::fit(&batch(4, 20), 4, ForestConfig::compact()).unwrap();
        let state = ModelState::new(model.clone());
        let json = serde_json::to_string(&state).unwrap();
        let back: ModelState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_model().unwrap(), model);
    }
}
