//! Isolation Forest implementation
//!
//! Combines many isolation trees, each grown on a random subsample drawn
//! without replacement. After fitting, the forest scores its own training
//! batch and stores the contamination quantile of those scores as the
//! decision offset.

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::scoring::{calculate_anomaly_score, percentile, AnomalyScore};
use crate::tree::IsolationTree;
use crate::{validate_batch, validate_row, MLError, MLResult};

/// Configuration for Isolation Forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub num_trees: usize,
    /// Upper bound on the subsample drawn for each tree
    pub sample_size: usize,
    /// Expected fraction of outliers in the training batch
    pub contamination: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            sample_size: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Small forest for tests and constrained hosts
    pub fn compact() -> Self {
        Self {
            num_trees: 25,
            ..Self::default()
        }
    }
}

/// Fitted Isolation Forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    config: ForestConfig,
    /// Subsample size each tree was grown on
    subsample_size: usize,
    /// Feature width of the training batch
    width: usize,
    /// Contamination quantile of training scores
    offset: f64,
}

impl IsolationForest {
    /// Train a forest on a rectangular batch of finite rows
    pub fn fit(batch: &[Vec<f64>], config: ForestConfig) -> MLResult<Self> {
        let width = validate_batch(batch, 2)?;
        if config.num_trees == 0 || config.sample_size < 2 {
            return Err(MLError::Degenerate("forest needs trees and a subsample of at least 2"));
        }

        let subsample_size = config.sample_size.min(batch.len());
        let max_depth = (subsample_size as f64).log2().ceil().max(1.0) as usize;

        let trees = (0..config.num_trees)
            .map(|i| {
                // Unique, reproducible stream per tree
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let indices = rand::seq::index::sample(&mut rng, batch.len(), subsample_size).into_vec();
                IsolationTree::fit(batch, &indices, max_depth, &mut rng)
            })
            .collect::<MLResult<Vec<_>>>()?;

        let mut forest = Self {
            trees,
            config,
            subsample_size,
            width,
            offset: 0.0,
        };

        let training_scores: Vec<f64> = batch.iter().map(|row| -forest.raw_score(row)).collect();
        forest.offset = percentile(&training_scores, forest.config.contamination * 100.0);

        debug!(
            "Isolation forest fitted: {} trees, subsample {}, height limit {}, offset {:.4}",
            forest.trees.len(),
            subsample_size,
            max_depth,
            forest.offset
        );

        Ok(forest)
    }

    /// Raw `2^(-E(h)/c(ψ))` score of a validated row
    fn raw_score(&self, sample: &[f64]) -> f64 {
        calculate_anomaly_score(self.avg_path_length(sample), self.subsample_size)
    }

    fn avg_path_length(&self, sample: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.path_length(sample)).sum();
        total / self.trees.len() as f64
    }

    /// Score a row; fails on a width mismatch or a non-finite value
    pub fn anomaly_score(&self, sample: &[f64]) -> MLResult<AnomalyScore> {
        validate_row(sample, self.width)?;
        if self.trees.is_empty() {
            return Err(MLError::NotFitted);
        }

        let avg_path_length = self.avg_path_length(sample);
        let score = calculate_anomaly_score(avg_path_length, self.subsample_size);
        Ok(AnomalyScore::new(score, -score - self.offset, avg_path_length, self.trees.len()))
    }

    /// Score many rows
    pub fn predict(&self, samples: &[Vec<f64>]) -> MLResult<Vec<AnomalyScore>> {
        samples.iter().map(|s| self.anomaly_score(s)).collect()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Feature width the forest was trained on
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn stats(&self) -> ForestStats {
        ForestStats {
            num_trees: self.trees.len(),
            total_nodes: self.trees.iter().map(IsolationTree::node_count).sum(),
            max_depth: self.trees.iter().map(IsolationTree::depth).max().unwrap_or(0),
            subsample_size: self.subsample_size,
        }
    }
}

/// Forest statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestStats {
    /// Number of trees
    pub num_trees: usize,
    /// Total nodes across all trees
    pub total_nodes: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Rows drawn per tree
    pub subsample_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_data() -> Vec<Vec<f64>> {
        // Normal data cluster
        let mut samples: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let temp = 20.0 + (i % 10) as f64 * 0.1;
                let humidity = 50.0 + (i % 7) as f64 * 0.2;
                vec![temp, humidity]
            })
            .collect();

        // Anomalies
        samples.push(vec![35.0, 90.0]);
        samples.push(vec![5.0, 20.0]);
        samples
    }

    #[test]
    fn test_forest_fit() {
        let forest = IsolationForest::fit(&create_test_data(), ForestConfig::compact()).unwrap();
        let stats = forest.stats();

        assert_eq!(stats.num_trees, 25);
        assert!(stats.total_nodes > 0);
        assert_eq!(stats.subsample_size, 42);
        // ceil(log2(42)) = 6
        assert!(stats.max_depth <= 6);
        assert_eq!(forest.width(), 2);
    }

    #[test]
    fn test_anomaly_detection() {
        let forest = IsolationForest::fit(&create_test_data(), ForestConfig::default()).unwrap();

        let normal = forest.anomaly_score(&[20.5, 50.4]).unwrap();
        let anomaly = forest.anomaly_score(&[35.0, 90.0]).unwrap();

        assert!(anomaly.score > normal.score);
        assert!(anomaly.is_outlier());
        assert!(!normal.is_outlier());
    }

    #[test]
    fn contamination_share_of_training_is_flagged() {
        let data = create_test_data();
        let forest = IsolationForest::fit(&data, ForestConfig::default()).unwrap();
        let flagged = forest
            .predict(&data)
            .unwrap()
            .iter()
            .filter(|s| s.is_outlier())
            .count();
        // At most the contamination share lies strictly below the quantile
        assert!(flagged <= (data.len() as f64 * 0.1).ceil() as usize);
        assert!(flagged >= 2);
    }

    #[test]
    fn fit_is_reproducible() {
        let data = create_test_data();
        let a = IsolationForest::fit(&data, ForestConfig::compact()).unwrap();
        let b = IsolationForest::fit(&data, ForestConfig::compact()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scoring_rejects_wrong_width() {
        let forest = IsolationForest::fit(&create_test_data(), ForestConfig::compact()).unwrap();
        assert_eq!(
            forest.anomaly_score(&[1.0, 2.0, 3.0]),
            Err(MLError::FeatureWidthMismatch { expected: 2, found: 3 })
        );
        assert_eq!(forest.anomaly_score(&[f64::NAN, 1.0]), Err(MLError::InvalidValue));
    }

    #[test]
    fn fit_requires_two_rows() {
        assert!(matches!(
            IsolationForest::fit(&[vec![1.0]], ForestConfig::default()),
            Err(MLError::InsufficientData { .. })
        ));
    }
}
