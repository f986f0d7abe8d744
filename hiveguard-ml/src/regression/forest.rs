use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};
use super::validate_targets;
use crate::{validate_row, MLError, MLResult};

/// Configuration for the bagged regression forest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionForestConfig {
    pub num_trees: usize,
    pub tree: TreeParams,
    pub seed: u64,
}

impl Default for RegressionForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 50,
            tree: TreeParams::default(),
            seed: 42,
        }
    }
}

/// Random forest regressor: bootstrap-sampled CART trees, averaged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    width: usize,
}

impl RandomForestRegressor {
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], config: RegressionForestConfig) -> MLResult<Self> {
        let width = validate_targets(rows, targets)?;
        if config.num_trees == 0 {
            return Err(MLError::Degenerate("regression forest needs at least one tree"));
        }

        let n = rows.len();
        let trees: Vec<RegressionTree> = (0..config.num_trees)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(rows, targets, &bootstrap, config.tree)
            })
            .collect();

        trace!(
            "Regression forest fitted: {} trees, {} nodes",
            trees.len(),
            trees.iter().map(RegressionTree::node_count).sum::<usize>()
        );

        Ok(Self { trees, width })
    }

    pub fn predict(&self, row: &[f64]) -> MLResult<f64> {
        validate_row(row, self.width)?;
        if self.trees.is_empty() {
            return Err(MLError::NotFitted);
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Ok(total / self.trees.len() as f64)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::score;

    fn linear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 5) as f64]).collect();
        let targets: Vec<f64> = rows.iter().map(|r| 10.0 + 0.5 * r[0]).collect();
        (rows, targets)
    }

    #[test]
    fn fits_monotonic_target() {
        let (rows, targets) = linear_data();
        let forest = RandomForestRegressor::fit(&rows, &targets, RegressionForestConfig::default()).unwrap();

        assert_eq!(forest.num_trees(), 50);
        let low = forest.predict(&[2.0, 2.0]).unwrap();
        let high = forest.predict(&[37.0, 2.0]).unwrap();
        assert!(high > low);

        let r2 = score(|row| forest.predict(row).unwrap_or(f64::NAN), &rows, &targets);
        assert!(r2 > 0.9);
    }

    #[test]
    fn predictions_stay_within_target_range() {
        let (rows, targets) = linear_data();
        let forest = RandomForestRegressor::fit(&rows, &targets, RegressionForestConfig::default()).unwrap();
        let p = forest.predict(&[1000.0, 0.0]).unwrap();
        assert!((10.0..=29.5).contains(&p));
    }

    #[test]
    fn same_seed_same_forest() {
        let (rows, targets) = linear_data();
        let a = RandomForestRegressor::fit(&rows, &targets, RegressionForestConfig::default()).unwrap();
        let b = RandomForestRegressor::fit(&rows, &targets, RegressionForestConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
