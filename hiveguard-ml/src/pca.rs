//! Principal component projection
//!
//! Applied after scaling when the feature width exceeds the component
//! count, so trended 7-wide batches are scored in a 4-dimensional space.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use serde::{Deserialize, Serialize};

use crate::{batch_matrix, validate_batch, validate_row, MLResult};

/// Fitted principal component projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pca {
    means: DVector<f64>,
    /// Unit component vectors as columns, strongest first
    components: DMatrix<f64>,
    explained_variance: Vec<f64>,
}

impl Pca {
    /// Fit up to `n_components` components
    pub fn fit(batch: &[Vec<f64>], n_components: usize) -> MLResult<Self> {
        let width = validate_batch(batch, 2)?;
        let data = batch_matrix(batch, width);
        let means = data.row_mean().transpose();
        let centered = DMatrix::from_fn(batch.len(), width, |i, j| data[(i, j)] - means[j]);

        let dof = (batch.len() - 1) as f64;
        let covariance = centered.tr_mul(&centered) / dof;
        let eigen = SymmetricEigen::new(covariance);

        let mut order: Vec<usize> = (0..width).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
        order.truncate(n_components.clamp(1, width));

        let columns: Vec<DVector<f64>> = order
            .iter()
            .map(|&k| {
                let mut v = eigen.eigenvectors.column(k).into_owned();
                // Largest-magnitude loading positive, for a stable sign
                if v[v.iamax()] < 0.0 {
                    v.neg_mut();
                }
                v
            })
            .collect();

        Ok(Self {
            means,
            components: DMatrix::from_columns(&columns),
            explained_variance: order.iter().map(|&k| eigen.eigenvalues[k].max(0.0)).collect(),
        })
    }

    pub fn input_width(&self) -> usize {
        self.means.len()
    }

    pub fn n_components(&self) -> usize {
        self.components.ncols()
    }

    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    pub fn transform(&self, row: &[f64]) -> MLResult<Vec<f64>> {
        validate_row(row, self.input_width())?;
        let centered = DVector::from_column_slice(row) - &self.means;
        Ok(self.components.tr_mul(&centered).iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_component_follows_dominant_axis() {
        let batch: Vec<Vec<f64>> = (0..20)
            .map(|i| {
                let t = i as f64;
                vec![t, 2.0 * t, if i % 2 == 0 { 0.1 } else { -0.1 }]
            })
            .collect();
        let pca = Pca::fit(&batch, 2).unwrap();

        assert_eq!(pca.n_components(), 2);
        assert!(pca.explained_variance()[0] > pca.explained_variance()[1]);

        let projected = pca.transform(&[10.0, 20.0, 0.0]).unwrap();
        assert_eq!(projected.len(), 2);
        let forward = pca.transform(&[19.0, 38.0, 0.0]).unwrap();
        assert!(forward[0] > projected[0]);
    }

    #[test]
    fn component_count_is_capped_by_width() {
        let batch = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 5.0]];
        assert_eq!(Pca::fit(&batch, 4).unwrap().n_components(), 2);
    }

    #[test]
    fn explained_variance_matches_sample_variance() {
        // Uncorrelated columns: components are the axes themselves
        let batch = vec![vec![1.0, 0.0], vec![-1.0, 0.0], vec![0.0, 0.5], vec![0.0, -0.5]];
        let pca = Pca::fit(&batch, 2).unwrap();

        let variance = pca.explained_variance();
        assert!((variance[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((variance[1] - 0.5 / 3.0).abs() < 1e-12);
        let projected = pca.transform(&[2.0, 0.0]).unwrap();
        assert!((projected[0] - 2.0).abs() < 1e-12);
        assert!(projected[1].abs() < 1e-12);
    }

    #[test]
    fn survives_a_serde_round_trip() {
        let batch = vec![vec![1.0, 2.0, 0.5], vec![2.0, 1.0, 0.0], vec![3.0, 5.0, 1.5]];
        let pca = Pca::fit(&batch, 2).unwrap();
        let json = serde_json::to_string(&pca).unwrap();
        let restored: Pca = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.transform(&[1.0, 1.0, 1.0]), pca.transform(&[1.0, 1.0, 1.0]));
    }
}
