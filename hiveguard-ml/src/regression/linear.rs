use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::validate_targets;
use crate::{batch_matrix, validate_row, MLError, MLResult};

/// Relative singular value cutoff below which a direction counts as rank-deficient
const RANK_TOLERANCE: f64 = 1e-10;

/// Ordinary least squares with an intercept
///
/// Solved on centered data through a singular value decomposition, which
/// yields the minimum-norm solution when columns are collinear (for
/// instance a month column that never changes inside the history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    pub fn fit(rows: &[Vec<f64>], targets: &[f64]) -> MLResult<Self> {
        let width = validate_targets(rows, targets)?;
        let n = rows.len();

        let data = batch_matrix(rows, width);
        let x_means = data.row_mean().transpose();
        let y_mean = targets.iter().sum::<f64>() / n as f64;

        let centered = DMatrix::from_fn(n, width, |i, j| data[(i, j)] - x_means[j]);
        let y = DVector::from_iterator(n, targets.iter().map(|t| t - y_mean));

        let coefficients = if centered.iter().all(|v| *v == 0.0) {
            DVector::zeros(width)
        } else {
            let svd = centered.svd(true, true);
            let cutoff = svd.singular_values.max() * n.max(width) as f64 * RANK_TOLERANCE;
            svd.solve(&y, cutoff).map_err(MLError::Degenerate)?
        };

        let intercept = y_mean - coefficients.dot(&x_means);
        Ok(Self {
            coefficients: coefficients.iter().copied().collect(),
            intercept,
        })
    }

    pub fn predict(&self, row: &[f64]) -> MLResult<f64> {
        validate_row(row, self.coefficients.len())?;
        Ok(self.intercept + row.iter().zip(&self.coefficients).map(|(x, c)| x * c).sum::<f64>())
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}
