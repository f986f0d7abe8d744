//! Per-feature standardization

use serde::{Deserialize, Serialize};

use crate::{batch_matrix, validate_batch, validate_row, MLResult};

/// Zero-mean, unit-variance scaling fitted on a training batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    /// Constant columns get a scale of 1 so they map to 0.
    pub fn fit(batch: &[Vec<f64>]) -> MLResult<Self> {
        let width = validate_batch(batch, 1)?;
        let data = batch_matrix(batch, width);
        let means: Vec<f64> = data.row_mean().iter().copied().collect();

        let scales = data
            .row_variance()
            .iter()
            .zip(&means)
            .map(|(variance, mean)| {
                let std = variance.sqrt();
                if std > f64::EPSILON * mean.abs().max(1.0) {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { means, scales })
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, row: &[f64]) -> MLResult<Vec<f64>> {
        validate_row(row, self.width())?;
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }

    pub fn transform_batch(&self, batch: &[Vec<f64>]) -> MLResult<Vec<Vec<f64>>> {
        batch.iter().map(|row| self.transform(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MLError;

    #[test]
    fn standardizes_columns() {
        let batch = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let scaler = StandardScaler::fit(&batch).unwrap();

        assert_eq!(scaler.transform(&[1.0, 10.0]).unwrap(), vec![-1.0, 0.0]);
        assert_eq!(scaler.transform(&[3.0, 12.0]).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn rejects_other_widths() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert_eq!(
            scaler.transform(&[1.0]),
            Err(MLError::FeatureWidthMismatch { expected: 2, found: 1 })
        );
    }
}
