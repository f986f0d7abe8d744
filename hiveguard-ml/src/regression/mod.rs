//! Supervised regressors used by the forecasters
//!
//! - [`LinearRegression`]: ordinary least squares with intercept
//! - [`RandomForestRegressor`]: bagged CART trees, mean of tree predictions

mod forest;
mod linear;
mod tree;

pub use forest::{RandomForestRegressor, RegressionForestConfig};
pub use linear::LinearRegression;
pub use tree::{RegressionTree, TreeParams};

use hiveguard_core::stats::r_squared;

/// Goodness-of-fit of any regressor on its own inputs
pub fn score<F>(predict: F, rows: &[Vec<f64>], targets: &[f64]) -> f64
where
    F: Fn(&[f64]) -> f64,
{
    let predicted: Vec<f64> = rows.iter().map(|row| predict(row)).collect();
    r_squared(targets, &predicted)
}

/// Check that targets pair with rows and are finite
pub(crate) fn validate_targets(rows: &[Vec<f64>], targets: &[f64]) -> crate::MLResult<usize> {
    let width = crate::validate_batch(rows, 1)?;
    if targets.len() != rows.len() {
        return Err(crate::MLError::InsufficientData {
            required: rows.len(),
            available: targets.len(),
        });
    }
    if targets.iter().any(|y| !y.is_finite()) {
        return Err(crate::MLError::InvalidValue);
    }
    Ok(width)
}
