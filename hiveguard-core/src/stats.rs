//! Series statistics and trend fitting
//!
//! ## Overview
//!
//! Every trend the engine reports is the slope of an ordinary least-squares
//! line fitted against the *sequence index*, not against wall-clock time.
//! Telemetry arrives on a fixed cadence, so index and time are proportional
//! in practice, and the index form stays well defined when timestamps are
//! missing or duplicated.
//!
//! ```text
//! slope = Σ(x - x̄)(y - ȳ) / Σ(x - x̄)²        x = 0, 1, ..., n-1
//! r²    = 1 - SS_res / SS_tot                 (0 when SS_tot = 0)
//! ```
//!
//! All routines are pure functions over slices.

use serde::{Deserialize, Serialize};

use crate::constants::thresholds::STABLE_SLOPE;
use crate::constants::windows::TREND_WINDOW;
use crate::errors::{DataError, DataResult};

/// Least-squares line `y = slope * index + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Change per sequence step
    pub slope: f64,
    /// Value at index 0
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the line at an index
    pub fn at(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }
}

/// Fit a line to values against their index
pub fn linear_fit(values: &[f64]) -> DataResult<LinearFit> {
    let n = values.len();
    if n < 2 {
        return Err(DataError::InsufficientData { required: 2, available: n });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DataError::NonFinite);
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n_f;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Slope of the last [`TREND_WINDOW`] values, 0.0 when fewer than two exist
pub fn recent_slope(values: &[f64]) -> f64 {
    let recent = &values[values.len().saturating_sub(TREND_WINDOW)..];
    linear_fit(recent).map(|fit| fit.slope).unwrap_or(0.0)
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation (ddof = 0)
pub fn std_dev(values: &[f64]) -> f64 {
    match mean(values) {
        Some(m) => {
            let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
            variance.sqrt()
        }
        None => 0.0,
    }
}

/// Median, averaging the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Coefficient of determination of predictions against observations.
///
/// A constant target yields 1.0 for a perfect fit and 0.0 otherwise.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    let Some(m) = mean(observed) else {
        return 0.0;
    };
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    let ss_tot: f64 = observed.iter().map(|y| (y - m).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Rising
    Increasing,
    /// Falling
    Decreasing,
    /// Flat within tolerance
    Stable,
    /// Too few points to tell
    Unknown,
}

impl TrendDirection {
    /// Classify a slope against [`STABLE_SLOPE`]
    pub fn from_slope(slope: f64) -> Self {
        if slope.abs() < STABLE_SLOPE {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

/// Fitted trend of a whole series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Rising, falling or flat
    pub direction: TrendDirection,
    /// Change per sequence step
    pub slope: f64,
    /// Goodness of fit in [0, 1]; 0 for a series without variance
    pub strength: f64,
    /// Population standard deviation of the series
    pub volatility: f64,
}

impl TrendSummary {
    /// Fit a trend over every value of a series.
    ///
    /// Fewer than three points give an `Unknown` direction with zero slope
    /// and strength.
    pub fn analyze(values: &[f64]) -> Self {
        let volatility = std_dev(values);
        let fit = match values.len() {
            0..=2 => None,
            _ => linear_fit(values).ok(),
        };

        let Some(fit) = fit else {
            return Self {
                direction: TrendDirection::Unknown,
                slope: 0.0,
                strength: 0.0,
                volatility,
            };
        };

        let predicted: Vec<f64> = (0..values.len()).map(|i| fit.at(i as f64)).collect();
        let y_mean = mean(values).unwrap_or(0.0);
        let ss_tot: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();
        let strength = if ss_tot == 0.0 {
            0.0
        } else {
            r_squared(values, &predicted).clamp(0.0, 1.0)
        };

        Self {
            direction: TrendDirection::from_slope(fit.slope),
            slope: fit.slope,
            strength,
            volatility,
        }
    }
}

/// Descriptive statistics of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub count: usize,
}

impl StatisticsSummary {
    /// Summarize a non-empty series
    pub fn from_values(values: &[f64]) -> DataResult<Self> {
        let (Some(mean), Some(median)) = (mean(values), median(values)) else {
            return Err(DataError::InsufficientData { required: 1, available: 0 });
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            mean,
            median,
            std: std_dev(values),
            min,
            max,
            range: max - min,
            count: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_of_perfect_line() {
        let fit = linear_fit(&[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn slope_needs_two_points() {
        assert_eq!(
            linear_fit(&[4.0]),
            Err(DataError::InsufficientData { required: 2, available: 1 })
        );
        assert_eq!(linear_fit(&[1.0, f64::NAN]), Err(DataError::NonFinite));
    }

    #[test]
    fn recent_slope_uses_trailing_window() {
        // Flat for 20 points, then the last 10 rise by 1 per step
        let mut values = vec![0.0; 20];
        values.extend((1..=10).map(|i| i as f64));
        assert!((recent_slope(&values) - 1.0).abs() < 1e-12);
        assert_eq!(recent_slope(&[5.0]), 0.0);
    }

    #[test]
    fn recent_slope_ignores_values_before_the_window() {
        let mut values = vec![1e6, -1e6, 5e5, f64::MAX / 4.0];
        values.extend((0..TREND_WINDOW).map(|i| 10.0 - 0.5 * i as f64));
        assert!((recent_slope(&values) + 0.5).abs() < 1e-12);

        let short = [2.0, 4.0, 6.0];
        assert!((recent_slope(&short) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn trend_of_short_series_is_unknown() {
        let trend = TrendSummary::analyze(&[1.0, 2.0]);
        assert_eq!(trend.direction, TrendDirection::Unknown);
        assert_eq!(trend.strength, 0.0);
    }

    #[test]
    fn trend_of_flat_series_is_stable_with_zero_strength() {
        let trend = TrendSummary::analyze(&[12.0; 8]);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.strength, 0.0);
        assert_eq!(trend.volatility, 0.0);
    }

    #[test]
    fn trend_of_rising_series() {
        let values: Vec<f64> = (0..30).map(|i| 20.0 + 0.25 * i as f64).collect();
        let trend = TrendSummary::analyze(&values);
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert!(trend.slope > 0.0);
        assert!((trend.strength - 1.0).abs() < 1e-9);
    }

    #[test]
    fn statistics_summary() {
        let stats = StatisticsSummary::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.std, 2.0);
        assert_eq!(stats.range, 7.0);
        assert_eq!(stats.count, 8);
        assert!(StatisticsSummary::from_values(&[]).is_err());
    }

    #[test]
    fn r_squared_of_constant_target() {
        assert_eq!(r_squared(&[3.0, 3.0], &[3.0, 3.0]), 1.0);
        assert_eq!(r_squared(&[3.0, 3.0], &[2.0, 3.0]), 0.0);
    }
}
