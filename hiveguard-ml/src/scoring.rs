//! Anomaly score calculation
//!
//! Raw isolation scores live in `(0, 1]`: near 1 for points isolated
//! quickly, around 0.5 or below for points deep inside the data. The
//! forest shifts them into a signed decision value whose zero is the
//! contamination quantile of the training scores, so `decision < 0` means
//! "outlier" regardless of the data's scale.

use serde::{Deserialize, Serialize};

use crate::node::c_factor;

/// Anomaly score result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScore {
    /// Raw isolation score, higher is more anomalous
    pub score: f64,
    /// Signed decision value, negative for outliers
    pub decision: f64,
    /// Average path length across trees
    pub avg_path_length: f64,
    /// Number of trees used
    pub num_trees: usize,
}

impl AnomalyScore {
    pub fn new(score: f64, decision: f64, avg_path_length: f64, num_trees: usize) -> Self {
        Self { score, decision, avg_path_length, num_trees }
    }

    /// Whether the decision value falls on the outlier side
    pub fn is_outlier(&self) -> bool {
        self.decision < 0.0
    }

    /// Distance from the decision boundary, capped at 1
    pub fn confidence(&self) -> f64 {
        self.decision.abs().min(1.0)
    }
}

/// Calculate anomaly score from path lengths
///
/// Uses the formula: score = 2^(-E(h(x))/c(n))
/// where E(h(x)) is expected path length and c(n) is average path length
pub fn calculate_anomaly_score(avg_path_length: f64, num_samples: usize) -> f64 {
    let expected_path = c_factor(num_samples);
    if expected_path == 0.0 {
        return 0.5;
    }
    2.0_f64.powf(-avg_path_length / expected_path)
}

/// Linear-interpolated percentile (`q` in `[0, 100]`) of unsorted values
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
