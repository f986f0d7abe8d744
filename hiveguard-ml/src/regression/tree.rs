use serde::{Deserialize, Serialize};

/// Growth limits for a regression tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeParams {
    /// Depth limit, unbounded when `None`
    pub max_depth: Option<usize>,
    /// Smallest node that may still be split
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
enum RegressionNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// CART regression tree minimizing squared error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<RegressionNode>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    error: f64,
}

impl RegressionTree {
    /// Grow on the rows selected by `indices` (repeats allowed)
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], indices: &[usize], params: TreeParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(rows, targets, indices.to_vec(), 0, params);
        tree
    }

    fn build(&mut self, rows: &[Vec<f64>], targets: &[f64], indices: Vec<usize>, depth: usize, params: TreeParams) -> usize {
        let node_index = self.nodes.len();
        let n = indices.len().max(1) as f64;
        let mean = indices.iter().map(|&i| targets[i]).sum::<f64>() / n;
        self.nodes.push(RegressionNode::Leaf { value: mean });

        let depth_reached = params.max_depth.is_some_and(|limit| depth >= limit);
        if depth_reached || indices.len() < params.min_samples_split.max(2) {
            return node_index;
        }

        let Some(best) = best_split(rows, targets, &indices) else {
            return node_index;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| rows[i][best.feature] <= best.threshold);

        let left_index = self.build(rows, targets, left, depth + 1, params);
        let right_index = self.build(rows, targets, right, depth + 1, params);
        self.nodes[node_index] = RegressionNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: left_index,
            right: right_index,
        };
        node_index
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut current = 0;
        loop {
            match self.nodes.get(current) {
                Some(RegressionNode::Split { feature, threshold, left, right }) => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    current = if value <= *threshold { *left } else { *right };
                }
                Some(RegressionNode::Leaf { value }) => return *value,
                None => return 0.0,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Lowest total squared error over every feature and midpoint threshold;
/// `None` when the node is pure or no feature varies.
fn best_split(rows: &[Vec<f64>], targets: &[f64], indices: &[usize]) -> Option<Candidate> {
    let n = indices.len() as f64;
    let sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let sum_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let parent_error = sum_sq - sum * sum / n;
    if parent_error <= f64::EPSILON * sum_sq.max(1.0) {
        return None;
    }

    let width = rows[indices[0]].len();
    let mut best: Option<Candidate> = None;
    let mut order = indices.to_vec();

    for feature in 0..width {
        order.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let (mut left_sum, mut left_sq) = (0.0, 0.0);
        for k in 1..order.len() {
            let y = targets[order[k - 1]];
            left_sum += y;
            left_sq += y * y;

            let lo = rows[order[k - 1]][feature];
            let hi = rows[order[k]][feature];
            if lo >= hi {
                continue;
            }

            let left_n = k as f64;
            let right_n = n - left_n;
            let right_sum = sum - left_sum;
            let error = (left_sq - left_sum * left_sum / left_n) + ((sum_sq - left_sq) - right_sum * right_sum / right_n);

            if best.as_ref().map_or(true, |b| error < b.error) {
                let mut threshold = (lo + hi) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(Candidate { feature, threshold, error });
            }
        }
    }
    best
}
