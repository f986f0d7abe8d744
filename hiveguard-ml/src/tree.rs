//! Isolation tree implementation
//!
//! Trees are built by recursively partitioning a subsample until every
//! point is isolated, all remaining points are identical, or the height
//! limit is reached.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeType};
use crate::{MLError, MLResult};

/// Isolation tree stored as a node arena; the root is `nodes[0]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    nodes: Vec<Node>,
    max_depth: usize,
}

impl IsolationTree {
    /// Grow a tree over the rows of `batch` selected by `indices`
    pub fn fit(batch: &[Vec<f64>], indices: &[usize], max_depth: usize, rng: &mut StdRng) -> MLResult<Self> {
        if indices.is_empty() {
            return Err(MLError::InsufficientData { required: 1, available: 0 });
        }

        let mut tree = Self { nodes: Vec::new(), max_depth };
        tree.build(batch, indices.to_vec(), 0, rng);
        Ok(tree)
    }

    /// Build a subtree and return its root index
    fn build(&mut self, batch: &[Vec<f64>], indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let node_index = self.nodes.len();
        // Placeholder until the children are placed
        self.nodes.push(Node::external(indices.len(), depth));

        if depth >= self.max_depth || indices.len() <= 1 {
            return node_index;
        }

        let Some((feature, split_value)) = select_split(batch, &indices, rng) else {
            // Every feature is constant over these rows
            return node_index;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| batch[i][feature] < split_value);

        let left_index = self.build(batch, left, depth + 1, rng);
        let right_index = self.build(batch, right, depth + 1, rng);
        self.nodes[node_index] = Node::internal(feature, split_value, left_index, right_index, depth);

        node_index
    }

    /// Depth at which a sample is isolated, adjusted for leaf size
    pub fn path_length(&self, sample: &[f64]) -> f64 {
        let mut current = 0;
        while let Some(node) = self.nodes.get(current) {
            match node.traverse(sample) {
                Some(next) => current = next,
                None => return node.path_length(),
            }
        }
        0.0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node depth
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.node_type, NodeType::External { .. }))
            .count()
    }
}

/// Pick a random non-constant feature and a uniform split inside its range
fn select_split(batch: &[Vec<f64>], indices: &[usize], rng: &mut StdRng) -> Option<(usize, f64)> {
    let width = batch[indices[0]].len();
    let mut features: Vec<usize> = (0..width).collect();
    features.shuffle(rng);

    for feature in features {
        let (min, max) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
            let v = batch[i][feature];
            (lo.min(v), hi.max(v))
        });
        if max > min {
            let split = rng.gen_range(min..max);
            // `min < split` keeps both sides non-empty
            return Some((feature, if split > min { split } else { (min + max) / 2.0 }));
        }
    }
    None
}
