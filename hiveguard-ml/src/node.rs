//! Isolation tree node implementation
//!
//! Trees are stored as flat arenas of [`Node`]s; children are referenced by
//! index so a fitted forest serializes as plain data.

use serde::{Deserialize, Serialize};

/// Euler-Mascheroni constant
const EULER: f64 = 0.577_215_664_901_532_9;

/// Node type in the isolation tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NodeType {
    /// Internal node with split condition
    Internal {
        /// Feature index to split on
        feature: usize,
        /// Split value
        split_value: f64,
        /// Left child index
        left: usize,
        /// Right child index
        right: usize,
    },
    /// Leaf node (external)
    External {
        /// Number of samples that reached this leaf
        size: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node type and data
    pub node_type: NodeType,
    /// Path length from root
    pub depth: usize,
}

impl Node {
    /// Create an internal node
    pub fn internal(feature: usize, split_value: f64, left: usize, right: usize, depth: usize) -> Self {
        Self {
            node_type: NodeType::Internal { feature, split_value, left, right },
            depth,
        }
    }

    /// Create an external (leaf) node
    pub fn external(size: usize, depth: usize) -> Self {
        Self {
            node_type: NodeType::External { size },
            depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node_type, NodeType::External { .. })
    }

    /// Path length credited to a sample that stops here: depth plus the
    /// expected remaining depth of the unsplit samples in the leaf.
    pub fn path_length(&self) -> f64 {
        match self.node_type {
            NodeType::External { size } => self.depth as f64 + c_factor(size),
            NodeType::Internal { .. } => self.depth as f64,
        }
    }

    /// Child index to visit next, `None` at a leaf
    pub fn traverse(&self, sample: &[f64]) -> Option<usize> {
        match self.node_type {
            NodeType::Internal { feature, split_value, left, right } => {
                let value = sample.get(feature)?;
                Some(if *value < split_value { left } else { right })
            }
            NodeType::External { .. } => None,
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` items
///
/// `c(n) = 2 H(n-1) - 2 (n-1) / n`, with `H(i) ≈ ln(i) + γ`.
pub fn c_factor(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER) - 2.0 * (n - 1.0) / n
        }
    }
}
