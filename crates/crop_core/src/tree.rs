//! Decision tree structures for forest inference
//!
//! Trees are flat node arrays with the root at index 0. Thresholds are
//! fixed-point integers, see [`crate::fixed`].

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature_idx >= 0`: index into feature vector
/// - `left` and `right` point to child node indices
/// - `class` is `None`
///
/// For leaf nodes:
/// - `feature_idx == -1`, `left == right == -1`
/// - `class` contains the predicted class code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Node {
    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Threshold value for split (fixed-point integer)
    pub threshold: i64,

    /// Left child index, taken when `feature <= threshold` (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Predicted class code (Some for leaf nodes)
    pub class: Option<u32>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(feature_idx: i32, threshold: i64, left: i32, right: i32) -> Self {
        Self {
            feature_idx,
            threshold,
            left,
            right,
            class: None,
        }
    }

    /// Create a new leaf node
    pub fn leaf(class: u32) -> Self {
        Self {
            feature_idx: -1,
            threshold: 0,
            left: -1,
            right: -1,
            class: Some(class),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.class.is_some()
    }
}

/// A single classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk the tree for a fixed-point feature row and return the leaf class.
    ///
    /// Returns `None` if the tree is malformed or the row is too short; a tree
    /// that passed [`Tree::validate`] always yields a class for a row of the
    /// validated width.
    pub fn predict(&self, features: &[i64]) -> Option<u32> {
        let mut idx = 0usize;

        // Children always follow their parent, so a valid walk is bounded by
        // the node count.
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx)?;

            if let Some(class) = node.class {
                return Some(class);
            }

            let value = *features.get(node.feature_idx as usize)?;
            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };

            if next <= idx as i32 {
                return None;
            }
            idx = next as usize;
        }

        None
    }

    /// Validate tree structure against the model dimensions.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        let len = self.nodes.len() as i32;
        for (i, node) in self.nodes.iter().enumerate() {
            let i = i as i32;
            match node.class {
                Some(class) => {
                    if class as usize >= n_classes {
                        return Err(format!(
                            "Node {} predicts class {} but model has {} classes",
                            i, class, n_classes
                        ));
                    }
                }
                None => {
                    if node.feature_idx < 0 || node.feature_idx as usize >= n_features {
                        return Err(format!(
                            "Node {} has invalid feature index {}",
                            i, node.feature_idx
                        ));
                    }
                    if node.left <= i || node.left >= len {
                        return Err(format!("Node {} has invalid left child {}", i, node.left));
                    }
                    if node.right <= i || node.right >= len {
                        return Err(format!("Node {} has invalid right child {}", i, node.right));
                    }
                }
            }
        }

        Ok(())
    }

    /// Depth of the deepest leaf (a single-leaf tree has depth 0).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node)
                    if !node.is_leaf() && node.left as usize > idx && node.right as usize > idx =>
                {
                    1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // x0 <= 5.0 ? class 0 : (x1 <= 1.0 ? class 1 : class 2)
    fn sample_tree() -> Tree {
        Tree::new(vec![
            Node::internal(0, 5_000_000, 1, 2),
            Node::leaf(0),
            Node::internal(1, 1_000_000, 3, 4),
            Node::leaf(1),
            Node::leaf(2),
        ])
    }

    #[test]
    fn test_predict() {
        let tree = sample_tree();
        assert_eq!(tree.predict(&[5_000_000, 0]), Some(0));
        assert_eq!(tree.predict(&[5_000_001, 1_000_000]), Some(1));
        assert_eq!(tree.predict(&[9_000_000, 2_000_000]), Some(2));
        assert_eq!(tree.predict(&[9_000_000]), None);
    }

    #[test]
    fn test_validate() {
        let tree = sample_tree();
        assert!(tree.validate(2, 3).is_ok());
        assert!(tree.validate(1, 3).is_err());
        assert!(tree.validate(2, 2).is_err());
        assert!(Tree::new(vec![]).validate(2, 3).is_err());

        let cyclic = Tree::new(vec![Node::internal(0, 0, 0, 1), Node::leaf(0)]);
        assert!(cyclic.validate(1, 1).is_err());
        assert_eq!(cyclic.predict(&[-1]), None);
    }

    #[test]
    fn test_shape() {
        let tree = sample_tree();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(Tree::new(vec![Node::leaf(0)]).depth(), 0);
    }
}
