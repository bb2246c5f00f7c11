//! CART (Classification and Regression Tree) builder
//!
//! Implements deterministic Gini classification tree construction with
//! randomized feature subsets per node and fixed-point arithmetic only.

use crop_core::fixed::SCALE;
use crop_core::{Node, Tree};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::deterministic::SplitTieBreaker;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features evaluated per node before settling for the best split found
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }
}

/// Split candidate with purity score and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: i64,
    /// Σ_child Σ_class count² · SCALE / n_child; higher is purer
    score: i128,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, threshold: i64, score: i128) -> Self {
        Self {
            feature_idx,
            threshold,
            score,
            tie_breaker: SplitTieBreaker::new(feature_idx, threshold),
        }
    }

    fn beats(&self, other: &SplitCandidate) -> bool {
        self.score > other.score
            || (self.score == other.score && self.tie_breaker < other.tie_breaker)
    }
}

/// Build a classification tree over a borrowed training set
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<i64>],
    targets: &'a [u32],
    n_classes: usize,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    /// `targets` must hold codes below `n_classes`, one per feature row.
    pub fn new(
        features: &'a [Vec<i64>],
        targets: &'a [u32],
        n_classes: usize,
        config: TreeConfig,
    ) -> Self {
        let feature_count = features.first().map(Vec::len).unwrap_or(0);

        Self {
            config,
            features,
            targets,
            n_classes,
            feature_count,
        }
    }

    /// Grow a tree on `sample` (row indices, repeats allowed for bootstrap
    /// resamples). `rng` drives the per-node feature order.
    pub fn build(&self, sample: &[usize], rng: &mut StdRng) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(sample, 0, &mut nodes, rng);
        Tree::new(nodes)
    }

    /// Recursively build tree nodes in pre-order, returning the node index
    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        rng: &mut StdRng,
    ) -> i32 {
        let current_idx = nodes.len() as i32;
        let counts = self.class_counts(indices);
        let leaf_class = majority(&counts);

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.config.max_depth.map_or(false, |max| depth >= max);

        if pure
            || depth_reached
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
        {
            nodes.push(Node::leaf(leaf_class));
            return current_idx;
        }

        let split = match self.find_best_split(indices, rng) {
            Some(s) => s,
            None => {
                nodes.push(Node::leaf(leaf_class));
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        // Reserve space for current node
        nodes.push(Node::internal(split.feature_idx as i32, split.threshold, -1, -1));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes, rng);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, rng);

        nodes[current_idx as usize].left = left_idx;
        nodes[current_idx as usize].right = right_idx;

        current_idx
    }

    /// Examine features in random order. The first `max_features` are always
    /// evaluated; later ones only until some valid split has been found.
    fn find_best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<SplitCandidate> {
        let mut order: Vec<usize> = (0..self.feature_count).collect();
        order.shuffle(rng);

        let mut best_split: Option<SplitCandidate> = None;

        for (visited, &feature_idx) in order.iter().enumerate() {
            if visited >= self.config.max_features && best_split.is_some() {
                break;
            }

            if let Some(candidate) = self.best_split_for_feature(indices, feature_idx) {
                best_split = match best_split {
                    Some(current) if !candidate.beats(&current) => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        best_split
    }

    /// Sweep sorted values of one feature, scoring every midpoint between
    /// consecutive distinct values.
    fn best_split_for_feature(
        &self,
        indices: &[usize],
        feature_idx: usize,
    ) -> Option<SplitCandidate> {
        let mut sorted: Vec<(i64, usize)> = indices
            .iter()
            .map(|&idx| (self.features[idx][feature_idx], self.targets[idx] as usize))
            .collect();
        sorted.sort_unstable();

        let n = sorted.len();
        let first = sorted.first()?.0;
        let last = sorted.last()?.0;
        if first == last {
            return None;
        }

        let mut left = vec![0i128; self.n_classes];
        let mut right = vec![0i128; self.n_classes];
        for &(_, class) in &sorted {
            right[class] += 1;
        }
        let mut left_sq: i128 = 0;
        let mut right_sq: i128 = right.iter().map(|c| c * c).sum();

        let min_leaf = self.config.min_samples_leaf;
        let mut best: Option<SplitCandidate> = None;

        for i in 0..n - 1 {
            let (value, class) = sorted[i];
            left_sq += 2 * left[class] + 1;
            left[class] += 1;
            right_sq -= 2 * right[class] - 1;
            right[class] -= 1;

            let next_value = sorted[i + 1].0;
            if value == next_value {
                continue;
            }

            let n_left = (i + 1) as i128;
            let n_right = (n - i - 1) as i128;
            if n_left < min_leaf as i128 || n_right < min_leaf as i128 {
                continue;
            }

            let score = left_sq * SCALE as i128 / n_left + right_sq * SCALE as i128 / n_right;
            let threshold = midpoint(value, next_value);
            let candidate = SplitCandidate::new(feature_idx, threshold, score);

            best = match best {
                Some(current) if !candidate.beats(&current) => Some(current),
                _ => Some(candidate),
            };
        }

        best
    }

    /// Split samples based on threshold
    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: i64,
    ) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .partition(|&&idx| self.features[idx][feature_idx] <= threshold)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &idx in indices {
            counts[self.targets[idx] as usize] += 1;
        }
        counts
    }
}

/// Most frequent class; ties go to the lowest code.
fn majority(counts: &[usize]) -> u32 {
    let mut best = 0usize;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best as u32
}

/// Floor of the mean of two fixed-point values, so `low <= mid < high`.
fn midpoint(low: i64, high: i64) -> i64 {
    (low as i128 + high as i128).div_euclid(2) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deterministic::seeded_rng;

    fn all_rows(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_separable_feature() {
        // feature 0 is noise, feature 1 separates the classes
        let features = vec![
            vec![5, 100],
            vec![1, 200],
            vec![4, 300],
            vec![2, 1_000],
            vec![3, 1_100],
            vec![6, 1_200],
        ];
        let targets = vec![0, 0, 0, 1, 1, 1];

        let builder = CartBuilder::new(&features, &targets, 2, TreeConfig::default());
        let tree = builder.build(&all_rows(6), &mut seeded_rng(1));

        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.nodes[0].feature_idx, 1);
        assert_eq!(tree.nodes[0].threshold, 650);
        for (row, &target) in features.iter().zip(&targets) {
            assert_eq!(tree.predict(row), Some(target));
        }
    }

    #[test]
    fn test_fits_training_data_without_depth_limit() {
        let features: Vec<Vec<i64>> = (0..40).map(|i| vec![i % 7, i / 7, (i * 13) % 11]).collect();
        let targets: Vec<u32> = (0..40).map(|i| (i % 3) as u32).collect();

        let builder = CartBuilder::new(&features, &targets, 3, TreeConfig::default());
        let tree = builder.build(&all_rows(40), &mut seeded_rng(42));

        assert!(tree.validate(3, 3).is_ok());
        // Rows are distinct, so a fully grown tree memorizes them
        for (row, &target) in features.iter().zip(&targets) {
            assert_eq!(tree.predict(row), Some(target));
        }
    }

    #[test]
    fn test_leaf_only_tree() {
        let features = vec![vec![100_000], vec![200_000]];
        let targets = vec![2, 2];

        let builder = CartBuilder::new(&features, &targets, 3, TreeConfig::default());
        let tree = builder.build(&all_rows(2), &mut seeded_rng(0));

        assert_eq!(tree.nodes, vec![Node::leaf(2)]);
    }

    #[test]
    fn test_identical_rows_with_mixed_labels() {
        let features = vec![vec![7], vec![7], vec![7]];
        let targets = vec![1, 0, 1];

        let builder = CartBuilder::new(&features, &targets, 2, TreeConfig::default());
        let tree = builder.build(&all_rows(3), &mut seeded_rng(0));

        assert_eq!(tree.nodes, vec![Node::leaf(1)]);
    }

    #[test]
    fn test_max_depth_and_min_leaf() {
        let features: Vec<Vec<i64>> = (0..16).map(|i| vec![i]).collect();
        let targets: Vec<u32> = (0..16).map(|i| (i % 2) as u32).collect();

        let shallow = TreeConfig {
            max_depth: Some(2),
            ..TreeConfig::default()
        };
        let tree = CartBuilder::new(&features, &targets, 2, shallow)
            .build(&all_rows(16), &mut seeded_rng(3));
        assert!(tree.depth() <= 2);

        let wide_leaves = TreeConfig {
            min_samples_leaf: 5,
            ..TreeConfig::default()
        };
        let builder = CartBuilder::new(&features, &targets, 2, wide_leaves);
        let tree = builder.build(&all_rows(16), &mut seeded_rng(3));
        let sample = all_rows(16);
        for leaf_idx in (0..tree.nodes.len()).filter(|&i| tree.nodes[i].is_leaf()) {
            let reached = sample
                .iter()
                .filter(|&&row| leaf_of(&tree, &features[row]) == leaf_idx)
                .count();
            assert!(reached >= 5, "leaf {} reached by {} rows", leaf_idx, reached);
        }
    }

    #[test]
    fn test_bootstrap_duplicates_weigh_votes() {
        let features = vec![vec![1], vec![1]];
        let targets = vec![0, 1];

        let builder = CartBuilder::new(&features, &targets, 2, TreeConfig::default());
        let tree = builder.build(&[1, 1, 0], &mut seeded_rng(0));

        assert_eq!(tree.nodes, vec![Node::leaf(1)]);
    }

    #[test]
    fn test_same_rng_same_tree() {
        let features: Vec<Vec<i64>> = (0..30).map(|i| vec![i % 5, (i * 7) % 9, i % 4]).collect();
        let targets: Vec<u32> = (0..30).map(|i| ((i * 3) % 4) as u32).collect();
        let config = TreeConfig {
            max_features: 1,
            ..TreeConfig::default()
        };

        let builder = CartBuilder::new(&features, &targets, 4, config);
        let a = builder.build(&all_rows(30), &mut seeded_rng(9));
        let b = builder.build(&all_rows(30), &mut seeded_rng(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint(1, 2), 1);
        assert_eq!(midpoint(-3, -2), -3);
        assert_eq!(midpoint(10, 20), 15);
        assert_eq!(midpoint(i64::MAX - 1, i64::MAX), i64::MAX - 1);
    }

    fn leaf_of(tree: &Tree, row: &[i64]) -> usize {
        let mut idx = 0usize;
        while !tree.nodes[idx].is_leaf() {
            let node = &tree.nodes[idx];
            idx = if row[node.feature_idx as usize] <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
        idx
    }
}
