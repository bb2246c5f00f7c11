//! Seeded train/test partitioning.
//!
//! `n_test = ceil(test_fraction * n)`; the first `n_test` rows of a seeded
//! permutation form the test side and the remainder the train side. No
//! stratification is applied.

use rand::seq::SliceRandom;

use crate::deterministic::seeded_rng;
use crate::errors::TrainerError;

/// Aligned train/test partition of paired rows and targets
#[derive(Clone, Debug, PartialEq)]
pub struct TrainTestSplit<X, Y> {
    pub train_rows: Vec<X>,
    pub test_rows: Vec<X>,
    pub train_targets: Vec<Y>,
    pub test_targets: Vec<Y>,
    /// Source row index of each training row
    pub train_indices: Vec<usize>,
    /// Source row index of each test row
    pub test_indices: Vec<usize>,
}

impl<X, Y> TrainTestSplit<X, Y> {
    pub fn train_len(&self) -> usize {
        self.train_rows.len()
    }

    pub fn test_len(&self) -> usize {
        self.test_rows.len()
    }
}

/// Number of rows placed in the test partition.
pub fn test_count(n_rows: usize, test_fraction: f64) -> usize {
    (test_fraction * n_rows as f64).ceil() as usize
}

/// Partition `rows` and `targets` with a seeded shuffle.
pub fn train_test_split<X: Clone, Y: Clone>(
    rows: &[X],
    targets: &[Y],
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit<X, Y>, TrainerError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainerError::Split(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    if rows.len() != targets.len() {
        return Err(TrainerError::Split(format!(
            "{} feature rows but {} targets",
            rows.len(),
            targets.len()
        )));
    }

    let n = rows.len();
    let n_test = test_count(n, test_fraction);
    if n_test == 0 || n_test >= n {
        return Err(TrainerError::Split(format!(
            "cannot split {} rows with test fraction {}: one side would be empty",
            n, test_fraction
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut seeded_rng(seed));

    let (test_idx, train_idx) = order.split_at(n_test);
    let pick_rows = |idx: &[usize]| idx.iter().map(|&i| rows[i].clone()).collect::<Vec<X>>();
    let pick_targets = |idx: &[usize]| idx.iter().map(|&i| targets[i].clone()).collect::<Vec<Y>>();

    Ok(TrainTestSplit {
        train_rows: pick_rows(train_idx),
        test_rows: pick_rows(test_idx),
        train_targets: pick_targets(train_idx),
        test_targets: pick_targets(test_idx),
        train_indices: train_idx.to_vec(),
        test_indices: test_idx.to_vec(),
    })
}
