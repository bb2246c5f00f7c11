//! Random forest trainer
//!
//! Grows bootstrap-resampled Gini trees in parallel from per-tree seeds
//! drawn up front, so the fitted forest depends only on the data and the
//! master seed.

use crop_core::{RandomForest, Tree};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::deterministic::{derive_tree_seeds, seeded_rng};
use crate::errors::TrainerError;

/// Number of features examined at each split
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    Log2,
    All,
    Count(usize),
}

impl MaxFeatures {
    /// Resolve against the dataset width; always within `1..=n_features`.
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features.max(1);
        let k = match self {
            MaxFeatures::Sqrt => (n as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n as f64).log2().floor() as usize,
            MaxFeatures::All => n,
            MaxFeatures::Count(k) => *k,
        };
        k.clamp(1, n)
    }
}

/// Random forest training configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.n_trees == 0 {
            return Err(TrainerError::Config("n_trees must be > 0".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(TrainerError::Config(
                "min_samples_split must be >= 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainerError::Config(
                "min_samples_leaf must be >= 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(TrainerError::Config("max_depth must be >= 1".to_string()));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(TrainerError::Config("max_features must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Random forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Fit a forest on fixed-point rows and class codes in `[0, n_classes)`.
    pub fn fit(
        &self,
        feature_names: &[String],
        rows: &[Vec<i64>],
        targets: &[u32],
        n_classes: usize,
    ) -> Result<RandomForest, TrainerError> {
        self.config.validate()?;
        self.check_inputs(feature_names, rows, targets, n_classes)?;

        let n_samples = rows.len();
        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: self.config.max_features.resolve(feature_names.len()),
        };

        info!(
            trees = self.config.n_trees,
            samples = n_samples,
            features = feature_names.len(),
            classes = n_classes,
            max_features = tree_config.max_features,
            "growing random forest"
        );

        let builder = CartBuilder::new(rows, targets, n_classes, tree_config);
        let seeds = derive_tree_seeds(self.config.seed, self.config.n_trees);
        let bootstrap = self.config.bootstrap;

        let trees: Vec<Tree> = seeds
            .par_iter()
            .enumerate()
            .map(|(tree_idx, &seed)| {
                let mut rng = seeded_rng(seed);
                let sample: Vec<usize> = if bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let tree = builder.build(&sample, &mut rng);
                debug!(
                    tree = tree_idx + 1,
                    nodes = tree.nodes.len(),
                    depth = tree.depth(),
                    "tree grown"
                );
                tree
            })
            .collect();

        Ok(RandomForest::new(feature_names.to_vec(), n_classes, trees)?)
    }

    fn check_inputs(
        &self,
        feature_names: &[String],
        rows: &[Vec<i64>],
        targets: &[u32],
        n_classes: usize,
    ) -> Result<(), TrainerError> {
        if rows.is_empty() {
            return Err(TrainerError::Training("no training rows".to_string()));
        }
        if rows.len() != targets.len() {
            return Err(TrainerError::Training(format!(
                "{} rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        if feature_names.is_empty() {
            return Err(TrainerError::Training("no feature columns".to_string()));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_names.len())
        {
            return Err(TrainerError::Training(format!(
                "row {} has {} features, expected {}",
                i,
                row.len(),
                feature_names.len()
            )));
        }
        if n_classes == 0 {
            return Err(TrainerError::Training("no classes".to_string()));
        }
        if let Some(&code) = targets.iter().find(|&&code| code as usize >= n_classes) {
            return Err(TrainerError::Training(format!(
                "target code {} out of range for {} classes",
                code, n_classes
            )));
        }
        Ok(())
    }
}
