//! Random forest classifier with majority-vote inference
//!
//! Implements the persisted model artifact:
//! - Explicit schema with a format version tag
//! - Canonical JSON serialization
//! - Blake3 artifact hashing
//! - Integer-only tree traversal

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{CropCoreError, Result};
use crate::fixed::SCALE;
use crate::serialization::{blake3_hex, canonical_json_bytes, load_json, save_canonical_json};
use crate::tree::Tree;

/// Current on-disk format revision of the model artifact
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Fitted ensemble of classification trees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomForest {
    /// Artifact format revision
    pub format_version: u32,

    /// Fixed-point scale of feature values and thresholds
    pub scale: i64,

    /// Number of classes the trees vote over
    pub n_classes: usize,

    /// Feature column names in the order rows must be supplied
    pub feature_names: Vec<String>,

    /// Trees in the ensemble
    pub trees: Vec<Tree>,
}

impl RandomForest {
    /// Assemble and validate a forest.
    pub fn new(feature_names: Vec<String>, n_classes: usize, trees: Vec<Tree>) -> Result<Self> {
        let forest = Self {
            format_version: MODEL_FORMAT_VERSION,
            scale: SCALE,
            n_classes,
            feature_names,
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(CropCoreError::UnsupportedVersion {
                found: self.format_version,
                expected: MODEL_FORMAT_VERSION,
            });
        }

        if self.scale != SCALE {
            return Err(CropCoreError::ValidationFailed(format!(
                "Unsupported scale: {}",
                self.scale
            )));
        }

        if self.n_classes == 0 {
            return Err(CropCoreError::ValidationFailed(
                "Model has no classes".to_string(),
            ));
        }

        if self.feature_names.is_empty() {
            return Err(CropCoreError::ValidationFailed(
                "Model has no features".to_string(),
            ));
        }

        if self.trees.is_empty() {
            return Err(CropCoreError::ValidationFailed(
                "Model has no trees".to_string(),
            ));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features(), self.n_classes)
                .map_err(|e| CropCoreError::ValidationFailed(format!("Tree {}: {}", i, e)))?;
        }

        Ok(())
    }

    fn check_width(&self, features: &[i64]) -> Result<()> {
        if features.len() != self.n_features() {
            return Err(CropCoreError::FeatureCount {
                expected: self.n_features(),
                got: features.len(),
            });
        }
        Ok(())
    }

    /// Per-class vote counts for a fixed-point feature row.
    pub fn votes(&self, features: &[i64]) -> Result<Vec<u32>> {
        self.check_width(features)?;

        let mut votes = vec![0u32; self.n_classes];
        for class in self.trees.iter().filter_map(|tree| tree.predict(features)) {
            if let Some(count) = votes.get_mut(class as usize) {
                *count += 1;
            }
        }
        Ok(votes)
    }

    /// Majority-vote class code; ties go to the lowest code.
    pub fn predict(&self, features: &[i64]) -> Result<u32> {
        let votes = self.votes(features)?;
        let mut best = 0usize;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        Ok(best as u32)
    }

    /// Fraction of trees voting for each class.
    pub fn predict_proba(&self, features: &[i64]) -> Result<Vec<f64>> {
        let votes = self.votes(features)?;
        let total = votes.iter().map(|&v| v as f64).sum::<f64>().max(1.0);
        Ok(votes.into_iter().map(|v| v as f64 / total).collect())
    }

    pub fn predict_batch(&self, rows: &[Vec<i64>]) -> Result<Vec<u32>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Blake3 hash of the canonical JSON representation, as hex
    pub fn hash_hex(&self) -> Result<String> {
        Ok(blake3_hex(&canonical_json_bytes(self)?))
    }

    /// Save model to JSON file with canonical serialization, returning the
    /// hash of the written bytes
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        save_canonical_json(self, path)
    }

    /// Load and validate a model from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model: RandomForest = load_json(path)?;
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn stump(threshold: i64, left: u32, right: u32) -> Tree {
        Tree::new(vec![
            Node::internal(0, threshold, 1, 2),
            Node::leaf(left),
            Node::leaf(right),
        ])
    }

    fn sample_forest() -> RandomForest {
        RandomForest::new(
            vec!["N".into(), "ph".into()],
            3,
            vec![stump(10, 0, 1), stump(20, 0, 2), stump(30, 1, 2)],
        )
        .unwrap()
    }

    #[test]
    fn test_majority_vote() {
        let forest = sample_forest();
        assert_eq!(forest.votes(&[5, 0]).unwrap(), vec![2, 1, 0]);
        assert_eq!(forest.predict(&[5, 0]).unwrap(), 0);
        assert_eq!(forest.predict(&[100, 0]).unwrap(), 2);
    }

    #[test]
    fn test_tie_goes_to_lowest_code() {
        // x = 15: trees vote 1, 0, 1
        let forest = sample_forest();
        assert_eq!(forest.votes(&[15, 0]).unwrap(), vec![1, 2, 0]);

        let tied = RandomForest::new(
            vec!["N".into()],
            2,
            vec![stump(10, 1, 1), stump(10, 0, 0)],
        )
        .unwrap();
        assert_eq!(tied.predict(&[0]).unwrap(), 0);
    }

    #[test]
    fn test_predict_proba() {
        let forest = sample_forest();
        let proba = forest.predict_proba(&[25, 0]).unwrap();
        assert_eq!(proba.len(), 3);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((proba[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_feature_count_checked() {
        let forest = sample_forest();
        assert!(matches!(
            forest.predict(&[1]),
            Err(CropCoreError::FeatureCount { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_validation() {
        assert!(RandomForest::new(vec!["N".into()], 2, vec![]).is_err());
        assert!(RandomForest::new(vec![], 2, vec![stump(0, 0, 1)]).is_err());
        assert!(RandomForest::new(vec!["N".into()], 1, vec![stump(0, 0, 1)]).is_err());
    }

    #[test]
    fn test_save_load_round_trip_keeps_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crop_model.json");
        let forest = sample_forest();

        let written = forest.save_json(&path).unwrap();
        assert_eq!(written, forest.hash_hex().unwrap());

        let loaded = RandomForest::load_json(&path).unwrap();
        assert_eq!(loaded, forest);
    }

    #[test]
    fn test_load_rejects_corrupt_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crop_model.json");
        let mut forest = sample_forest();
        forest.trees[0].nodes[0].left = 7;
        std::fs::write(&path, serde_json::to_string(&forest).unwrap()).unwrap();

        assert!(matches!(
            RandomForest::load_json(&path),
            Err(CropCoreError::ValidationFailed(_))
        ));
    }
}
