//! Pipeline configuration
//!
//! Layered lowest to highest: built-in defaults, TOML file,
//! `CROP_TRAINER_*` environment variables, then CLI flags (applied by the
//! binary).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::errors::TrainerError;
use crate::trainer::ForestConfig;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "CROP_TRAINER_";

/// Paths and hyperparameters for one training run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input CSV dataset
    pub input: PathBuf,
    /// Name of the target column
    pub target_column: String,
    /// Destination of the model artifact
    pub model_output: PathBuf,
    /// Destination of the label encoder artifact
    pub encoder_output: PathBuf,
    /// Fraction of rows held out from training
    pub test_size: f64,
    /// Seed of the train/test shuffle
    pub split_seed: u64,
    pub forest: ForestConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Crop_recommendation.csv"),
            target_column: "label".to_string(),
            model_output: PathBuf::from("crop_model.pkl"),
            encoder_output: PathBuf::from("label_encoder.pkl"),
            test_size: 0.2,
            split_seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            TrainerError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TrainerError> {
        toml::from_str(content)
            .map_err(|e| TrainerError::Config(format!("failed to parse config: {}", e)))
    }

    /// Apply `CROP_TRAINER_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), TrainerError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (keys include [`ENV_PREFIX`]).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), TrainerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(val) = get("INPUT") {
            self.input = PathBuf::from(val);
        }
        if let Some(val) = get("TARGET") {
            self.target_column = val;
        }
        if let Some(val) = get("MODEL_OUT") {
            self.model_output = PathBuf::from(val);
        }
        if let Some(val) = get("ENCODER_OUT") {
            self.encoder_output = PathBuf::from(val);
        }
        if let Some(val) = get("TREES") {
            self.forest.n_trees = parse_var("TREES", &val)?;
        }
        if let Some(val) = get("SEED") {
            let seed = parse_var("SEED", &val)?;
            self.forest.seed = seed;
            self.split_seed = seed;
        }
        if let Some(val) = get("TEST_SIZE") {
            self.test_size = parse_var("TEST_SIZE", &val)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.target_column.trim().is_empty() {
            return Err(TrainerError::Config("target column must not be empty".to_string()));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TrainerError::Config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.model_output == self.encoder_output {
            return Err(TrainerError::Config(
                "model and encoder outputs must differ".to_string(),
            ));
        }
        self.forest.validate()
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, TrainerError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        TrainerError::Config(format!("{}{}='{}': {}", ENV_PREFIX, name, value, e))
    })
}
