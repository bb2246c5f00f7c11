//! Crop Recommendation Trainer - Deterministic offline random forest trainer
//!
//! Loads a soil/climate CSV, label-encodes the crop column, holds out a
//! seeded test partition and fits a random forest, persisting the model and
//! the encoder as canonical JSON artifacts.

pub mod cart;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod pipeline;
pub mod split;
pub mod trainer;

pub use config::PipelineConfig;
pub use dataset::{FeatureMatrix, RawTable};
pub use deterministic::SplitTieBreaker;
pub use errors::TrainerError;
pub use pipeline::{
    fit_pipeline, run_pipeline, write_artifacts, ArtifactHashes, TrainedPipeline, TrainingReport,
};
pub use split::{train_test_split, TrainTestSplit};
pub use trainer::{ForestConfig, ForestTrainer, MaxFeatures};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
