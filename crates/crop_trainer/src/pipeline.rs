//! End-to-end training run: load, encode, split, fit, persist.

use crop_core::{LabelEncoder, RandomForest};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::dataset::RawTable;
use crate::errors::TrainerError;
use crate::split::{train_test_split, TrainTestSplit};
use crate::trainer::ForestTrainer;

/// In-memory result of a training run, before anything is written
#[derive(Clone, Debug)]
pub struct TrainedPipeline {
    pub model: RandomForest,
    pub encoder: LabelEncoder,
    /// Train and held-out partitions; the held-out side is never scored
    pub split: TrainTestSplit<Vec<i64>, u32>,
    pub total_rows: usize,
}

/// BLAKE3 hex digests of the written artifacts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactHashes {
    pub model: String,
    pub encoder: String,
}

/// Summary of a completed run
#[derive(Clone, Debug)]
pub struct TrainingReport {
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub model_path: PathBuf,
    pub encoder_path: PathBuf,
    pub hashes: ArtifactHashes,
}

/// Run every stage up to (not including) artifact persistence.
pub fn fit_pipeline(config: &PipelineConfig) -> Result<TrainedPipeline, TrainerError> {
    config.validate()?;

    info!("Loading dataset from: {}", config.input.display());
    let table = RawTable::from_csv(&config.input)?;

    let (features, labels) = table.split_target(&config.target_column)?;
    info!(
        "Loaded {} samples with {} features",
        features.len(),
        features.feature_count()
    );
    for (name, (min, max)) in features.columns.iter().zip(features.feature_stats()) {
        debug!("  {}: min={}, max={}", name, min, max);
    }

    let (encoder, codes) = LabelEncoder::fit_transform(&labels)?;
    info!("Encoded {} distinct labels", encoder.n_classes());

    let split = train_test_split(&features.rows, &codes, config.test_size, config.split_seed)?;
    info!(
        "Split {} rows into {} train / {} test (seed {})",
        features.len(),
        split.train_len(),
        split.test_len(),
        config.split_seed
    );

    let trainer = ForestTrainer::new(config.forest.clone());
    let model = trainer.fit(
        &features.columns,
        &split.train_rows,
        &split.train_targets,
        encoder.n_classes(),
    )?;
    info!("Training complete: {} trees", model.n_trees());

    Ok(TrainedPipeline {
        model,
        encoder,
        split,
        total_rows: features.len(),
    })
}

/// Persist model then encoder. Existing files are replaced; a failure on
/// the encoder leaves the model file in place.
pub fn write_artifacts(
    model: &RandomForest,
    encoder: &LabelEncoder,
    model_path: &Path,
    encoder_path: &Path,
) -> Result<ArtifactHashes, TrainerError> {
    info!("Saving model to: {}", model_path.display());
    let model_hash = model.save_json(model_path)?;

    info!("Saving label encoder to: {}", encoder_path.display());
    let encoder_hash = encoder.save_json(encoder_path)?;

    Ok(ArtifactHashes {
        model: model_hash,
        encoder: encoder_hash,
    })
}

/// Train from `config.input` and write both artifacts.
pub fn run_pipeline(config: &PipelineConfig) -> Result<TrainingReport, TrainerError> {
    let trained = fit_pipeline(config)?;
    let hashes = write_artifacts(
        &trained.model,
        &trained.encoder,
        &config.model_output,
        &config.encoder_output,
    )?;

    Ok(TrainingReport {
        total_rows: trained.total_rows,
        train_rows: trained.split.train_len(),
        test_rows: trained.split.test_len(),
        feature_names: trained.model.feature_names.clone(),
        classes: trained.encoder.classes().to_vec(),
        model_path: config.model_output.clone(),
        encoder_path: config.encoder_output.clone(),
        hashes,
    })
}
