use crop_core::CropCoreError;
use thiserror::Error;

/// Errors returned by the crop trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error in {path}: {reason}")]
    Dataset { path: String, reason: String },

    #[error("target column '{0}' not found")]
    MissingColumn(String),

    #[error("line {line}, column '{column}': {reason}")]
    InvalidValue {
        line: u64,
        column: String,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("split error: {0}")]
    Split(String),

    #[error("training error: {0}")]
    Training(String),

    #[error(transparent)]
    Core(#[from] CropCoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
