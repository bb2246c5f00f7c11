//! Error types for the crop model core

use thiserror::Error;

/// Errors that can occur while encoding labels, converting features or
/// reading and writing model artifacts.
#[derive(Error, Debug)]
pub enum CropCoreError {
    /// Feature value could not be converted to fixed-point
    #[error("Invalid numeric value '{value}': {reason}")]
    InvalidNumber { value: String, reason: String },

    /// Label encoder fitted on an empty sequence
    #[error("Cannot fit label encoder on an empty label sequence")]
    EmptyLabels,

    /// Label not seen when the encoder was fitted
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    /// Class code outside of the fitted range
    #[error("Class code {code} out of range for {n_classes} classes")]
    CodeOutOfRange { code: u32, n_classes: usize },

    /// Feature row has the wrong width for the model
    #[error("Expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    /// Artifact failed structural validation
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Artifact written by an incompatible format revision
    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for crop core operations
pub type Result<T> = std::result::Result<T, CropCoreError>;
