//! Crop Recommendation Core
//!
//! Model-side types shared by the trainer and by any process that reloads
//! the persisted artifacts to make predictions.
//!
//! Modules:
//! - `fixed`: Fixed-point conversion of feature values
//! - `encoder`: Label encoder between crop names and class codes
//! - `tree`: Integer-only decision tree nodes and traversal
//! - `forest`: Random forest artifact with majority-vote inference
//! - `predictor`: Model + encoder pair returning crop names
//! - `serialization`: Canonical JSON and BLAKE3 artifact hashing

pub mod encoder;
pub mod errors;
pub mod fixed;
pub mod forest;
pub mod predictor;
pub mod serialization;
pub mod tree;

pub use encoder::{LabelEncoder, ENCODER_FORMAT_VERSION};
pub use errors::{CropCoreError, Result};
pub use fixed::{from_fixed, parse_fixed, to_fixed, SCALE};
pub use forest::{RandomForest, MODEL_FORMAT_VERSION};
pub use predictor::CropPredictor;
pub use tree::{Node, Tree};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
