//! Reloaded model + encoder pair producing crop names.

use std::path::Path;
use tracing::debug;

use crate::encoder::LabelEncoder;
use crate::errors::{CropCoreError, Result};
use crate::fixed::row_to_fixed;
use crate::forest::RandomForest;

/// Predicts crop names from raw feature values using persisted artifacts.
#[derive(Debug, Clone)]
pub struct CropPredictor {
    model: RandomForest,
    encoder: LabelEncoder,
}

impl CropPredictor {
    /// Pair a model with the encoder it was trained against.
    pub fn new(model: RandomForest, encoder: LabelEncoder) -> Result<Self> {
        if model.n_classes != encoder.n_classes() {
            return Err(CropCoreError::ValidationFailed(format!(
                "model votes over {} classes but encoder has {}",
                model.n_classes,
                encoder.n_classes()
            )));
        }
        Ok(Self { model, encoder })
    }

    /// Load both artifacts from disk.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(model_path: P, encoder_path: Q) -> Result<Self> {
        let model = RandomForest::load_json(model_path.as_ref())?;
        let encoder = LabelEncoder::load_json(encoder_path.as_ref())?;
        debug!(
            trees = model.n_trees(),
            classes = encoder.n_classes(),
            "loaded crop predictor"
        );
        Self::new(model, encoder)
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// Predicted crop name for one row of raw feature values.
    pub fn predict(&self, features: &[f64]) -> Result<String> {
        let row = row_to_fixed(features)?;
        let code = self.model.predict(&row)?;
        Ok(self.encoder.decode(code)?.to_string())
    }

    /// Vote share per crop name, in encoder order.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<(String, f64)>> {
        let row = row_to_fixed(features)?;
        let proba = self.model.predict_proba(&row)?;
        Ok(self
            .encoder
            .classes()
            .iter()
            .cloned()
            .zip(proba)
            .collect())
    }

    /// Up to `top` crops ranked by vote share, highest first; equal shares
    /// keep encoder order.
    pub fn recommend(&self, features: &[f64], top: usize) -> Result<Vec<(String, f64)>> {
        let mut ranked = self.predict_proba(features)?;
        // Stable sort keeps ties in code order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top);
        debug!(top, returned = ranked.len(), "ranked crop recommendations");
        Ok(ranked)
    }
}
