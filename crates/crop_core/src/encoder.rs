//! Label encoder mapping class names to dense integer codes.
//!
//! Classes are sorted byte-wise; the code of a label is its position in that
//! sorted list, so codes always cover `[0, n_classes)` without gaps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::errors::{CropCoreError, Result};
use crate::serialization::{load_json, save_canonical_json};

/// Current on-disk format revision of the encoder artifact
pub const ENCODER_FORMAT_VERSION: u32 = 1;

/// Fitted bidirectional mapping between class names and codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    format_version: u32,
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit the encoder on the distinct values of `labels`.
    pub fn fit<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();

        if distinct.is_empty() {
            return Err(CropCoreError::EmptyLabels);
        }

        Ok(Self {
            format_version: ENCODER_FORMAT_VERSION,
            classes: distinct.into_iter().collect(),
        })
    }

    /// Fit on `labels` and return the encoder together with the codes of
    /// `labels` in input order.
    pub fn fit_transform<S: AsRef<str>>(labels: &[S]) -> Result<(Self, Vec<u32>)> {
        let encoder = Self::fit(labels.iter().map(|l| l.as_ref()))?;
        let codes = encoder.transform(labels)?;
        Ok((encoder, codes))
    }

    /// Build an encoder from an explicit class list, which must be sorted and
    /// free of duplicates.
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        let encoder = Self {
            format_version: ENCODER_FORMAT_VERSION,
            classes,
        };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Code assigned to `label`.
    pub fn encode(&self, label: &str) -> Result<u32> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map(|idx| idx as u32)
            .map_err(|_| CropCoreError::UnknownLabel(label.to_string()))
    }

    /// Encode a sequence of labels, preserving order.
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<u32>> {
        labels.iter().map(|label| self.encode(label.as_ref())).collect()
    }

    /// Class name for `code`.
    pub fn decode(&self, code: u32) -> Result<&str> {
        self.classes
            .get(code as usize)
            .map(String::as_str)
            .ok_or(CropCoreError::CodeOutOfRange {
                code,
                n_classes: self.classes.len(),
            })
    }

    /// Decode a sequence of codes, preserving order.
    pub fn inverse_transform(&self, codes: &[u32]) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|&code| self.decode(code).map(str::to_string))
            .collect()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Check format version and that classes are non-empty, sorted and unique.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != ENCODER_FORMAT_VERSION {
            return Err(CropCoreError::UnsupportedVersion {
                found: self.format_version,
                expected: ENCODER_FORMAT_VERSION,
            });
        }

        if self.classes.is_empty() {
            return Err(CropCoreError::ValidationFailed(
                "encoder has no classes".to_string(),
            ));
        }

        if let Some(pair) = self.classes.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(CropCoreError::ValidationFailed(format!(
                "classes not strictly sorted at '{}' / '{}'",
                pair[0], pair[1]
            )));
        }

        Ok(())
    }

    /// Save as canonical JSON, returning the BLAKE3 hex digest of the file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        save_canonical_json(self, path)
    }

    /// Load and validate an encoder artifact.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let encoder: LabelEncoder = load_json(path)?;
        encoder.validate()?;
        Ok(encoder)
    }
}
