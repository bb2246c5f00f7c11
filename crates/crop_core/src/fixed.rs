//! Fixed-point feature encoding.
//!
//! Feature values and split thresholds are stored as `i64` micro-units
//! (1 unit = 1e-6) so that split comparisons and persisted thresholds are
//! identical on every platform.

use crate::errors::{CropCoreError, Result};

/// Scaling factor: 1 unit = 1e-6.
pub const SCALE: i64 = 1_000_000;

// Largest magnitude whose scaled value still fits in an i64.
const MAX_ABS: f64 = (i64::MAX / SCALE) as f64;

/// Convert an `f64` into fixed-point, rounding to the nearest micro unit.
pub fn to_fixed(value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(CropCoreError::InvalidNumber {
            value: value.to_string(),
            reason: "value is not finite".to_string(),
        });
    }
    if value.abs() > MAX_ABS {
        return Err(CropCoreError::InvalidNumber {
            value: value.to_string(),
            reason: format!("magnitude exceeds {}", MAX_ABS),
        });
    }
    Ok((value * SCALE as f64).round() as i64)
}

/// Convert fixed-point back to `f64`.
#[inline]
pub fn from_fixed(raw: i64) -> f64 {
    raw as f64 / SCALE as f64
}

/// Parse a decimal string (surrounding whitespace ignored) into fixed-point.
pub fn parse_fixed(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    let value: f64 = trimmed.parse().map_err(|_| CropCoreError::InvalidNumber {
        value: trimmed.to_string(),
        reason: "not a decimal number".to_string(),
    })?;
    to_fixed(value)
}

/// Convert a whole feature row into fixed-point.
pub fn row_to_fixed(values: &[f64]) -> Result<Vec<i64>> {
    values.iter().map(|&v| to_fixed(v)).collect()
}
