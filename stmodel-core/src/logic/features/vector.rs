//! Feature Vector - Core data structure for ML input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::constants::SEQUENCE_LENGTH;
use crate::logic::aggregation::Measurement;
use crate::logic::error::{CoreError, CoreResult};
use super::layout::{
    FEATURE_COUNT, FEATURE_VERSION, FEATURE_LAYOUT,
    layout_hash, validate_layout, LayoutMismatchError,
};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// One timestep of model input, in `FEATURE_LAYOUT` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Project a measurement. `turbidity_index` is dropped on purpose.
    pub fn from_measurement(m: &Measurement) -> Self {
        Self::from_values([
            m.days_diff as f32,
            m.ph as f32,
            m.oxygene_dissous as f32,
            m.cod as f32,
            m.cod_mn as f32,
            m.nh4n as f32,
            m.tph as f32,
            m.dip as f32,
            m.din as f32,
            m.ndwi as f32,
            m.chlorophyll_index as f32,
        ])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// JSON form for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl From<&Measurement> for FeatureVector {
    fn from(m: &Measurement) -> Self {
        Self::from_measurement(m)
    }
}

// ============================================================================
// SEQUENCE VALIDATION + MATRIX
// ============================================================================

/// Check the scorer's input contract: exactly 14 rows, strictly
/// increasing `day_index`.
pub fn validate_sequence(measurements: &[Measurement]) -> CoreResult<()> {
    if measurements.len() != SEQUENCE_LENGTH {
        return Err(CoreError::InvalidInput(format!(
            "exactly {} measurements required, {} provided",
            SEQUENCE_LENGTH,
            measurements.len()
        )));
    }

    for pair in measurements.windows(2) {
        if pair[1].day_index <= pair[0].day_index {
            return Err(CoreError::InvalidInput(format!(
                "measurements must be in strictly increasing day order (day_index {} followed by {})",
                pair[0].day_index, pair[1].day_index
            )));
        }
    }

    Ok(())
}

/// Stack a validated sequence into a `(14, 11)` matrix
pub fn feature_matrix(measurements: &[Measurement]) -> CoreResult<Array2<f32>> {
    validate_sequence(measurements)?;

    let mut data = Vec::with_capacity(SEQUENCE_LENGTH * FEATURE_COUNT);
    for m in measurements {
        let vector = FeatureVector::from_measurement(m);
        vector.validate()?;
        data.extend_from_slice(vector.as_slice());
    }

    Array2::from_shape_vec((SEQUENCE_LENGTH, FEATURE_COUNT), data)
        .map_err(|e| CoreError::InvalidInput(format!("feature matrix shape: {}", e)))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::aggregation::{aggregate_at, Station};
    use chrono::Utc;

    fn sequence() -> Vec<Measurement> {
        aggregate_at(&[], &[], &Station::new(1, 33.5, -7.5), SEQUENCE_LENGTH, Utc::now())
    }

    #[test]
    fn test_projection_order() {
        let mut m = sequence().remove(0);
        m.days_diff = 1.5;
        m.chlorophyll_index = 0.9;
        m.turbidity_index = 99.0;

        let v = FeatureVector::from_measurement(&m);

        assert_eq!(v.values[0], 1.5);
        assert_eq!(v.get_by_name("pH"), Some(7.5));
        assert_eq!(v.get_by_name("COD"), Some(15.0));
        assert_eq!(v.values[10], 0.9);
        assert!(!v.values.contains(&99.0));
        assert!(v.validate().is_ok());
    }

    #[test]
    fn test_matrix_shape() {
        let matrix = feature_matrix(&sequence()).unwrap();
        assert_eq!(matrix.dim(), (14, 11));
        assert_eq!(matrix[[3, 1]], 7.5);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let mut rows = sequence();
        rows.pop();
        let err = feature_matrix(&rows).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn test_duplicate_day_rejected() {
        let mut rows = sequence();
        rows[5].day_index = rows[4].day_index;
        assert!(matches!(validate_sequence(&rows), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_to_log_entry() {
        let log = FeatureVector::from_measurement(&sequence()[0]).to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert_eq!(log["named_values"]["pH"], 7.5);
    }
}
