//! Feature Normalizer / Denormalizer
//!
//! Fitted affine transforms loaded from disk, never refit at runtime.
//! Parameter names follow the usual fitted-scaler attributes:
//!
//! - `standard`: `z = (x - mean) / scale`
//! - `min_max`:  `z = x * scale + min`

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AffineScaler {
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

/// A zero std means a constant column; it passes through unscaled
fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 { 1.0 } else { scale }
}

impl AffineScaler {
    pub fn width(&self) -> usize {
        match self {
            AffineScaler::Standard { mean, .. } => mean.len(),
            AffineScaler::MinMax { min, .. } => min.len(),
        }
    }

    /// Structural check against the expected column count
    pub fn validate(&self, expected_width: usize) -> Result<(), String> {
        let (offsets, scales) = match self {
            AffineScaler::Standard { mean, scale } => (mean, scale),
            AffineScaler::MinMax { min, scale } => (min, scale),
        };

        if offsets.len() != scales.len() {
            return Err(format!(
                "parameter length mismatch ({} offsets, {} scales)",
                offsets.len(),
                scales.len()
            ));
        }
        if offsets.len() != expected_width {
            return Err(format!("expected {} columns, got {}", expected_width, offsets.len()));
        }
        if offsets.iter().chain(scales.iter()).any(|v| !v.is_finite()) {
            return Err("non-finite parameter".to_string());
        }
        if let AffineScaler::MinMax { scale, .. } = self {
            if scale.iter().any(|s| *s == 0.0) {
                return Err("min_max scale must be non-zero".to_string());
            }
        }

        Ok(())
    }

    pub fn transform_value(&self, column: usize, x: f64) -> f64 {
        match self {
            AffineScaler::Standard { mean, scale } => (x - mean[column]) / non_zero(scale[column]),
            AffineScaler::MinMax { min, scale } => x * scale[column] + min[column],
        }
    }

    pub fn inverse_value(&self, column: usize, z: f64) -> f64 {
        match self {
            AffineScaler::Standard { mean, scale } => z * non_zero(scale[column]) + mean[column],
            AffineScaler::MinMax { min, scale } => (z - min[column]) / scale[column],
        }
    }

    /// Column-wise transform of a `(rows, width)` matrix
    pub fn transform_matrix(&self, matrix: &Array2<f32>) -> CoreResult<Array2<f32>> {
        let (_, cols) = matrix.dim();
        if cols != self.width() {
            return Err(CoreError::InvalidInput(format!(
                "scaler fitted on {} columns, matrix has {}",
                self.width(),
                cols
            )));
        }

        Ok(Array2::from_shape_fn(matrix.dim(), |(r, c)| {
            self.transform_value(c, matrix[[r, c]] as f64) as f32
        }))
    }
}

/// Persisted scaler: parameters plus an optional layout tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerFile {
    #[serde(flatten)]
    pub scaler: AffineScaler,
    #[serde(default)]
    pub feature_version: Option<u8>,
    #[serde(default)]
    pub layout_hash: Option<u32>,
}

/// Both fitted transforms, owned by the scoring context
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationState {
    features: AffineScaler,
    target: AffineScaler,
}

impl NormalizationState {
    pub fn new(features: AffineScaler, target: AffineScaler, feature_count: usize) -> CoreResult<Self> {
        features
            .validate(feature_count)
            .map_err(|e| CoreError::InvalidInput(format!("feature scaler: {}", e)))?;
        target
            .validate(1)
            .map_err(|e| CoreError::InvalidInput(format!("target scaler: {}", e)))?;

        Ok(Self { features, target })
    }

    pub fn normalize(&self, matrix: &Array2<f32>) -> CoreResult<Array2<f32>> {
        self.features.transform_matrix(matrix)
    }

    pub fn normalize_target(&self, value: f64) -> f64 {
        self.target.transform_value(0, value)
    }

    pub fn denormalize(&self, value: f64) -> f64 {
        self.target.inverse_value(0, value)
    }

    pub fn features(&self) -> &AffineScaler {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> NormalizationState {
        NormalizationState::new(
            AffineScaler::Standard { mean: vec![1.0, 10.0], scale: vec![2.0, 0.0] },
            AffineScaler::MinMax { min: vec![-0.1], scale: vec![0.1] },
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_standard_transform_with_constant_column() {
        let matrix = Array2::from_shape_vec((2, 2), vec![3.0, 10.0, -1.0, 12.0]).unwrap();
        let z = state().normalize(&matrix).unwrap();

        assert_eq!(z[[0, 0]], 1.0);
        assert_eq!(z[[1, 0]], -1.0);
        assert_eq!(z[[0, 1]], 0.0);
        assert_eq!(z[[1, 1]], 2.0);
    }

    #[test]
    fn test_target_round_trip() {
        let state = state();
        for x in [0.0, 1.0, 4.0, 6.999, 7.0, 10.0] {
            let back = state.denormalize(state.normalize_target(x));
            assert!((back - x).abs() < 1e-9, "{} -> {}", x, back);
        }
        // min_max with min=-0.1, scale=0.1 maps [1, 11] onto [0, 1]
        assert!((state.denormalize(0.0) - 1.0).abs() < 1e-9);
        assert!((state.denormalize(1.0) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_standard_target_round_trip() {
        let target = AffineScaler::Standard { mean: vec![5.5], scale: vec![2.25] };
        for x in [-3.0, 0.0, 5.5, 12.0] {
            let back = target.inverse_value(0, target.transform_value(0, x));
            assert!((back - x).abs() < 1e-9);
        }
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let matrix = Array2::<f32>::zeros((14, 3));
        assert!(matches!(state().normalize(&matrix), Err(CoreError::InvalidInput(_))));

        let bad = AffineScaler::Standard { mean: vec![0.0; 3], scale: vec![1.0; 3] };
        assert!(bad.validate(2).is_err());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let zero = AffineScaler::MinMax { min: vec![0.0], scale: vec![0.0] };
        assert!(zero.validate(1).is_err());

        let nan = AffineScaler::Standard { mean: vec![f64::NAN], scale: vec![1.0] };
        assert!(nan.validate(1).is_err());

        let ragged = AffineScaler::Standard { mean: vec![0.0, 1.0], scale: vec![1.0] };
        assert!(ragged.validate(2).is_err());
    }

    #[test]
    fn test_scaler_file_json() {
        let json = r#"{"kind": "standard", "mean": [1.0], "scale": [2.0], "feature_version": 1}"#;
        let file: ScalerFile = serde_json::from_str(json).unwrap();

        assert_eq!(file.feature_version, Some(1));
        assert!(file.layout_hash.is_none());
        assert_eq!(file.scaler.width(), 1);
    }
}
