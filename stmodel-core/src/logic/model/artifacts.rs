//! Persisted artifacts: weights, scalers, training metrics

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{self, FEATURE_COUNT, HIDDEN_SIZE, NUM_LAYERS};
use crate::logic::error::{CoreError, CoreResult};
use crate::logic::features::layout::validate_layout;
use super::engine::SequenceModel;
use super::lstm::LstmModel;
use super::normalizer::{AffineScaler, ScalerFile};

/// Where the four artifacts live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub model: String,
    pub metrics: String,
    pub scaler_features: String,
    pub scaler_target: String,
}

impl ArtifactPaths {
    /// Env variables with the defaults from `constants`
    pub fn from_env() -> Self {
        Self {
            model: constants::get_model_path(),
            metrics: constants::get_metrics_path(),
            scaler_features: constants::get_scaler_features_path(),
            scaler_target: constants::get_scaler_target_path(),
        }
    }

    /// Standard file names under one directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let join = |name: &str| dir.join(name).to_string_lossy().into_owned();
        Self {
            model: join("best_model.json"),
            metrics: join("metrics.json"),
            scaler_features: join("scaler_features.json"),
            scaler_target: join("scaler_target.json"),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: constants::DEFAULT_MODEL_PATH.to_string(),
            metrics: constants::DEFAULT_METRICS_PATH.to_string(),
            scaler_features: constants::DEFAULT_SCALER_FEATURES_PATH.to_string(),
            scaler_target: constants::DEFAULT_SCALER_TARGET_PATH.to_string(),
        }
    }
}

/// Training-time metrics. Only `mae` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mae: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelMetrics {
    pub fn with_mae(mae: f64) -> Self {
        Self {
            mae,
            rmse: None,
            r2: None,
            extra: serde_json::Map::new(),
        }
    }

    /// `1 - mae`, clamped to [0, 1]
    pub fn confidence(&self) -> f64 {
        (1.0 - self.mae).clamp(0.0, 1.0)
    }
}

fn read(path: &str) -> CoreResult<String> {
    std::fs::read_to_string(path).map_err(|e| CoreError::artifact(path, e))
}

pub fn load_metrics(path: &str) -> CoreResult<ModelMetrics> {
    let metrics: ModelMetrics = serde_json::from_str(&read(path)?)
        .map_err(|e| CoreError::artifact(path, e))?;

    if !metrics.mae.is_finite() {
        return Err(CoreError::artifact(path, "mae must be finite"));
    }

    Ok(metrics)
}

/// Load a scaler, checking its width and optional layout tag
pub fn load_scaler(path: &str, expected_width: usize) -> CoreResult<AffineScaler> {
    let file: ScalerFile = serde_json::from_str(&read(path)?)
        .map_err(|e| CoreError::artifact(path, e))?;

    if let (Some(version), Some(hash)) = (file.feature_version, file.layout_hash) {
        validate_layout(version, hash)?;
    }

    file.scaler
        .validate(expected_width)
        .map_err(|e| CoreError::artifact(path, e))?;

    Ok(file.scaler)
}

/// Load weights. `.onnx` goes to ONNX Runtime when built with `onnx`,
/// everything else is read as a JSON state dict.
pub fn load_model(path: &str) -> CoreResult<Box<dyn SequenceModel>> {
    let is_onnx = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));

    if is_onnx {
        return load_onnx(path);
    }

    let model = LstmModel::from_json(&read(path)?)
        .map_err(|e| CoreError::artifact(path, e))?;

    if model.input_width() != FEATURE_COUNT
        || model.hidden_size() != HIDDEN_SIZE
        || model.num_layers() != NUM_LAYERS
    {
        return Err(CoreError::artifact(
            path,
            format!(
                "expected {}-layer LSTM ({} in, {} hidden), got {}-layer ({} in, {} hidden)",
                NUM_LAYERS,
                FEATURE_COUNT,
                HIDDEN_SIZE,
                model.num_layers(),
                model.input_width(),
                model.hidden_size()
            ),
        ));
    }

    log::info!("LSTM weights loaded from {} ({} layers, {} hidden)", path, NUM_LAYERS, HIDDEN_SIZE);
    Ok(Box::new(model))
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &str) -> CoreResult<Box<dyn SequenceModel>> {
    Ok(Box::new(super::onnx::OnnxModel::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &str) -> CoreResult<Box<dyn SequenceModel>> {
    Err(CoreError::artifact(path, "built without the `onnx` feature"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_metrics_confidence() {
        assert!((ModelMetrics::with_mae(0.08).confidence() - 0.92).abs() < 1e-12);
        assert_eq!(ModelMetrics::with_mae(1.7).confidence(), 0.0);
        assert_eq!(ModelMetrics::with_mae(-0.2).confidence(), 1.0);
    }

    #[test]
    fn test_load_metrics_keeps_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "metrics.json", r#"{"mae": 0.05, "r2": 0.91, "epochs": 40}"#);

        let metrics = load_metrics(&path).unwrap();
        assert_eq!(metrics.mae, 0.05);
        assert_eq!(metrics.r2, Some(0.91));
        assert_eq!(metrics.extra["epochs"], 40);
    }

    #[test]
    fn test_load_metrics_requires_mae() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "metrics.json", r#"{"r2": 0.91}"#);
        assert!(matches!(load_metrics(&path), Err(CoreError::Artifact { .. })));
    }

    #[test]
    fn test_missing_file_is_artifact_error() {
        let err = load_metrics("/nonexistent/metrics.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/metrics.json"));
    }

    #[test]
    fn test_load_scaler_layout_tag() {
        let dir = tempfile::tempdir().unwrap();
        let body = |hash: u32| {
            format!(
                r#"{{"kind": "standard", "mean": {:?}, "scale": {:?}, "feature_version": {}, "layout_hash": {}}}"#,
                vec![0.0; FEATURE_COUNT],
                vec![1.0; FEATURE_COUNT],
                FEATURE_VERSION,
                hash
            )
        };

        let good = write(&dir, "good.json", &body(layout_hash()));
        assert!(load_scaler(&good, FEATURE_COUNT).is_ok());

        let stale = write(&dir, "stale.json", &body(layout_hash().wrapping_add(1)));
        assert!(matches!(load_scaler(&stale, FEATURE_COUNT), Err(CoreError::LayoutMismatch(_))));
    }

    #[test]
    fn test_load_scaler_wrong_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "target.json", r#"{"kind": "min_max", "min": [0.0, 0.0], "scale": [1.0, 1.0]}"#);
        assert!(load_scaler(&path, 1).is_err());
    }

    #[test]
    fn test_load_model_rejects_wrong_architecture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "tiny.json",
            r#"{
                "lstm.weight_ih_l0": [[0.0], [0.0], [0.0], [0.0]],
                "lstm.weight_hh_l0": [[0.0], [0.0], [0.0], [0.0]],
                "lstm.bias_ih_l0": [0.0, 0.0, 0.0, 0.0],
                "lstm.bias_hh_l0": [0.0, 0.0, 0.0, 0.0],
                "fc.weight": [[1.0]],
                "fc.bias": [0.0]
            }"#,
        );
        assert!(matches!(load_model(&path), Err(CoreError::Artifact { .. })));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_needs_feature() {
        let err = load_model("models/best_model.onnx").err().unwrap();
        assert!(err.to_string().contains("onnx"));
    }

    #[test]
    fn test_in_dir_paths() {
        let paths = ArtifactPaths::in_dir("/srv/stmodel");
        assert_eq!(paths.metrics, "/srv/stmodel/metrics.json");
        assert_eq!(paths.scaler_target, "/srv/stmodel/scaler_target.json");
    }
}
