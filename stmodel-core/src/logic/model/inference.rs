//! Inference Engine - Scoring Context
//!
//! One `ScoringContext` is built at startup and shared by handle. Artifacts
//! are installed exactly once; until then every entry point returns
//! `CoreError::NotReady` instead of blocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::constants::{FEATURE_COUNT, HIDDEN_SIZE, NUM_LAYERS, SEQUENCE_LENGTH};
use crate::logic::aggregation::Measurement;
use crate::logic::error::{CoreError, CoreResult};
use crate::logic::features::{feature_matrix, FeatureVector, LayoutInfo};
use super::artifacts::{self, ArtifactPaths, ModelMetrics};
use super::engine::SequenceModel;
use super::normalizer::NormalizationState;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub engine: String,
    pub sequence_length: usize,
    pub features: usize,
    pub loaded_at: DateTime<Utc>,
}

/// `/api/model/info` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub architecture: String,
    pub input_features: usize,
    pub sequence_length: usize,
    pub device: String,
    pub metrics: ModelMetrics,
    pub layout: LayoutInfo,
    pub model_loaded: bool,
}

/// Engine Status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

/// Scorer output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutput {
    /// Model output clamped to [0, 1]
    pub quality_score_normalized: f64,
    /// Denormalized score
    pub quality_score_real: f64,
    pub confidence: f64,
    /// Model output before clamping
    pub raw_output: f32,
}

struct LoadedModel {
    model: Box<dyn SequenceModel>,
    normalization: NormalizationState,
    metrics: ModelMetrics,
    metadata: ModelMetadata,
}

// ============================================================================
// CONTEXT
// ============================================================================

#[derive(Default)]
pub struct ScoringContext {
    loaded: OnceCell<LoadedModel>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl ScoringContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all four artifacts from disk and install them
    pub fn load(&self, paths: &ArtifactPaths) -> CoreResult<()> {
        log::info!("Loading model from: {}", paths.model);
        let model = artifacts::load_model(&paths.model)?;

        log::info!("Loading scalers...");
        let features = artifacts::load_scaler(&paths.scaler_features, FEATURE_COUNT)?;
        let target = artifacts::load_scaler(&paths.scaler_target, 1)?;
        let normalization = NormalizationState::new(features, target, FEATURE_COUNT)?;

        let metrics = artifacts::load_metrics(&paths.metrics)?;
        log::info!("Metrics loaded (mae={:.4}, r2={:?})", metrics.mae, metrics.r2);

        self.install(model, normalization, metrics, &paths.model)
    }

    /// Install already-built artifacts. Fails if something is installed.
    pub fn install(
        &self,
        model: Box<dyn SequenceModel>,
        normalization: NormalizationState,
        metrics: ModelMetrics,
        model_path: &str,
    ) -> CoreResult<()> {
        if model.input_width() != FEATURE_COUNT {
            return Err(CoreError::InvalidInput(format!(
                "model expects {} features per step, layout has {}",
                model.input_width(),
                FEATURE_COUNT
            )));
        }
        if normalization.features().width() != FEATURE_COUNT {
            return Err(CoreError::InvalidInput("feature scaler width mismatch".to_string()));
        }

        let metadata = ModelMetadata {
            model_path: model_path.to_string(),
            engine: model.engine().to_string(),
            sequence_length: SEQUENCE_LENGTH,
            features: FEATURE_COUNT,
            loaded_at: Utc::now(),
        };

        self.loaded
            .set(LoadedModel { model, normalization, metrics, metadata })
            .map_err(|_| CoreError::InvalidInput("model already loaded".to_string()))?;

        log::info!("Scoring context ready");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.get().is_some()
    }

    fn loaded(&self) -> CoreResult<&LoadedModel> {
        self.loaded.get().ok_or(CoreError::NotReady)
    }

    /// Apply the fitted feature transform to a `(14, 11)` matrix
    pub fn normalize(&self, matrix: &Array2<f32>) -> CoreResult<Array2<f32>> {
        self.loaded()?.normalization.normalize(matrix)
    }

    /// Inverse of the fitted target transform
    pub fn denormalize(&self, value: f64) -> CoreResult<f64> {
        Ok(self.loaded()?.normalization.denormalize(value))
    }

    /// Full pipeline: project → normalize → forward → clamp → denormalize
    pub fn score(&self, measurements: &[Measurement]) -> CoreResult<ScoreOutput> {
        let loaded = self.loaded()?;
        let start_time = Instant::now();

        let matrix = feature_matrix(measurements)?;
        if log::log_enabled!(log::Level::Trace) {
            if let Some(last) = measurements.last() {
                log::trace!("Last step features: {}", FeatureVector::from(last).to_log_entry());
            }
        }
        let normalized = loaded.normalization.normalize(&matrix)?;

        let raw_output = loaded.model.forward(&normalized)?;
        if !raw_output.is_finite() {
            return Err(CoreError::Inference(format!("non-finite model output ({})", raw_output)));
        }

        let quality_score_normalized = (raw_output as f64).clamp(0.0, 1.0);
        let quality_score_real = loaded.normalization.denormalize(quality_score_normalized);
        let confidence = loaded.metrics.confidence();

        let elapsed = start_time.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "Scored sequence: raw={:.4} normalized={:.4} real={:.3} ({}us)",
            raw_output,
            quality_score_normalized,
            quality_score_real,
            elapsed
        );

        Ok(ScoreOutput {
            quality_score_normalized,
            quality_score_real,
            confidence,
            raw_output,
        })
    }

    pub fn metadata(&self) -> Option<ModelMetadata> {
        self.loaded.get().map(|l| l.metadata.clone())
    }

    pub fn model_info(&self) -> Option<ModelInfo> {
        self.loaded.get().map(|l| ModelInfo {
            model_type: "WaterQualityLSTM".to_string(),
            architecture: format!("{}-layer LSTM ({} hidden units)", NUM_LAYERS, HIDDEN_SIZE),
            input_features: FEATURE_COUNT,
            sequence_length: SEQUENCE_LENGTH,
            device: l.metadata.engine.clone(),
            metrics: l.metrics.clone(),
            layout: LayoutInfo::current(),
            model_loaded: true,
        })
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: self.is_ready(),
            model_name: self.loaded.get()
                .map(|l| l.metadata.model_path.clone())
                .unwrap_or_else(|| "None".to_string()),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
