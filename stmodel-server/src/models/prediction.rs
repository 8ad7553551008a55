//! Prediction request / response models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use chrono::{DateTime, NaiveDateTime, Utc};

use stmodel_core::{Measurement, PredictionResult, PredictionSource, QualityLevel, QualityPreset};

/// `POST /api/predictions/create` body: 14 days of measurements
#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    pub measurements: Vec<Measurement>,
}

/// `POST /api/predictions/auto` query
#[derive(Debug, Deserialize, Validate)]
#[serde(default)]
pub struct AutoPredictionQuery {
    pub station_id: i64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub use_sample_data: bool,
    pub sample_quality: String,
}

impl Default for AutoPredictionQuery {
    fn default() -> Self {
        // Casablanca
        Self {
            station_id: 1,
            latitude: 33.5731,
            longitude: -7.5898,
            use_sample_data: false,
            sample_quality: QualityPreset::Medium.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction_id: String,
    /// Normalized score in [0, 1]
    pub quality_score: f64,
    pub quality_score_real: f64,
    pub confidence: f64,
    pub quality_level: QualityLevel,
    pub source: PredictionSource,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl PredictionResponse {
    pub fn new(result: &PredictionResult, message: impl Into<String>) -> Self {
        Self {
            prediction_id: result.prediction_id.to_string(),
            quality_score: result.quality_score_normalized,
            quality_score_real: result.quality_score_real,
            confidence: result.confidence,
            quality_level: result.quality_level,
            source: result.source,
            timestamp: result.timestamp,
            message: message.into(),
        }
    }
}

/// JSONB stored in `predictions.prediction_results`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredScores {
    pub quality_score: f64,
    pub quality_score_real: f64,
    pub confidence: f64,
    pub quality_level: QualityLevel,
}

impl From<&PredictionResult> for StoredScores {
    fn from(result: &PredictionResult) -> Self {
        Self {
            quality_score: result.quality_score_normalized,
            quality_score_real: result.quality_score_real,
            confidence: result.confidence,
            quality_level: result.quality_level,
        }
    }
}

/// One row of `GET /api/predictions/latest`
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoredPrediction {
    pub prediction_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub prediction_results: Option<serde_json::Value>,
    pub confidence_score: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LatestQuery {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LatestPredictionsResponse {
    pub count: usize,
    pub predictions: Vec<StoredPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
