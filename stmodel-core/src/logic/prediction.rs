//! Prediction Assembly
//!
//! Wraps a scorer output into the immutable `PredictionResult` handed to
//! persistence and notification collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::aggregation::{Measurement, Station};
use crate::logic::error::{CoreError, CoreResult};
use crate::logic::model::{ScoreOutput, ScoringContext};
use crate::logic::quality::{categorize, QualityLevel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub latitude: f64,
    pub longitude: f64,
}

impl Zone {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Zone of the first row of a sequence
    pub fn from_measurements(measurements: &[Measurement]) -> CoreResult<Self> {
        measurements
            .first()
            .map(|m| Self::new(m.latitude, m.longitude))
            .ok_or_else(|| CoreError::InvalidInput("empty measurement sequence".to_string()))
    }
}

impl From<&Station> for Zone {
    fn from(station: &Station) -> Self {
        Self::new(station.latitude, station.longitude)
    }
}

/// How the scored sequence was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    /// Measurements supplied by the caller
    Manual,
    /// Aggregated from the live feeds
    Auto,
    /// Drawn by the sample generator
    Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction_id: Uuid,
    pub quality_score_normalized: f64,
    pub quality_score_real: f64,
    pub confidence: f64,
    pub quality_level: QualityLevel,
    pub source: PredictionSource,
    pub timestamp: DateTime<Utc>,
    pub zone: Zone,
}

impl PredictionResult {
    pub fn from_score(score: &ScoreOutput, zone: Zone, source: PredictionSource) -> Self {
        Self {
            prediction_id: Uuid::now_v7(),
            quality_score_normalized: score.quality_score_normalized,
            quality_score_real: score.quality_score_real,
            confidence: score.confidence,
            quality_level: categorize(score.quality_score_real),
            source,
            timestamp: Utc::now(),
            zone,
        }
    }

    pub fn to_event(&self) -> PredictionEvent {
        PredictionEvent::from(self)
    }
}

/// Score one sequence and assemble the result
pub fn predict(
    ctx: &ScoringContext,
    measurements: &[Measurement],
    zone: Zone,
    source: PredictionSource,
) -> CoreResult<PredictionResult> {
    let score = ctx.score(measurements)?;
    let result = PredictionResult::from_score(&score, zone, source);

    log::info!(
        "Prediction {} ({:?}): {:.2} {} (confidence {:.2})",
        result.prediction_id,
        source,
        result.quality_score_real,
        result.quality_level,
        result.confidence
    );

    Ok(result)
}

// ============================================================================
// DOWNSTREAM NOTIFICATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventScores {
    pub qualite_eau: QualityLevel,
    pub score_qualite: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEvent {
    pub prediction_id: Uuid,
    pub zone: Zone,
    pub predictions: EventScores,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<&PredictionResult> for PredictionEvent {
    fn from(result: &PredictionResult) -> Self {
        Self {
            prediction_id: result.prediction_id,
            zone: result.zone,
            predictions: EventScores {
                qualite_eau: result.quality_level,
                score_qualite: result.quality_score_real,
            },
            confidence: result.confidence,
            timestamp: result.timestamp,
        }
    }
}
