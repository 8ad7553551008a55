//! AquaWatch STModel - Core
//!
//! Aligns two asynchronous environmental feeds (in-situ sensors and
//! satellite spectral indices) into a fixed 14-day sequence and scores it
//! with a recurrent sequence model.
//!
//! ```text
//! sensor records ─┐
//!                 ├─► aggregation ─► features ─► normalizer ─► model ─► quality
//! satellite recs ─┘        ▲
//!         sample generator ┘
//! ```

pub mod constants;
pub mod logic;

pub use logic::error::{CoreError, CoreResult};
pub use logic::aggregation::{
    aggregate, aggregate_at, closest, generate, generate_with_rng, CapteursFeed,
    Measurement, Provenance, QualityPreset, SatelliteFeed, SatelliteRecord, SensorRecord,
    Station,
};
pub use logic::model::{ArtifactPaths, ModelMetrics, ScoreOutput, ScoringContext, SequenceModel};
pub use logic::prediction::{predict, PredictionEvent, PredictionResult, PredictionSource, Zone};
pub use logic::quality::{categorize, QualityLevel};
