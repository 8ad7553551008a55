//! Model Module - Sequence Scoring
//!
//! Normalization, interchangeable sequence model engines and the scoring
//! context that owns them once artifacts are loaded.

pub mod artifacts;
pub mod engine;
pub mod inference;
pub mod lstm;
pub mod normalizer;
#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export common types
pub use artifacts::{ArtifactPaths, ModelMetrics};
pub use engine::SequenceModel;
pub use inference::{EngineStatus, ModelInfo, ModelMetadata, ScoreOutput, ScoringContext};
pub use lstm::LstmModel;
pub use normalizer::{AffineScaler, NormalizationState};
