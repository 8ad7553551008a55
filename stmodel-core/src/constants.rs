//! Central Configuration Constants
//!
//! Single source of truth for model shape and artifact defaults.
//! To move the artifacts, set the env variables or edit this file.

/// Days of history in one model input sequence
pub const SEQUENCE_LENGTH: usize = 14;

/// Features per timestep (see `logic::features::layout`)
pub const FEATURE_COUNT: usize = 11;

/// Hidden width of each recurrent layer
pub const HIDDEN_SIZE: usize = 64;

/// Number of stacked recurrent layers
pub const NUM_LAYERS: usize = 2;

/// Default feed lookback (14 days, in hours)
pub const DEFAULT_LOOKBACK_HOURS: u32 = 336;

/// Default max records requested per feed
pub const DEFAULT_FETCH_LIMIT: u32 = 100;

/// Default model weights (JSON state dict, or `.onnx` with the `onnx` feature)
pub const DEFAULT_MODEL_PATH: &str = "models/best_model.json";

/// Default training metrics record
pub const DEFAULT_METRICS_PATH: &str = "models/metrics.json";

/// Default input feature scaler
pub const DEFAULT_SCALER_FEATURES_PATH: &str = "data/processed/sequences/scaler_features.json";

/// Default target scaler
pub const DEFAULT_SCALER_TARGET_PATH: &str = "data/processed/sequences/scaler_target.json";

/// Crate version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name
pub const APP_NAME: &str = "AquaWatch STModel";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model weights path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get metrics path from environment or use default
pub fn get_metrics_path() -> String {
    std::env::var("METRICS_PATH")
        .unwrap_or_else(|_| DEFAULT_METRICS_PATH.to_string())
}

/// Get feature scaler path from environment or use default
pub fn get_scaler_features_path() -> String {
    std::env::var("SCALER_FEATURES_PATH")
        .unwrap_or_else(|_| DEFAULT_SCALER_FEATURES_PATH.to_string())
}

/// Get target scaler path from environment or use default
pub fn get_scaler_target_path() -> String {
    std::env::var("SCALER_TARGET_PATH")
        .unwrap_or_else(|_| DEFAULT_SCALER_TARGET_PATH.to_string())
}
