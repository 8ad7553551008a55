//! Configuration module

use std::env;

use stmodel_core::ArtifactPaths;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL (predictions are not persisted when unset)
    pub database_url: Option<String>,

    /// Server port
    pub port: u16,

    /// Redis URL for prediction notifications (empty disables publishing)
    pub redis_url: Option<String>,

    /// Sensor ("capteurs") service base URL
    pub capteurs_url: String,

    /// Satellite service base URL
    pub satellite_url: String,

    /// Feed request timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Model, metrics and scaler locations
    pub artifacts: ArtifactPaths,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            redis_url: Some(
                env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            )
            .filter(|url| !url.trim().is_empty()),

            capteurs_url: env::var("CAPTEURS_API_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),

            satellite_url: env::var("SATELLITE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),

            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            artifacts: ArtifactPaths::from_env(),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
