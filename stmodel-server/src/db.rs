//! Database module - PostgreSQL connection and prediction persistence
//!
//! The `predictions` table is owned by the platform's database service;
//! this server only writes into it and reads it back.

use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};

use stmodel_core::{Measurement, PredictionResult};
use crate::models::{StoredPrediction, StoredScores};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Handle on the `predictions` table
#[derive(Clone)]
pub struct PredictionStore {
    pool: PgPool,
}

impl PredictionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        result: &PredictionResult,
        measurements: &[Measurement],
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO predictions (prediction_id, zone_latitude, zone_longitude, input_data, prediction_results, confidence_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(result.prediction_id.to_string())
        .bind(result.zone.latitude)
        .bind(result.zone.longitude)
        .bind(Json(measurements))
        .bind(Json(StoredScores::from(result)))
        .bind(result.confidence)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Newest first
    pub async fn latest(&self, limit: i64) -> Result<Vec<StoredPrediction>, sqlx::Error> {
        sqlx::query_as::<_, StoredPrediction>(
            r#"
            SELECT prediction_id,
                   zone_latitude::float8 AS latitude,
                   zone_longitude::float8 AS longitude,
                   prediction_results,
                   confidence_score::float8 AS confidence_score,
                   created_at AS timestamp
            FROM predictions
            ORDER BY created_at DESC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}

/// Persist a prediction; failures are logged, never surfaced
pub async fn save_prediction(
    store: Option<&PredictionStore>,
    result: &PredictionResult,
    measurements: &[Measurement],
) {
    let Some(store) = store else {
        tracing::debug!("No database configured, prediction {} not persisted", result.prediction_id);
        return;
    };

    if let Err(e) = store.insert(result, measurements).await {
        tracing::warn!("Failed to save prediction {}: {}", result.prediction_id, e);
    }
}
