//! Prediction handlers

use axum::{extract::{Query, State}, Json};
use validator::Validate;

use stmodel_core::constants::{DEFAULT_LOOKBACK_HOURS, SEQUENCE_LENGTH};
use stmodel_core::logic::aggregation::defaulted_rows;
use stmodel_core::{
    aggregate, generate, predict, Measurement, PredictionResult, PredictionSource,
    QualityPreset, Station, Zone,
};

use crate::{AppState, AppResult, AppError};
use crate::{db, publisher};
use crate::models::{
    AutoPredictionQuery, LatestPredictionsResponse, LatestQuery, PredictionRequest,
    PredictionResponse,
};

const DEFAULT_LATEST_LIMIT: i64 = 10;

/// Score on the blocking pool, then persist and publish
async fn run_prediction(
    state: &AppState,
    measurements: Vec<Measurement>,
    zone: Zone,
    source: PredictionSource,
) -> AppResult<PredictionResult> {
    let context = state.context.clone();
    let (result, measurements) = tokio::task::spawn_blocking(move || {
        let result = predict(&context, &measurements, zone, source);
        (result, measurements)
    })
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;
    let result = result?;

    db::save_prediction(state.store.as_ref(), &result, &measurements).await;
    publisher::publish_prediction(state.publisher.as_ref(), &result).await;

    Ok(result)
}

/// Score 14 caller-supplied days
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<PredictionRequest>,
) -> AppResult<Json<PredictionResponse>> {
    if !state.context.is_ready() {
        return Err(AppError::ModelNotReady);
    }

    if req.measurements.len() != SEQUENCE_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Exactly {} measurements required, {} provided",
            SEQUENCE_LENGTH,
            req.measurements.len()
        )));
    }

    // Request order is chronological order
    let mut measurements = req.measurements;
    for (i, m) in measurements.iter_mut().enumerate() {
        m.day_index = i;
    }

    let zone = Zone::from_measurements(&measurements)?;
    let result = run_prediction(&state, measurements, zone, PredictionSource::Manual).await?;

    Ok(Json(PredictionResponse::new(&result, "Prediction succeeded")))
}

/// Build the sequence from the live feeds (or sample data) and score it
pub async fn auto(
    State(state): State<AppState>,
    Query(query): Query<AutoPredictionQuery>,
) -> AppResult<Json<PredictionResponse>> {
    query.validate()?;

    if !state.context.is_ready() {
        return Err(AppError::ModelNotReady);
    }

    let station = Station::new(query.station_id, query.latitude, query.longitude);

    let (measurements, source) = if query.use_sample_data {
        tracing::info!("Generating sample data (quality: {})", query.sample_quality);
        (generate(&station, query.sample_quality.as_str()), PredictionSource::Sample)
    } else {
        let feeds = state.fetcher.fetch_all(DEFAULT_LOOKBACK_HOURS).await;

        if feeds.is_empty() {
            tracing::warn!("No feed data available, using sample data");
            (generate(&station, QualityPreset::Medium), PredictionSource::Sample)
        } else {
            let rows = aggregate(&feeds.capteurs, &feeds.satellite, &station);
            let defaulted = defaulted_rows(&rows);
            if defaulted > 0 {
                tracing::warn!("{} of {} days built entirely from defaults", defaulted, rows.len());
            }
            (rows, PredictionSource::Auto)
        }
    };

    let result = run_prediction(&state, measurements, Zone::from(&station), source).await?;
    tracing::info!("Auto prediction completed: {}", result.prediction_id);

    Ok(Json(PredictionResponse::new(
        &result,
        format!("Automatic prediction succeeded (station_id={})", query.station_id),
    )))
}

/// Newest stored predictions
pub async fn latest(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> AppResult<Json<LatestPredictionsResponse>> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_LATEST_LIMIT);

    let Some(store) = state.store.as_ref() else {
        return Ok(Json(LatestPredictionsResponse {
            count: 0,
            predictions: Vec::new(),
            error: Some("Database unavailable".to_string()),
        }));
    };

    let predictions = store.latest(limit).await?;

    Ok(Json(LatestPredictionsResponse {
        count: predictions.len(),
        predictions,
        error: None,
    }))
}
